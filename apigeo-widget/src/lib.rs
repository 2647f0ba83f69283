#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! An autocomplete search widget for French administrative territories.
//!
//! The widget owns the text typed so far, the latest results and a loading
//! flag. Keystrokes are debounced, so that a burst of typing sends a single
//! query for the last value. Queries go to a
//! [`TerritoryProvider`](apigeo_search::TerritoryProvider); replies to queries
//! that were overtaken by newer input are dropped.
//!
//! Drawing is left to a [`SearchDelegate`], which receives a [`SearchView`]
//! after every change and reports user actions through a [`WidgetHandle`].
//!
//! ```no_run
//! # use std::sync::Arc;
//! # use apigeo_search::{NullProvider, TerritoryType};
//! # use apigeo_widget::{ApiGeoWidget, SearchDelegate, SearchView};
//! struct Printer;
//!
//! impl SearchDelegate for Printer {
//!     fn render(&mut self, view: &SearchView<'_>) {
//!         for row in view.rows(None) {
//!             println!("{} ({})", row.label, row.description);
//!         }
//!     }
//! }
//!
//! # async fn example() {
//! let widget = ApiGeoWidget::new(
//!     Arc::new(NullProvider),
//!     TerritoryType::Communes,
//!     Printer,
//!     |territory| println!("picked {}", territory.nom),
//! );
//! let (handle, _task) = widget.spawn();
//! handle.input("Bordeaux").unwrap();
//! # }
//! ```

pub mod debounce;
mod delegate;
mod state;
mod widget;

pub use crate::delegate::{
    describe, item_value, placeholder, render_item, ItemRow, SearchDelegate, SearchView,
    OVERSEAS_LABEL,
};
pub use crate::state::{Generation, Phase, QueryState};
pub use crate::widget::{ApiGeoWidget, WidgetClosed, WidgetEvent, WidgetHandle, DEFAULT_DEBOUNCE};
