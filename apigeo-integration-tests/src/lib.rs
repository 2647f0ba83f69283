#![warn(missing_docs, clippy::missing_docs_in_private_items)]
// None of the tests are seen by the linter, so none of the utilities are marked
// as used. But docs don't generate for the below if they are `#[cfg(test)]`.
#![allow(dead_code)]

//! Tests for the territory search widget that go through the whole stack:
//! settings, the geo API provider over HTTP, and the widget event loop.
//!
//! This is structured as a separate crate so that it produces a single test
//! binary instead of one test per file.
//!
//! The primary tool used by tests is [`apigeo_test`], which loads test
//! settings, starts a mock geo API, spawns a widget wired to it, and provides
//! helpers to inspect what the widget drew, selected and logged. It then calls
//! the test function that is passed to it, providing the above tools as an
//! argument.
//!
//! ```
//! use apigeo_integration_tests::{apigeo_test, TestingTools};
//!
//! #[tokio::test]
//! async fn a_test() {
//!     apigeo_test(
//!         |settings| settings.search.territory_type = "régions".to_string(),
//!         |TestingTools { widget, mut renders, .. }| async move {
//!             widget.input("Bre").unwrap();
//!             renders.next().await;
//!         },
//!     )
//!     .await
//! }
//! ```

mod logging;
mod search;
mod utils;

pub use crate::utils::{
    logging::{LogWatcher, TracingJsonEvent},
    test_tools::{apigeo_test, RenderWatcher, RenderedView, TestingTools},
};
