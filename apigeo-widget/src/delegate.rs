//! The seam between the widget and whatever draws it.
//!
//! The widget never draws anything itself. After every state change it hands
//! a [`SearchView`] to its [`SearchDelegate`], which owns the text field and the
//! result list. The helpers here give every delegate the same item labels.

use apigeo_search::{Territory, TerritoryType};

use crate::state::Phase;

/// Shown for territories with neither a parent département nor a parent région.
pub const OVERSEAS_LABEL: &str = "Collectivité d’outre-mer";

/// Draws the widget.
pub trait SearchDelegate: Send {
    /// Show `view`. Called once after every state change.
    fn render(&mut self, view: &SearchView<'_>);
}

/// A snapshot of what the widget should look like.
#[derive(Debug, Clone, Copy)]
pub struct SearchView<'a> {
    /// The text in the input.
    pub value: &'a str,
    /// The result list.
    pub results: &'a [Territory],
    /// Whether results are on their way.
    pub is_loading: bool,
    /// Hint shown in the empty input.
    pub placeholder: &'static str,
    /// Where the widget is in a search.
    pub phase: Phase,
}

impl<'a> SearchView<'a> {
    /// Rows for the result list, with the row at `highlighted` marked.
    pub fn rows(&self, highlighted: Option<usize>) -> Vec<ItemRow> {
        self.results
            .iter()
            .enumerate()
            .map(|(idx, territory)| render_item(territory, highlighted == Some(idx)))
            .collect()
    }
}

/// One line of the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemRow {
    /// Stable key of the row, the territory code.
    pub key: String,
    /// The territory name.
    pub label: String,
    /// Where the territory is.
    pub description: String,
    /// Whether the row is under the cursor.
    pub highlighted: bool,
}

/// The text that goes into the input when `territory` is picked.
pub fn item_value(territory: &Territory) -> &str {
    &territory.nom
}

/// Describe where `territory` is: its département as `"nom - code"`, or else
/// its région's name, or else the overseas label.
pub fn describe(territory: &Territory) -> String {
    if let Some(departement) = &territory.departement {
        format!("{} - {}", departement.nom, departement.code)
    } else if let Some(region) = &territory.region {
        region.nom.clone()
    } else {
        OVERSEAS_LABEL.to_string()
    }
}

/// Build the result row for `territory`.
pub fn render_item(territory: &Territory, highlighted: bool) -> ItemRow {
    ItemRow {
        key: territory.code.clone(),
        label: item_value(territory).to_string(),
        description: describe(territory),
        highlighted,
    }
}

/// The input hint for a territory type.
pub fn placeholder(territory_type: TerritoryType) -> &'static str {
    match territory_type {
        TerritoryType::Communes => "Taper le nom de la commune",
        TerritoryType::Departements | TerritoryType::Regions => "Taper le nom du département",
    }
}
