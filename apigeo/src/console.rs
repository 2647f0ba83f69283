//! Draws the widget as plain lines of text.

use apigeo_widget::{Phase, SearchDelegate, SearchView};
use std::io::Write;

/// A [`SearchDelegate`] printing each state change to a writer.
pub struct ConsoleDelegate<W> {
    /// Where to print.
    out: W,
}

impl<W: Write + Send> ConsoleDelegate<W> {
    /// Print to `out`.
    pub fn new(out: W) -> Self {
        Self { out }
    }

    /// The lines that show `view`.
    fn lines(view: &SearchView<'_>) -> Vec<String> {
        match view.phase {
            Phase::Idle if view.value.is_empty() => vec![format!("{}…", view.placeholder)],
            Phase::Idle => vec![format!("> {}", view.value)],
            Phase::Typing => vec![],
            Phase::Loading => vec![format!("Searching {:?}…", view.value)],
            Phase::Empty => vec![format!("No territory matches {:?}", view.value)],
            Phase::Results => view
                .rows(None)
                .into_iter()
                .enumerate()
                .map(|(idx, row)| format!("{:>3}. {} ({})", idx + 1, row.label, row.description))
                .collect(),
        }
    }
}

impl<W: Write + Send> SearchDelegate for ConsoleDelegate<W> {
    fn render(&mut self, view: &SearchView<'_>) {
        for line in Self::lines(view) {
            if let Err(error) = writeln!(self.out, "{}", line) {
                tracing::warn!(%error, "Could not print search state");
                return;
            }
        }
        if let Err(error) = self.out.flush() {
            tracing::warn!(%error, "Could not flush search state");
        }
    }
}
