//! The widget's query state and its transitions.

use apigeo_search::{Territory, MAX_RESULTS};

/// Where the widget is in a search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing is being searched: just built, reset, or a territory was selected.
    Idle,
    /// Input changed and the debounce delay has not passed yet.
    Typing,
    /// A request for the current input is in flight.
    Loading,
    /// The last request found territories.
    Results,
    /// The last request found nothing, or failed.
    Empty,
}

/// Identifies the state a request was sent from. Bumped by every input,
/// selection and reset, so replies to older requests can be told apart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

/// The text, results and progress of the widget.
#[derive(Clone, Debug)]
pub struct QueryState {
    /// The text shown in the input.
    value: String,
    /// The most recent results, at most [`MAX_RESULTS`].
    results: Vec<Territory>,
    /// Whether results for `value` are still expected.
    loading: bool,
    /// See [`Phase`].
    phase: Phase,
    /// See [`Generation`].
    generation: Generation,
}

impl Default for QueryState {
    fn default() -> Self {
        Self {
            value: String::new(),
            results: Vec::new(),
            loading: false,
            phase: Phase::Idle,
            generation: Generation::default(),
        }
    }
}

impl QueryState {
    /// The text shown in the input.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// The most recent results.
    pub fn results(&self) -> &[Territory] {
        &self.results
    }

    /// Whether results for the current text are still expected.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The current generation.
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Bump the generation, making every outstanding request stale.
    fn bump(&mut self) -> Generation {
        self.generation = Generation(self.generation.0 + 1);
        self.generation
    }

    /// The user typed `value`. Returns the generation a query for it must carry.
    pub fn input(&mut self, value: String) -> Generation {
        self.value = value;
        self.results.clear();
        self.loading = true;
        self.phase = Phase::Typing;
        self.bump()
    }

    /// A query tagged `generation` was sent. Returns false if it is stale.
    pub fn dispatched(&mut self, generation: Generation) -> bool {
        if generation != self.generation {
            return false;
        }
        self.phase = Phase::Loading;
        true
    }

    /// Results arrived for a query tagged `generation`. Returns false, and
    /// changes nothing, if it is stale.
    pub fn resolve(&mut self, generation: Generation, mut territories: Vec<Territory>) -> bool {
        if generation != self.generation || !self.loading {
            return false;
        }
        territories.truncate(MAX_RESULTS);
        self.phase = if territories.is_empty() {
            Phase::Empty
        } else {
            Phase::Results
        };
        self.results = territories;
        self.loading = false;
        true
    }

    /// The query tagged `generation` failed. Returns false if it is stale.
    pub fn fail(&mut self, generation: Generation) -> bool {
        self.resolve(generation, Vec::new())
    }

    /// The user picked `territory`; its name becomes the text.
    pub fn select(&mut self, territory: &Territory) {
        self.value = territory.nom.clone();
        self.loading = false;
        self.phase = Phase::Idle;
        self.bump();
    }

    /// The territory type changed: start over with empty input.
    pub fn reset(&mut self) {
        self.value.clear();
        self.results.clear();
        self.loading = false;
        self.phase = Phase::Idle;
        self.bump();
    }
}

#[cfg(test)]
mod tests {
    use super::{Phase, QueryState};
    use apigeo_search::Territory;
    use fake::{Fake, Faker};
    use pretty_assertions::assert_eq;

    fn territories(count: usize) -> Vec<Territory> {
        (0..count).map(|_| Faker.fake()).collect()
    }

    #[test]
    fn typing_then_results() {
        let mut state = QueryState::default();
        assert_eq!(state.phase(), Phase::Idle);

        let generation = state.input("Bor".to_string());
        assert_eq!(state.phase(), Phase::Typing);
        assert!(state.is_loading());

        assert!(state.dispatched(generation));
        assert_eq!(state.phase(), Phase::Loading);

        let found = territories(3);
        assert!(state.resolve(generation, found.clone()));
        assert_eq!(state.phase(), Phase::Results);
        assert!(!state.is_loading());
        assert_eq!(state.results(), &found[..]);
    }

    #[test]
    fn results_are_capped() {
        let mut state = QueryState::default();
        let generation = state.input("a".to_string());
        assert!(state.resolve(generation, territories(14)));
        assert_eq!(state.results().len(), 10);
    }

    #[test]
    fn empty_results_and_failures_clear_loading() {
        let mut state = QueryState::default();
        let generation = state.input("zzz".to_string());
        assert!(state.resolve(generation, vec![]));
        assert_eq!(state.phase(), Phase::Empty);
        assert!(!state.is_loading());

        let generation = state.input("boom".to_string());
        assert!(state.fail(generation));
        assert_eq!(state.phase(), Phase::Empty);
        assert!(!state.is_loading());
    }

    #[test]
    fn stale_replies_are_ignored() {
        let mut state = QueryState::default();
        let old = state.input("Pa".to_string());
        let new = state.input("Par".to_string());

        assert!(!state.resolve(old, territories(2)));
        assert_eq!(state.phase(), Phase::Typing);
        assert!(state.is_loading());
        assert!(state.results().is_empty());

        assert!(state.resolve(new, territories(1)));
        assert!(!state.resolve(new, territories(5)));
        assert_eq!(state.results().len(), 1);
    }

    #[test]
    fn select_sets_the_name_and_invalidates_requests() {
        let mut state = QueryState::default();
        let generation = state.input("Bre".to_string());
        let found = territories(2);
        assert!(state.resolve(generation, found.clone()));

        state.select(&found[1]);
        assert_eq!(state.value(), found[1].nom);
        assert_eq!(state.phase(), Phase::Idle);
        assert!(state.generation() > generation);
    }

    #[test]
    fn reset_clears_everything() {
        let mut state = QueryState::default();
        let generation = state.input("Nor".to_string());
        state.reset();
        assert_eq!(state.value(), "");
        assert!(state.results().is_empty());
        assert!(!state.is_loading());
        assert_eq!(state.phase(), Phase::Idle);
        assert!(!state.dispatched(generation));
    }
}
