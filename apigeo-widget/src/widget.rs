//! The autocomplete widget and its event loop.

use anyhow::Context;
use apigeo_search::{
    SearchError, SearchRequest, SearchResponse, Territory, TerritoryProvider, TerritoryType,
};
use apigeo_settings::Settings;
use std::{sync::Arc, time::Duration};
use thiserror::Error;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::{
    debounce::Debouncer,
    delegate::{placeholder, SearchDelegate, SearchView},
    state::{Generation, QueryState},
};

/// How long input has to stay unchanged before a query is sent, by default.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);

/// Something the user, or the parent, did to the widget.
#[derive(Debug, Clone)]
pub enum WidgetEvent {
    /// The text in the input changed.
    Input(String),
    /// A territory was picked from the list.
    Select(Territory),
    /// The territory at this position of the current list was picked.
    SelectIndex(usize),
    /// The parent switched the kind of territory searched for.
    SetTerritoryType(TerritoryType),
}

/// Returned when events are sent to a widget that has stopped.
#[derive(Debug, Error)]
#[error("The territory search widget is no longer running")]
pub struct WidgetClosed;

/// Sends events to a running widget. The widget stops once every handle is
/// dropped.
#[derive(Debug, Clone)]
pub struct WidgetHandle {
    /// Feeds the widget's event loop.
    events: mpsc::UnboundedSender<WidgetEvent>,
}

impl WidgetHandle {
    /// Send any event.
    ///
    /// # Errors
    /// If the widget has stopped.
    pub fn send(&self, event: WidgetEvent) -> Result<(), WidgetClosed> {
        self.events.send(event).map_err(|_| WidgetClosed)
    }

    /// The text in the input changed to `value`.
    ///
    /// # Errors
    /// If the widget has stopped.
    pub fn input<S: Into<String>>(&self, value: S) -> Result<(), WidgetClosed> {
        self.send(WidgetEvent::Input(value.into()))
    }

    /// `territory` was picked.
    ///
    /// # Errors
    /// If the widget has stopped.
    pub fn select(&self, territory: Territory) -> Result<(), WidgetClosed> {
        self.send(WidgetEvent::Select(territory))
    }

    /// The territory at `index` in the current result list was picked.
    ///
    /// # Errors
    /// If the widget has stopped.
    pub fn select_index(&self, index: usize) -> Result<(), WidgetClosed> {
        self.send(WidgetEvent::SelectIndex(index))
    }

    /// Search territories of another type from now on.
    ///
    /// # Errors
    /// If the widget has stopped.
    pub fn set_territory_type(&self, territory_type: TerritoryType) -> Result<(), WidgetClosed> {
        self.send(WidgetEvent::SetTerritoryType(territory_type))
    }
}

/// A query waiting for the debounce delay.
#[derive(Debug)]
struct PendingQuery {
    /// The state generation the query was typed in.
    generation: Generation,
    /// What to search.
    request: SearchRequest,
}

/// The outcome of a query, sent back from its request task.
#[derive(Debug)]
struct Reply {
    /// The state generation the query was typed in.
    generation: Generation,
    /// What the provider answered.
    result: Result<SearchResponse, SearchError>,
}

/// An autocomplete search over French territories.
///
/// Owns the query state. Keystrokes are debounced, then searched with the
/// provider; results are handed to the delegate, and picked territories to
/// the selection callback.
pub struct ApiGeoWidget<D> {
    /// What is being searched for.
    territory_type: TerritoryType,
    /// Text, results and progress.
    state: QueryState,
    /// Where territories come from.
    provider: Arc<dyn TerritoryProvider>,
    /// Draws the widget.
    delegate: D,
    /// Told about every picked territory.
    on_select: Box<dyn FnMut(Territory) + Send>,
    /// Holds the next query until input goes quiet.
    debouncer: Debouncer<PendingQuery>,
}

impl<D: SearchDelegate + 'static> ApiGeoWidget<D> {
    /// Make a widget searching `territory_type` with `provider`.
    pub fn new<F>(
        provider: Arc<dyn TerritoryProvider>,
        territory_type: TerritoryType,
        delegate: D,
        on_select: F,
    ) -> Self
    where
        F: FnMut(Territory) + Send + 'static,
    {
        Self {
            territory_type,
            state: QueryState::default(),
            provider,
            delegate,
            on_select: Box::new(on_select),
            debouncer: Debouncer::new(DEFAULT_DEBOUNCE),
        }
    }

    /// Make a widget using the territory type and debounce delay from settings.
    ///
    /// # Errors
    /// If the configured territory type is unknown.
    pub fn from_settings<F>(
        settings: &Settings,
        provider: Arc<dyn TerritoryProvider>,
        delegate: D,
        on_select: F,
    ) -> anyhow::Result<Self>
    where
        F: FnMut(Territory) + Send + 'static,
    {
        let territory_type: TerritoryType = settings
            .search
            .territory_type
            .parse()
            .context("Reading search.territory_type")?;
        Ok(Self::new(provider, territory_type, delegate, on_select)
            .with_debounce(settings.search.debounce))
    }

    /// Change the debounce delay.
    #[must_use]
    pub fn with_debounce(mut self, delay: Duration) -> Self {
        self.debouncer = Debouncer::new(delay);
        self
    }

    /// Run the widget on the current tokio runtime.
    pub fn spawn(self) -> (WidgetHandle, JoinHandle<()>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let join_handle = tokio::spawn(self.run(events_rx));
        (WidgetHandle { events: events_tx }, join_handle)
    }

    /// Process `events` until the sending side closes.
    pub async fn run(mut self, mut events: mpsc::UnboundedReceiver<WidgetEvent>) {
        let (replies_tx, mut replies_rx) = mpsc::unbounded_channel();
        tracing::debug!(
            provider = %self.provider.name(),
            territory_type = %self.territory_type,
            debounce_ms = self.debouncer.delay().as_millis() as u64,
            "Territory search widget started"
        );
        self.render();

        loop {
            tokio::select! {
                event = events.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => break,
                },
                query = self.debouncer.fired() => self.dispatch(query, &replies_tx),
                Some(reply) = replies_rx.recv() => self.handle_reply(reply),
            }
        }

        tracing::debug!("Territory search widget stopped");
    }

    /// Apply an event to the state.
    fn handle_event(&mut self, event: WidgetEvent) {
        match event {
            WidgetEvent::Input(value) => {
                let request = SearchRequest::new(self.territory_type, value.clone());
                let generation = self.state.input(value);
                self.debouncer.push(PendingQuery {
                    generation,
                    request,
                });
            }
            WidgetEvent::Select(territory) => self.select(territory),
            WidgetEvent::SelectIndex(index) => match self.state.results().get(index).cloned() {
                Some(territory) => self.select(territory),
                None => {
                    tracing::warn!(
                        index,
                        results = self.state.results().len(),
                        "Selected a territory outside of the result list"
                    );
                    return;
                }
            },
            WidgetEvent::SetTerritoryType(territory_type) => {
                if territory_type == self.territory_type {
                    return;
                }
                tracing::debug!(
                    from = %self.territory_type,
                    to = %territory_type,
                    "Territory type changed"
                );
                self.territory_type = territory_type;
                self.debouncer.cancel();
                self.state.reset();
            }
        }
        self.render();
    }

    /// Pick `territory` and tell the parent.
    fn select(&mut self, territory: Territory) {
        tracing::info!(nom = %territory.nom, code = %territory.code, "Territory selected");
        self.debouncer.cancel();
        self.state.select(&territory);
        (self.on_select)(territory);
    }

    /// Send `query` to the provider in the background.
    fn dispatch(&mut self, query: PendingQuery, replies: &mpsc::UnboundedSender<Reply>) {
        let PendingQuery {
            generation,
            request,
        } = query;
        if !self.state.dispatched(generation) {
            return;
        }
        tracing::debug!(?generation, query = %request.query, "Dispatching territory search");

        let provider = Arc::clone(&self.provider);
        let replies = replies.clone();
        tokio::spawn(async move {
            let result = provider.search(request).await;
            // The widget may have stopped in the meantime.
            let _ = replies.send(Reply { generation, result });
        });

        self.render();
    }

    /// Apply a provider reply, unless it is stale.
    fn handle_reply(&mut self, reply: Reply) {
        let Reply { generation, result } = reply;
        let applied = match result {
            Ok(response) => self.state.resolve(generation, response.territories),
            Err(error) => {
                tracing::error!(%error, ?generation, "Territory search failed");
                self.state.fail(generation)
            }
        };

        if applied {
            self.render();
        } else {
            tracing::debug!(
                ?generation,
                current = ?self.state.generation(),
                "Discarding stale search reply"
            );
        }
    }

    /// Hand the current state to the delegate.
    fn render(&mut self) {
        let view = SearchView {
            value: self.state.value(),
            results: self.state.results(),
            is_loading: self.state.is_loading(),
            placeholder: placeholder(self.territory_type),
            phase: self.state.phase(),
        };
        self.delegate.render(&view);
    }
}

#[cfg(test)]
mod tests {
    use super::{ApiGeoWidget, WidgetHandle};
    use crate::{
        delegate::{SearchDelegate, SearchView},
        state::Phase,
    };
    use anyhow::anyhow;
    use apigeo_search::{
        SearchError, SearchRequest, SearchResponse, Territory, TerritoryProvider, TerritoryType,
    };
    use apigeo_settings::Settings;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::{
        sync::{Arc, Mutex},
        time::Duration,
    };
    use tokio::sync::mpsc;

    /// What the delegate was asked to draw.
    #[derive(Debug, Clone)]
    struct Snapshot {
        value: String,
        results: Vec<Territory>,
        is_loading: bool,
        placeholder: &'static str,
        phase: Phase,
    }

    struct RecordingDelegate(mpsc::UnboundedSender<Snapshot>);

    impl SearchDelegate for RecordingDelegate {
        fn render(&mut self, view: &SearchView<'_>) {
            let _ = self.0.send(Snapshot {
                value: view.value.to_string(),
                results: view.results.to_vec(),
                is_loading: view.is_loading,
                placeholder: view.placeholder,
                phase: view.phase,
            });
        }
    }

    /// Answers `"<query> <n>"` territories after a delay that depends on the
    /// query, and fails for "boom".
    #[derive(Default)]
    struct ScriptedProvider {
        calls: Arc<Mutex<Vec<SearchRequest>>>,
    }

    #[async_trait]
    impl TerritoryProvider for ScriptedProvider {
        fn name(&self) -> String {
            "ScriptedProvider".to_string()
        }

        async fn search(&self, request: SearchRequest) -> Result<SearchResponse, SearchError> {
            self.calls
                .lock()
                .expect("calls lock poisoned")
                .push(request.clone());
            let delay = if request.query == "Pa" { 500 } else { 10 };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            if request.query == "boom" {
                return Err(SearchError::Network(anyhow!("connection reset")));
            }
            let territories = (0..3)
                .map(|i| Territory {
                    nom: format!("{} {}", request.query, i),
                    code: format!("{:05}", i),
                    departement: None,
                    region: None,
                })
                .collect();
            Ok(SearchResponse::new(territories))
        }
    }

    struct Harness {
        handle: WidgetHandle,
        renders: mpsc::UnboundedReceiver<Snapshot>,
        calls: Arc<Mutex<Vec<SearchRequest>>>,
        selections: Arc<Mutex<Vec<Territory>>>,
    }

    impl Harness {
        fn start() -> Self {
            let (renders_tx, renders) = mpsc::unbounded_channel();
            let provider = ScriptedProvider::default();
            let calls = Arc::clone(&provider.calls);
            let selections = Arc::new(Mutex::new(Vec::new()));
            let sink = Arc::clone(&selections);
            let widget = ApiGeoWidget::new(
                Arc::new(provider),
                TerritoryType::Communes,
                RecordingDelegate(renders_tx),
                move |territory| sink.lock().expect("sink lock poisoned").push(territory),
            );
            let (handle, _join_handle) = widget.spawn();
            Self {
                handle,
                renders,
                calls,
                selections,
            }
        }

        async fn wait_for<F: Fn(&Snapshot) -> bool>(&mut self, predicate: F) -> Snapshot {
            loop {
                let snapshot = self.renders.recv().await.expect("widget stopped");
                if predicate(&snapshot) {
                    return snapshot;
                }
            }
        }

        fn queries(&self) -> Vec<String> {
            self.calls
                .lock()
                .expect("calls lock poisoned")
                .iter()
                .map(|request| request.query.clone())
                .collect()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn starts_idle_with_the_commune_placeholder() {
        let mut harness = Harness::start();
        let first = harness.wait_for(|_| true).await;
        assert_eq!(first.phase, Phase::Idle);
        assert_eq!(first.value, "");
        assert!(!first.is_loading);
        assert_eq!(first.placeholder, "Taper le nom de la commune");
    }

    #[tokio::test(start_paused = true)]
    async fn keystroke_bursts_send_one_query() {
        let mut harness = Harness::start();
        for value in ["P", "Pa", "Par"] {
            harness.handle.input(value).expect("widget running");
        }

        let typing = harness.wait_for(|s| s.phase == Phase::Typing).await;
        assert!(typing.is_loading);
        assert!(typing.results.is_empty());

        let done = harness.wait_for(|s| s.phase == Phase::Results).await;
        assert_eq!(done.value, "Par");
        assert!(!done.is_loading);
        assert_eq!(done.results.len(), 3);

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(harness.queries(), vec!["Par".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn queries_carry_the_territory_type() {
        let mut harness = Harness::start();
        harness
            .handle
            .set_territory_type(TerritoryType::Regions)
            .expect("widget running");
        harness.handle.input("Bre").expect("widget running");
        harness.wait_for(|s| s.phase == Phase::Results).await;

        let calls = harness.calls.lock().expect("calls lock poisoned").clone();
        assert_eq!(
            calls,
            vec![SearchRequest::new(TerritoryType::Regions, "Bre")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_sets_the_name_and_calls_back_once() {
        let mut harness = Harness::start();
        harness.handle.input("Lyon").expect("widget running");
        let done = harness.wait_for(|s| s.phase == Phase::Results).await;

        harness.handle.select_index(1).expect("widget running");
        let selected = harness.wait_for(|s| s.phase == Phase::Idle).await;

        assert_eq!(selected.value, "Lyon 1");
        assert!(!selected.is_loading);
        let selections = harness.selections.lock().expect("sink lock poisoned").clone();
        assert_eq!(selections, vec![done.results[1].clone()]);
    }

    #[tokio::test(start_paused = true)]
    async fn selecting_outside_the_list_is_ignored() {
        let mut harness = Harness::start();
        harness.handle.input("Lyon").expect("widget running");
        harness.wait_for(|s| s.phase == Phase::Results).await;

        harness.handle.select_index(7).expect("widget running");
        tokio::time::sleep(Duration::from_secs(1)).await;

        assert!(harness.renders.try_recv().is_err());
        assert!(harness
            .selections
            .lock()
            .expect("sink lock poisoned")
            .is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn switching_territory_type_clears_input() {
        let mut harness = Harness::start();
        harness.handle.input("Par").expect("widget running");
        harness.wait_for(|s| s.phase == Phase::Typing).await;

        harness
            .handle
            .set_territory_type(TerritoryType::Departements)
            .expect("widget running");
        let reset = harness.wait_for(|s| s.phase == Phase::Idle).await;

        assert_eq!(reset.value, "");
        assert!(!reset.is_loading);
        assert_eq!(reset.placeholder, "Taper le nom du département");

        // The pending query was dropped along with the text.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(harness.queries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn stale_replies_do_not_overwrite_fresh_results() {
        let mut harness = Harness::start();
        harness.handle.input("Pa").expect("widget running");
        harness.wait_for(|s| s.phase == Phase::Loading).await;

        harness.handle.input("Par").expect("widget running");
        let done = harness.wait_for(|s| s.phase == Phase::Results).await;
        assert_eq!(done.results[0].nom, "Par 0");

        // Let the slow reply for "Pa" arrive.
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(harness.queries(), vec!["Pa".to_string(), "Par".to_string()]);
        assert!(harness.renders.try_recv().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn failures_clear_loading() {
        let mut harness = Harness::start();
        harness.handle.input("boom").expect("widget running");
        let failed = harness.wait_for(|s| s.phase == Phase::Empty).await;
        assert!(!failed.is_loading);
        assert!(failed.results.is_empty());
    }

    #[tokio::test]
    async fn unknown_configured_territory_type_is_an_error() {
        let settings = Settings::load_for_tests(|settings| {
            settings.search.territory_type = "cantons".to_string();
        });
        let (renders_tx, _renders) = mpsc::unbounded_channel();
        let result = ApiGeoWidget::from_settings(
            &settings,
            Arc::new(ScriptedProvider::default()),
            RecordingDelegate(renders_tx),
            |_| (),
        );
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn widget_stops_when_handles_are_dropped() {
        let (renders_tx, _renders) = mpsc::unbounded_channel();
        let widget = ApiGeoWidget::new(
            Arc::new(ScriptedProvider::default()),
            TerritoryType::Communes,
            RecordingDelegate(renders_tx),
            |_| (),
        );
        let (handle, join_handle) = widget.spawn();
        drop(handle);
        join_handle.await.expect("widget task panicked");
        // ScriptedProvider is never called without input.
    }
}
