//! Tools for running tests

use crate::utils::logging::LogWatcher;
use apigeo_search::{make_provider, Territory};
use apigeo_settings::{
    providers::{GeoApiConfig, TerritoryProviderConfig},
    Settings,
};
use apigeo_widget::{ApiGeoWidget, Phase, SearchDelegate, SearchView, WidgetHandle};
use httpmock::MockServer;
use std::{
    future::Future,
    sync::{Arc, Mutex},
    time::Duration,
};
use tokio::sync::mpsc;
use tracing_futures::Instrument;
use tracing_subscriber::{fmt::MakeWriter, layer::SubscriberExt};

/// How long [`RenderWatcher::wait_for`] waits before failing the test.
const RENDER_TIMEOUT: Duration = Duration::from_secs(5);

/// Run a test against a widget wired to a mock geo API.
///
/// Settings are loaded with [`Settings::load_for_tests`], the provider is
/// pointed at a fresh [`MockServer`], and then `settings_changer` gets a chance
/// to adjust them before the widget is built. The mock server starts without
/// any mocks; tests add the ones they need.
///
/// # Panics
/// May panic if tests could not be set up correctly.
pub async fn apigeo_test<FSettings, FTest, Fut>(
    settings_changer: FSettings,
    test: FTest,
) -> Fut::Output
where
    FSettings: FnOnce(&mut Settings),
    FTest: FnOnce(TestingTools) -> Fut,
    Fut: Future,
{
    let test_span = tracing::info_span!("apigeo_test");

    let mut settings = Settings::load_for_tests(|_| ());

    // Set up logging
    let log_watcher = LogWatcher::default();
    let log_watcher_writer = log_watcher.make_writer();

    let env_filter: tracing_subscriber::EnvFilter = (&settings.logging.levels).into();
    let tracing_subscriber = tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(move || log_watcher_writer.clone()),
        )
        .with(tracing_subscriber::fmt::layer().pretty().with_test_writer());

    let _tracing_subscriber_guard = tracing::subscriber::set_default(tracing_subscriber);

    // Point the provider at a mock geo API
    let geo_api_mock = MockServer::start_async().await;
    settings.provider = TerritoryProviderConfig::GeoApi(GeoApiConfig {
        base_url: geo_api_mock.base_url(),
        ..GeoApiConfig::default()
    });

    settings_changer(&mut settings);

    let provider =
        make_provider(&settings, &settings.provider).expect("Could not build the provider");
    let (renders_tx, renders_rx) = mpsc::unbounded_channel();
    let selections = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&selections);
    let widget = ApiGeoWidget::from_settings(
        &settings,
        Arc::from(provider),
        RecordingDelegate(renders_tx),
        move |territory| sink.lock().expect("mutex was poisoned").push(territory),
    )
    .expect("Could not build the widget");
    let (widget_handle, widget_task) = widget.spawn();

    let tools = TestingTools {
        widget: widget_handle,
        renders: RenderWatcher(renders_rx),
        geo_api_mock,
        log_watcher,
        selections,
    };
    let rv = test(tools).instrument(test_span).await;
    widget_task.abort();
    rv
}

/// A set of tools for tests.
///
/// Marked non-exhaustive so that destructuring needs a `..`, and tools can be
/// added without rewriting old tests.
#[non_exhaustive]
pub struct TestingTools {
    /// Sends events to the widget under test.
    pub widget: WidgetHandle,

    /// Everything the widget drew, in order.
    pub renders: RenderWatcher,

    /// The mock geo API the provider talks to. It starts without mocks.
    pub geo_api_mock: MockServer,

    /// To make assertions about logs.
    pub log_watcher: LogWatcher,

    /// Every territory passed to the selection callback.
    pub selections: Arc<Mutex<Vec<Territory>>>,
}

/// An owned copy of a [`SearchView`].
#[derive(Debug, Clone)]
pub struct RenderedView {
    /// The text in the input.
    pub value: String,
    /// The result list.
    pub results: Vec<Territory>,
    /// Whether results were on their way.
    pub is_loading: bool,
    /// The input hint.
    pub placeholder: &'static str,
    /// Where the widget was in a search.
    pub phase: Phase,
}

/// Records every view into a channel.
struct RecordingDelegate(mpsc::UnboundedSender<RenderedView>);

impl SearchDelegate for RecordingDelegate {
    fn render(&mut self, view: &SearchView<'_>) {
        // The test may be over already.
        let _ = self.0.send(RenderedView {
            value: view.value.to_string(),
            results: view.results.to_vec(),
            is_loading: view.is_loading,
            placeholder: view.placeholder,
            phase: view.phase,
        });
    }
}

/// Reads what the widget drew.
pub struct RenderWatcher(mpsc::UnboundedReceiver<RenderedView>);

impl RenderWatcher {
    /// The next view drawn.
    ///
    /// # Panics
    /// If nothing is drawn within a few seconds.
    pub async fn next(&mut self) -> RenderedView {
        self.wait_for(|_| true).await
    }

    /// Skip views until one matches `predicate`, and return it.
    ///
    /// # Panics
    /// If no matching view is drawn within a few seconds.
    pub async fn wait_for<F>(&mut self, predicate: F) -> RenderedView
    where
        F: Fn(&RenderedView) -> bool,
    {
        let receiver = &mut self.0;
        tokio::time::timeout(RENDER_TIMEOUT, async move {
            loop {
                match receiver.recv().await {
                    Some(view) if predicate(&view) => return view,
                    Some(_) => continue,
                    None => panic!("the widget stopped"),
                }
            }
        })
        .await
        .expect("timed out waiting for the widget to render")
    }

    /// Views drawn and not read yet.
    pub fn pending(&mut self) -> Vec<RenderedView> {
        std::iter::from_fn(|| self.0.try_recv().ok()).collect()
    }
}
