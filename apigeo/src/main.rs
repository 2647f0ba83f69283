#![warn(missing_docs, clippy::missing_docs_in_private_items)]

//! A terminal front end for the territory search widget.
//!
//! Every line read from stdin replaces the search text. A few commands drive
//! the rest of the widget:
//!
//! - `:select <n>` picks the n-th result and prints it as JSON,
//! - `:type <communes|départements|régions>` switches the territory type,
//! - `:quit` exits.

mod command;
mod console;

use anyhow::{Context, Result};
use apigeo_search::make_provider;
use apigeo_settings::{LogFormat, Settings};
use apigeo_widget::ApiGeoWidget;
use command::Command;
use console::ConsoleDelegate;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_log::LogTracer;
use tracing_subscriber::{layer::SubscriberExt, EnvFilter};

/// Primary entry point
#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().context("Loading settings")?;
    init_logging(&settings)?;

    let provider = make_provider(&settings, &settings.provider).context("Building provider")?;
    let widget = ApiGeoWidget::from_settings(
        &settings,
        Arc::from(provider),
        ConsoleDelegate::new(std::io::stdout()),
        |territory| match serde_json::to_string_pretty(&territory) {
            Ok(json) => println!("{}", json),
            Err(error) => tracing::error!(%error, "Could not serialize the selected territory"),
        },
    )?;
    let (handle, widget_task) = widget.spawn();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Reading stdin")? {
        let command = match line.parse::<Command>() {
            Ok(command) => command,
            Err(error) => {
                eprintln!("{:#}", error);
                continue;
            }
        };
        match command {
            Command::Input(value) => handle.input(value)?,
            Command::Select(index) => handle.select_index(index)?,
            Command::SetTerritoryType(territory_type) => {
                handle.set_territory_type(territory_type)?
            }
            Command::Quit => break,
        }
    }

    drop(handle);
    widget_task.await.context("Running the search widget")?;
    Ok(())
}

/// Set up logging to stderr, based on settings and the `RUST_LOG` environment variable.
fn init_logging(settings: &Settings) -> Result<()> {
    LogTracer::init()?;
    let levels = settings
        .logging
        .levels
        .with_rust_log(std::env::var("RUST_LOG").ok().as_deref())?;
    let env_filter: EnvFilter = (&levels).into();
    let builder = tracing_subscriber::fmt::Subscriber::builder().with_writer(std::io::stderr);

    match settings.logging.format {
        LogFormat::Pretty => {
            let subscriber = builder.pretty().finish().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Compact => {
            let subscriber = builder.compact().finish().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
        LogFormat::Json => {
            let subscriber = builder.json().finish().with(env_filter);
            tracing::subscriber::set_global_default(subscriber)?;
        }
    }
    Ok(())
}
