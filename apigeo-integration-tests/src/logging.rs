//! Tests that the widget and provider logs behave as expected.
#![cfg(test)]

use crate::{apigeo_test, TestingTools};
use apigeo_widget::Phase;
use serde_json::json;
use tracing::Level;

#[tokio::test]
async fn searches_log_their_url() {
    apigeo_test(
        |_| (),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             mut log_watcher,
             ..
         }| async move {
            geo_api_mock
                .mock_async(|when, then| {
                    when.path("/communes");
                    then.status(200)
                        .header("Content-Type", "application/json")
                        .json_body(json!([]));
                })
                .await;

            widget.input("Nantes").expect("widget running");
            renders.wait_for(|v| v.phase == Phase::Empty).await;

            assert!(log_watcher.has(|event| {
                event.level == Level::INFO
                    && event.field_contains("message", "Searching territories")
                    && event.field_contains("url", "nom=Nantes")
            }));
        },
    )
    .await
}

#[tokio::test]
async fn malformed_bodies_are_logged_as_warnings() {
    apigeo_test(
        |_| (),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             mut log_watcher,
             ..
         }| async move {
            geo_api_mock
                .mock_async(|when, then| {
                    when.path("/communes");
                    then.status(200)
                        .header("Content-Type", "application/json")
                        .body("[{\"nom\": ");
                })
                .await;

            widget.input("Nantes").expect("widget running");
            let done = renders.wait_for(|v| v.phase == Phase::Empty).await;

            assert!(!done.is_loading);
            assert!(log_watcher.has(|event| {
                event.level == Level::WARN
                    && event.field_contains("message", "not a list of territories")
            }));
        },
    )
    .await
}

#[tokio::test]
async fn network_failures_are_logged_as_errors() {
    apigeo_test(
        |settings| {
            settings.provider = apigeo_settings::providers::TerritoryProviderConfig::GeoApi(
                apigeo_settings::providers::GeoApiConfig {
                    base_url: "http://127.0.0.1:9/".to_string(),
                    ..Default::default()
                },
            );
        },
        |TestingTools {
             widget,
             mut renders,
             mut log_watcher,
             ..
         }| async move {
            widget.input("Lille").expect("widget running");
            renders.wait_for(|v| v.phase == Phase::Empty).await;

            assert!(log_watcher.has(|event| {
                event.level == Level::ERROR
                    && event.field_contains("message", "Territory search failed")
            }));
        },
    )
    .await
}
