//! Tests the widget's searches against a mock geo API.
#![cfg(test)]

use crate::{apigeo_test, TestingTools};
use apigeo_search::{ParentTerritory, Territory, TerritoryType};
use apigeo_widget::Phase;
use httpmock::{Method::GET, MockServer};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use std::time::Duration;

/// `count` communes of Gironde, named after `prefix`.
fn communes(prefix: &str, count: usize) -> Value {
    Value::Array(
        (0..count)
            .map(|i| {
                json!({
                    "nom": format!("{} {}", prefix, i),
                    "code": format!("33{:03}", i),
                    "departement": { "nom": "Gironde", "code": "33" },
                    "_score": 0.5
                })
            })
            .collect(),
    )
}

/// Answer communes searches for `nom` with `body`.
async fn mock_communes<'a>(
    server: &'a MockServer,
    nom: &str,
    body: Value,
) -> httpmock::Mock<'a> {
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/communes")
                .query_param("nom", nom)
                .query_param("fields", "departement")
                .query_param("boost", "population");
            then.status(200)
                .header("Content-Type", "application/json; charset=utf-8")
                .json_body(body);
        })
        .await
}

#[tokio::test]
async fn keystroke_bursts_send_a_single_request() {
    apigeo_test(
        |_| (),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             ..
         }| async move {
            let b = mock_communes(&geo_api_mock, "B", communes("B", 2)).await;
            let bo = mock_communes(&geo_api_mock, "Bo", communes("Bo", 2)).await;
            let bor = mock_communes(&geo_api_mock, "Bor", communes("Bor", 14)).await;

            for value in ["B", "Bo", "Bor"] {
                widget.input(value).expect("widget running");
            }
            let done = renders.wait_for(|v| v.phase == Phase::Results).await;

            assert_eq!(done.value, "Bor");
            assert!(!done.is_loading);
            assert_eq!(done.results.len(), 10);
            assert_eq!(done.results[0].nom, "Bor 0");

            tokio::time::sleep(Duration::from_millis(200)).await;
            assert_eq!(b.hits_async().await, 0);
            assert_eq!(bo.hits_async().await, 0);
            assert_eq!(bor.hits_async().await, 1);
        },
    )
    .await
}

#[tokio::test]
async fn html_responses_show_no_results() {
    apigeo_test(
        |_| (),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             ..
         }| async move {
            geo_api_mock
                .mock_async(|when, then| {
                    when.path("/communes");
                    then.status(502)
                        .header("Content-Type", "text/html")
                        .body("<html><body>Bad gateway</body></html>");
                })
                .await;

            widget.input("Paris").expect("widget running");
            let done = renders.wait_for(|v| v.phase == Phase::Empty).await;

            assert!(!done.is_loading);
            assert!(done.results.is_empty());
        },
    )
    .await
}

#[tokio::test]
async fn region_searches_use_unaccented_paths() {
    apigeo_test(
        |settings| settings.search.territory_type = "régions".to_string(),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             ..
         }| async move {
            let regions = geo_api_mock
                .mock_async(|when, then| {
                    when.method(GET)
                        .path("/regions")
                        .query_param("nom", "Bre")
                        .query_param("fields", "region")
                        .query_param("boost", "population");
                    then.status(200)
                        .header("Content-Type", "application/json")
                        .json_body(json!([{ "nom": "Bretagne", "code": "53" }]));
                })
                .await;

            let first = renders.next().await;
            assert_eq!(first.placeholder, "Taper le nom du département");

            widget.input("Bre").expect("widget running");
            let done = renders.wait_for(|v| v.phase == Phase::Results).await;

            regions.assert_async().await;
            assert_eq!(done.results[0].nom, "Bretagne");
        },
    )
    .await
}

#[tokio::test]
async fn switching_territory_type_clears_the_input() {
    apigeo_test(
        |_| (),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             ..
         }| async move {
            let bor = mock_communes(&geo_api_mock, "Bor", communes("Bor", 3)).await;
            widget.input("Bor").expect("widget running");
            renders.wait_for(|v| v.phase == Phase::Results).await;

            widget
                .set_territory_type(TerritoryType::Departements)
                .expect("widget running");
            let reset = renders.wait_for(|v| v.phase == Phase::Idle).await;

            assert_eq!(reset.value, "");
            assert!(reset.results.is_empty());
            assert_eq!(reset.placeholder, "Taper le nom du département");
            assert_eq!(bor.hits_async().await, 1);

            // Same type again: nothing to reset, nothing drawn.
            widget
                .set_territory_type(TerritoryType::Departements)
                .expect("widget running");
            tokio::time::sleep(Duration::from_millis(100)).await;
            assert!(renders.pending().is_empty());
        },
    )
    .await
}

#[tokio::test]
async fn selecting_a_result_reports_the_whole_territory() {
    apigeo_test(
        |_| (),
        |TestingTools {
             widget,
             mut renders,
             geo_api_mock,
             selections,
             ..
         }| async move {
            mock_communes(&geo_api_mock, "Bor", communes("Bor", 3)).await;

            widget.input("Bor").expect("widget running");
            renders.wait_for(|v| v.phase == Phase::Results).await;
            widget.select_index(1).expect("widget running");
            let selected = renders.wait_for(|v| v.phase == Phase::Idle).await;

            assert_eq!(selected.value, "Bor 1");
            let expected = Territory {
                nom: "Bor 1".to_string(),
                code: "33001".to_string(),
                departement: Some(ParentTerritory {
                    nom: "Gironde".to_string(),
                    code: "33".to_string(),
                }),
                region: None,
            };
            let selected = selections.lock().expect("mutex was poisoned").clone();
            assert_eq!(selected, vec![expected]);
        },
    )
    .await
}

#[tokio::test]
async fn unreachable_api_clears_loading() {
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
             ..
         }| async move {
            widget.input("Lyon").expect("widget running");
            let failed = renders.wait_for(|v| v.phase == Phase::Empty).await;

            assert_eq!(failed.value, "Lyon");
            assert!(!failed.is_loading);
        },
    )
    .await
}
