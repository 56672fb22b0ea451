//! Setup and evaluation run through the OpenSearch client against a mock server.

use std::sync::Arc;
use std::time::Duration;

use catalog_search_pipeline::{Evaluator, PipelineError, ReadinessConfig, Setup, SetupConfig};
use catalog_search_repository::{IndexConfig, OpenSearchClient, SearchIndexConfig};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CATALOG: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<catalog>
  <product><name>Молоко 3.2%</name><brand>Простоквашино</brand><price>89.90</price></product>
  <product><name>Кефир 1%</name><brand>Простоквашино</brand></product>
  <product><name>Чай черный</name><store>lenta</store></product>
</catalog>"#;

fn client_for(server: &MockServer, batch_size: usize) -> Arc<OpenSearchClient> {
    Arc::new(
        OpenSearchClient::new(
            &server.uri(),
            IndexConfig::default(),
            SearchIndexConfig::with_max_batch_size(batch_size),
        )
        .unwrap(),
    )
}

fn setup_config(catalog_path: std::path::PathBuf, max_attempts: u32) -> SetupConfig {
    SetupConfig {
        catalog_path,
        readiness: ReadinessConfig::new(max_attempts, Duration::from_millis(10)),
    }
}

async fn mount_index_endpoints(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/catalog_products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/catalog_products/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": false, "items": [] })))
        .mount(server)
        .await;
    Mock::given(path("/catalog_products/_refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "_shards": { "total": 1 } })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_setup_waits_then_loads_catalog() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    mount_index_endpoints(&server).await;

    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog_products.xml");
    std::fs::write(&catalog_path, CATALOG).unwrap();

    let report = Setup::new(client_for(&server, 2), setup_config(catalog_path, 5))
        .run()
        .await
        .unwrap();

    assert_eq!(report.ready_after_attempts, 3);
    assert_eq!(report.load.total, 3);
    assert_eq!(report.load.succeeded, 3);

    let requests = server.received_requests().await.unwrap();
    let bulk_docs: Vec<Value> = requests
        .iter()
        .filter(|r| r.url.path() == "/catalog_products/_bulk")
        .flat_map(|r| {
            String::from_utf8(r.body.clone())
                .unwrap()
                .lines()
                .filter(|line| !line.is_empty())
                .map(|line| serde_json::from_str::<Value>(line).unwrap())
                .collect::<Vec<_>>()
        })
        .filter(|line| line.get("index").is_none())
        .collect();

    assert_eq!(bulk_docs.len(), 3);
    assert_eq!(bulk_docs[0]["price"], 89.9);
    assert_eq!(bulk_docs[2]["store"], "lenta");
}

fn bulk_action_ids(requests: &[wiremock::Request]) -> Vec<Vec<String>> {
    requests
        .iter()
        .filter(|r| r.url.path() == "/catalog_products/_bulk")
        .map(|r| {
            String::from_utf8(r.body.clone())
                .unwrap()
                .lines()
                .filter(|line| !line.is_empty())
                .map(|line| serde_json::from_str::<Value>(line).unwrap())
                .filter_map(|line| line["index"]["_id"].as_str().map(str::to_string))
                .collect()
        })
        .collect()
}

#[tokio::test]
async fn test_setup_rerun_overwrites_same_documents() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/catalog_products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/catalog_products"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "type": "resource_already_exists_exception" },
            "status": 400
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/catalog_products/_bulk"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "errors": false, "items": [] })))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(path("/catalog_products/_refresh"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let catalog_path = dir.path().join("catalog_products.xml");
    std::fs::write(&catalog_path, CATALOG).unwrap();

    for _ in 0..2 {
        Setup::new(client_for(&server, 1000), setup_config(catalog_path.clone(), 1))
            .run()
            .await
            .unwrap();
    }

    let requests = server.received_requests().await.unwrap();
    let ids = bulk_action_ids(&requests);
    assert_eq!(ids.len(), 2);
    assert_eq!(ids[0], vec!["0", "1", "2"]);
    assert_eq!(ids[0], ids[1]);
}

#[tokio::test]
async fn test_setup_gives_up_when_engine_never_answers() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let result = Setup::new(
        client_for(&server, 1000),
        setup_config(dir.path().join("catalog_products.xml"), 3),
    )
    .run()
    .await;

    assert!(matches!(result, Err(PipelineError::NotReady { attempts: 3 })));
}

#[tokio::test]
async fn test_setup_fails_on_missing_catalog_after_index_creation() {
    let server = MockServer::start().await;
    Mock::given(path("/"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/catalog_products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "acknowledged": true })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let result = Setup::new(
        client_for(&server, 1000),
        setup_config(dir.path().join("missing.xml"), 1),
    )
    .run()
    .await;

    assert!(matches!(result, Err(PipelineError::CatalogError(_))));
}

#[tokio::test]
async fn test_evaluation_writes_report_from_engine_hits() {
    let server = MockServer::start().await;
    Mock::given(path("/catalog_products/_search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "hits": {
                "hits": [
                    { "_score": 2.5, "_source": { "name": "Молоко 3.2%" } },
                    { "_score": 1.25, "_source": { "name": "Молочный коктейль" } }
                ]
            }
        })))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let queries_path = dir.path().join("prefix_queries.csv");
    let report_path = dir.path().join("reports").join("elasticsearch_evaluation_results.csv");
    std::fs::write(&queries_path, "query,site,type,notes\nмол,lenta,prefix,\n").unwrap();

    let summary = Evaluator::new(client_for(&server, 1000))
        .run(&queries_path, &report_path)
        .await
        .unwrap();

    assert_eq!(summary.queries, 1);
    assert_eq!(summary.zero_results, 0);

    let report = std::fs::read_to_string(&report_path).unwrap();
    let row = report.lines().nth(1).unwrap();
    assert!(row.starts_with("мол,lenta,prefix,,Молоко 3.2%|Молочный коктейль,|,"));

    let requests = server.received_requests().await.unwrap();
    let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["size"], 3);
    assert_eq!(
        body["query"]["bool"]["should"][0]["multi_match"]["fuzziness"],
        "AUTO"
    );
}
