use chronicle_common::{Activity, FetchOutcome, RecordStore, RestStore, StoreClient, StoreError};
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn coffee() -> Activity {
    Activity {
        id: "a1".into(),
        name: "Coffee".into(),
        time: "07:30".into(),
        description: None,
        timestamp: 1000,
    }
}

fn store_for(server: &MockServer) -> RestStore {
    RestStore::new(Some(server.uri()), Some("anon-key".into()), "activities")
}

#[tokio::test]
async fn list_requests_rows_ordered_by_time_with_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/activities"))
        .and(query_param("select", "*"))
        .and(query_param("order", "time.asc"))
        .and(header("apikey", "anon-key"))
        .and(header("authorization", "Bearer anon-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": "a1", "name": "Coffee", "time": "07:30", "description": null, "timestamp": 1000},
            {"id": "b2", "name": "Run", "time": "08:00", "timestamp": 2000}
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let activities = store_for(&server).list().await.unwrap();
    assert_eq!(activities.len(), 2);
    assert_eq!(activities[0], coffee());
    assert_eq!(activities[1].description, None);
}

#[tokio::test]
async fn upsert_posts_full_record_with_merge_preference() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/activities"))
        .and(header("prefer", "resolution=merge-duplicates,return=minimal"))
        .and(body_json(serde_json::json!([
            {"id": "a1", "name": "Coffee", "time": "07:30", "description": null, "timestamp": 1000}
        ])))
        .respond_with(ResponseTemplate::new(201))
        .expect(1)
        .mount(&server)
        .await;

    store_for(&server).upsert(&coffee()).await.unwrap();
}

#[tokio::test]
async fn delete_filters_on_id() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/rest/v1/activities"))
        .and(query_param("id", "eq.a1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(2)
        .mount(&server)
        .await;

    let store = store_for(&server);
    store.delete("a1").await.unwrap();
    // Deleting again is still a success.
    store.delete("a1").await.unwrap();
}

#[tokio::test]
async fn rejected_request_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/v1/activities"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let err = store_for(&server).upsert(&coffee()).await.unwrap_err();
    match err {
        StoreError::Rejected { status, body } => {
            assert_eq!(status, 401);
            assert_eq!(body, "invalid api key");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn unconfigured_store_constructs_and_fails_soft() {
    let store = RestStore::new(None, None, "activities");
    assert!(!store.is_configured());
    assert!(matches!(
        store.list().await.unwrap_err(),
        StoreError::NotConfigured(_)
    ));

    let client = StoreClient::new(Arc::new(store));
    assert_eq!(client.fetch_activities().await, FetchOutcome::Failed);
    assert!(!client.upsert_activity(&coffee()).await);
    assert!(!client.delete_activity("a1").await);
}

#[tokio::test]
async fn client_tells_empty_apart_from_failed() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/v1/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&server)
        .await;

    let client = StoreClient::new(Arc::new(store_for(&server)));
    assert_eq!(client.fetch_activities().await, FetchOutcome::Empty);

    let broken = StoreClient::new(Arc::new(RestStore::new(
        Some("http://127.0.0.1:9".into()),
        Some("anon-key".into()),
        "activities",
    )));
    assert_eq!(broken.fetch_activities().await, FetchOutcome::Failed);
}
