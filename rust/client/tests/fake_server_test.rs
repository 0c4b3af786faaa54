// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Fetcher tests against an in-process fake Speckle server.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use systems_data_client::graphql::CHILDREN_PAGE_SIZE;
use systems_data_client::{
    build_http_client, ClientError, FetchMode, FetchRequest, Fetcher, GraphQlClient,
    ServerTransport,
};
use systems_data_core::{group_by_classification, GroupingOptions, DEFAULT_CLASSIFICATION_PARAMETER};

const TOKEN: &str = "test-token";
const PROJECT: &str = "proj1";

struct FakeServer {
    /// Objects in stream order; the requested object is served first.
    objects: Vec<(String, Value)>,
    /// When set, the Commit query returns GraphQL errors and no data.
    fail_children: bool,
}

fn parameter(name: &str, value: Value, units: Value) -> Value {
    json!({
        "speckle_type": "Objects.BuiltElements.Revit.Parameter",
        "name": name,
        "value": value,
        "units": units
    })
}

fn model_objects() -> Vec<(String, Value)> {
    let reference = |id: &str| json!({"speckle_type": "reference", "referencedId": id});

    vec![
        (
            "root".into(),
            json!({
                "id": "root",
                "speckle_type": "Base",
                "__closure": {"duct1": 1, "pipe1": 1, "view1": 1, "type1": 2},
                "elements": [reference("duct1"), reference("pipe1")],
                "@Views": [reference("view1")],
                "@Types": {
                    "id": "types",
                    "@Objects.BuiltElements.Revit.RevitDuct": [reference("type1")]
                }
            }),
        ),
        (
            "duct1".into(),
            json!({
                "id": "duct1",
                "speckle_type": "Objects.BuiltElements.Revit.RevitDuct",
                "parameters": {
                    "LENGTH": parameter("Length", json!(2400), json!("mm")),
                    "CLASS": parameter(DEFAULT_CLASSIFICATION_PARAMETER, json!("Ventilation systems"), Value::Null)
                }
            }),
        ),
        (
            "pipe1".into(),
            json!({
                "id": "pipe1",
                "speckle_type": "Objects.BuiltElements.Revit.RevitPipe",
                "parameters": {
                    "CLASS": parameter(DEFAULT_CLASSIFICATION_PARAMETER, json!("Drainage systems"), Value::Null)
                }
            }),
        ),
        (
            "view1".into(),
            json!({"id": "view1", "speckle_type": "Objects.BuiltElements.View3D"}),
        ),
        (
            "type1".into(),
            json!({
                "id": "type1",
                "speckle_type": "Objects.BuiltElements.Revit.RevitElementType",
                "parameters": {
                    "CLASS": parameter(DEFAULT_CLASSIFICATION_PARAMETER, json!("Ventilation systems"), Value::Null),
                    "MAT": parameter("Material", json!("Galvanised steel"), Value::Null)
                }
            }),
        ),
    ]
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(|v| v == format!("Bearer {}", TOKEN))
        .unwrap_or(false)
}

async fn graphql(
    State(server): State<Arc<FakeServer>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let operation = body["operationName"].as_str().unwrap_or_default();
    let variables = &body["variables"];

    let response = match operation {
        "ActiveUser" if authorized(&headers) => {
            json!({"data": {"activeUser": {"id": "user1", "name": "Test User"}}})
        }
        "ActiveUser" => json!({"data": {"activeUser": null}}),
        "Version" => {
            assert_eq!(variables["projectId"], json!(PROJECT));
            json!({"data": {"project": {"version": {
                "id": variables["versionId"].clone(),
                "referencedObject": "root"
            }}}})
        }
        "Stream" => json!({"data": {"project": {"versions": {"items": [
            {"id": "latest", "referencedObject": "root"}
        ]}}}}),
        "Commit" if server.fail_children => {
            json!({"errors": [{"message": "You do not have access to this resource."}]})
        }
        "Commit" => {
            let objects: Vec<Value> = server
                .objects
                .iter()
                .filter(|(id, _)| id != "root")
                .map(|(id, data)| json!({"id": id, "data": data}))
                .collect();
            json!({"data": {"project": {"object": {"children": {
                "totalCount": objects.len(),
                "cursor": null,
                "objects": objects
            }}}}})
        }
        other => return (StatusCode::BAD_REQUEST, format!("unknown operation {other}")).into_response(),
    };

    Json(response).into_response()
}

async fn objects(
    State(server): State<Arc<FakeServer>>,
    headers: HeaderMap,
    Path((project, object)): Path<(String, String)>,
) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if project != PROJECT {
        return StatusCode::NOT_FOUND.into_response();
    }

    let table: HashMap<&str, &Value> = server
        .objects
        .iter()
        .map(|(id, value)| (id.as_str(), value))
        .collect();

    let Some(requested) = table.get(object.as_str()) else {
        return StatusCode::NOT_FOUND.into_response();
    };

    let mut lines = vec![format!("{}\t{}", object, requested)];
    for (id, value) in &server.objects {
        if *id != object {
            lines.push(format!("{}\t{}", id, value));
        }
    }

    lines.join("\n").into_response()
}

async fn spawn_server(server: FakeServer) -> String {
    let app = Router::new()
        .route("/graphql", post(graphql))
        .route("/objects/:project/:object", get(objects))
        .with_state(Arc::new(server));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}/", addr)
}

fn fetcher(server_url: &str, token: &str) -> Fetcher {
    let http = build_http_client(Duration::from_secs(10)).unwrap();
    Fetcher::new(server_url, token, http)
}

fn request(server_url: &str, mode: FetchMode) -> FetchRequest {
    FetchRequest {
        project_id: PROJECT.into(),
        model_url: format!("{}projects/{}", server_url, PROJECT),
        version_id: Some("v1".into()),
        mode,
    }
}

#[tokio::test]
async fn transport_fetch_collects_elements_views_and_types() {
    let url = spawn_server(FakeServer { objects: model_objects(), fail_children: false }).await;
    let fetcher = fetcher(&url, TOKEN);

    let user = fetcher.authenticate().await.unwrap();
    assert_eq!(user.id, "user1");

    let model = fetcher.fetch(&request(&url, FetchMode::Transport)).await.unwrap();
    assert_eq!(model.version_object_id, "root");
    assert!(!model.include_speckle_type());

    let ids: Vec<&str> = model.records.iter().map(|r| r.object_id.as_str()).collect();
    assert_eq!(ids, vec!["view1", "duct1", "pipe1", "type1"]);
    assert!(model.records.iter().all(|r| r.version_id == "root"));

    let groups = group_by_classification(&model.records, &GroupingOptions::default());
    assert_eq!(
        groups.names().collect::<Vec<_>>(),
        vec!["Ventilation systems", "Drainage systems"]
    );
    assert_eq!(groups.get("Ventilation systems").unwrap().len(), 2);
}

#[tokio::test]
async fn graphql_fetch_uses_object_children() {
    let url = spawn_server(FakeServer { objects: model_objects(), fail_children: false }).await;
    let fetcher = fetcher(&url, TOKEN);

    let mut req = request(&url, FetchMode::GraphQl);
    req.version_id = None;
    let model = fetcher.fetch(&req).await.unwrap();

    assert!(model.include_speckle_type());
    assert_eq!(model.records.len(), 4);
    assert_eq!(
        model.records[0].speckle_type(),
        Some("Objects.BuiltElements.Revit.RevitDuct")
    );
}

#[tokio::test]
async fn invalid_token_fails_authentication() {
    let url = spawn_server(FakeServer { objects: model_objects(), fail_children: false }).await;
    let err = fetcher(&url, "wrong").authenticate().await.unwrap_err();
    assert!(matches!(err, ClientError::Authentication(_)));
}

#[tokio::test]
async fn graphql_errors_without_data_are_reported() {
    let url = spawn_server(FakeServer { objects: model_objects(), fail_children: true }).await;
    let http = build_http_client(Duration::from_secs(10)).unwrap();
    let client = GraphQlClient::new(&url, TOKEN, http);

    let err = client.object_children(PROJECT, "root").await.unwrap_err();
    match err {
        ClientError::GraphQl(message) => assert!(message.contains("do not have access")),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn missing_objects_are_not_found() {
    let url = spawn_server(FakeServer { objects: model_objects(), fail_children: false }).await;
    let http = build_http_client(Duration::from_secs(10)).unwrap();
    let transport = ServerTransport::new(&url, PROJECT, TOKEN, http);

    let err = transport.receive("nope").await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound(_)));

    let duct = transport.receive("duct1").await.unwrap();
    assert_eq!(duct.speckle_type(), Some("Objects.BuiltElements.Revit.RevitDuct"));
}

/// Cursors received by the paged children endpoint, in request order.
type SeenCursors = Arc<Mutex<Vec<Value>>>;

const SECOND_PAGE_LEN: usize = 3;

fn child(index: usize) -> Value {
    json!({"id": format!("c{index}"), "data": {"speckle_type": "Base", "index": index}})
}

async fn paged_children(State(seen): State<SeenCursors>, Json(body): Json<Value>) -> Json<Value> {
    let cursor = body["variables"]["cursor"].clone();
    assert_eq!(body["variables"]["limit"], json!(CHILDREN_PAGE_SIZE));
    seen.lock().unwrap().push(cursor.clone());

    let total = CHILDREN_PAGE_SIZE + SECOND_PAGE_LEN;
    let (range, next) = match cursor.as_str() {
        None => (0..CHILDREN_PAGE_SIZE, "page-2"),
        Some("page-2") => (CHILDREN_PAGE_SIZE..total, "page-3"),
        Some(other) => panic!("cursor past the last page: {other}"),
    };

    Json(json!({"data": {"project": {"object": {"children": {
        "totalCount": total,
        "cursor": next,
        "objects": range.map(child).collect::<Vec<_>>()
    }}}}}))
}

#[tokio::test]
async fn object_children_follow_the_cursor_until_a_short_page() {
    let seen: SeenCursors = Arc::default();
    let app = Router::new()
        .route("/graphql", post(paged_children))
        .with_state(seen.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let http = build_http_client(Duration::from_secs(10)).unwrap();
    let client = GraphQlClient::new(&format!("http://{}", addr), TOKEN, http);
    let children = client.object_children(PROJECT, "root").await.unwrap();

    assert_eq!(children.len(), CHILDREN_PAGE_SIZE + SECOND_PAGE_LEN);
    assert_eq!(children[0].id, "c0");
    assert_eq!(children[CHILDREN_PAGE_SIZE].id, format!("c{}", CHILDREN_PAGE_SIZE));
    assert_eq!(
        children.last().unwrap().id,
        format!("c{}", CHILDREN_PAGE_SIZE + SECOND_PAGE_LEN - 1)
    );
    assert_eq!(*seen.lock().unwrap(), vec![Value::Null, json!("page-2")]);
}
