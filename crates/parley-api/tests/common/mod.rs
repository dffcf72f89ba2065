//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use parley_content::application::loader::{DocumentFormat, parse_definition};
use parley_content::application::repository::InMemoryDefinitionRepository;
use parley_core::tenant::TenantId;
use parley_test_support::{
    FixedClock, MockRng, RecordingMessenger, RecordingSagaProducer, ScriptedValidationService,
};
use tower::ServiceExt;
use uuid::Uuid;

use parley_api::routes;
use parley_api::state::AppState;

/// NPC whose conversation is loaded for `TENANT`.
pub const CAB_NPC: u32 = 1_012_000;

/// Tenant every helper request is sent for.
pub const TENANT: Uuid = Uuid::from_u128(0x0838_39c6_c47c_42a6_9585_7649_2795_d123);

/// A single closing notice spoken by `npc_id`.
pub fn notice_document(npc_id: u32, text: &str) -> serde_json::Value {
    serde_json::json!({
        "npcId": npc_id,
        "startState": "notice",
        "states": [
            {
                "id": "notice",
                "type": "dialogue",
                "dialogue": {
                    "dialogueType": "sendOk",
                    "text": text,
                    "choices": [{ "text": "Ok" }]
                }
            }
        ]
    })
}

/// A yes/no ride offer that charges 1000 mesos when accepted.
fn cab_document() -> serde_json::Value {
    serde_json::json!({
        "npcId": CAB_NPC,
        "startState": "ask",
        "states": [
            {
                "id": "ask",
                "type": "dialogue",
                "dialogue": {
                    "dialogueType": "sendYesNo",
                    "text": "Ride to Henesys for 1000 mesos?",
                    "choices": [
                        { "text": "Yes", "nextState": "pay" },
                        { "text": "No" },
                        { "text": "Exit" }
                    ]
                }
            },
            {
                "id": "pay",
                "type": "genericAction",
                "genericAction": {
                    "operations": [
                        { "type": "award_mesos", "params": { "amount": "-1000" } }
                    ],
                    "outcomes": [
                        {
                            "conditions": [
                                { "type": "meso", "operator": ">=", "value": "1000" }
                            ],
                            "nextState": "paid"
                        }
                    ]
                }
            },
            {
                "id": "paid",
                "type": "dialogue",
                "dialogue": {
                    "dialogueType": "sendOk",
                    "text": "Off we go.",
                    "choices": [{ "text": "Ok" }]
                }
            }
        ]
    })
}

/// The app router plus the recording doubles behind it.
pub struct TestApp {
    pub router: Router,
    pub messenger: Arc<RecordingMessenger>,
    pub sagas: Arc<RecordingSagaProducer>,
}

/// Build the full app router with in-memory definitions, recording
/// collaborators and a deterministic clock/RNG. Uses the same route
/// structure as `main.rs`.
pub fn build_test_app() -> TestApp {
    let definitions = Arc::new(InMemoryDefinitionRepository::new());
    let cab = parse_definition(&cab_document().to_string(), DocumentFormat::Json).unwrap();
    definitions.insert(TenantId::new(TENANT), cab);

    let messenger = Arc::new(RecordingMessenger::new());
    let sagas = Arc::new(RecordingSagaProducer::new());
    let clock = FixedClock(
        chrono::TimeZone::with_ymd_and_hms(&chrono::Utc, 2026, 1, 15, 10, 0, 0).unwrap(),
    );
    let app_state = AppState::new(
        definitions,
        Arc::new(ScriptedValidationService::always(true)),
        sagas.clone(),
        messenger.clone(),
        Arc::new(clock),
        Box::new(MockRng),
    );

    let router = Router::new()
        .merge(routes::health::router())
        .nest("/api/v1/conversations", routes::conversations::router())
        .nest("/api/v1/characters", routes::characters::router())
        .nest("/api/v1/npcs", routes::npcs::router())
        .with_state(app_state);

    TestApp {
        router,
        messenger,
        sagas,
    }
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap()
    };

    (status, json)
}

/// Send a POST request with a JSON body for `TENANT` and return the
/// response. Empty bodies come back as `Value::Null`.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("TENANT_ID", TENANT.to_string())
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a POST request with a JSON body and no tenant header.
pub async fn post_json_without_tenant(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a PATCH request with a JSON body for `TENANT` and return the
/// response.
pub async fn patch_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("PATCH")
        .uri(uri)
        .header("content-type", "application/json")
        .header("TENANT_ID", TENANT.to_string())
        .body(Body::from(serde_json::to_vec(body).unwrap()))
        .unwrap();

    send(app, request).await
}

/// Send a DELETE request for `TENANT` and return the response.
pub async fn delete(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("TENANT_ID", TENANT.to_string())
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}

/// Send a GET request for `TENANT` and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("GET")
        .uri(uri)
        .header("TENANT_ID", TENANT.to_string())
        .body(Body::empty())
        .unwrap();

    send(app, request).await
}
