//! Routes for character status events.

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{info, instrument};

use parley_conversation::application::command_handlers;
use parley_conversation::domain::status::{CharacterStatusEvent, StatusEventKind};

use crate::error::ApiError;
use crate::state::AppState;
use crate::tenant::Tenant;

/// Status event kinds, tagged by `type`.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StatusEventBody {
    Logout,
    ChannelChanged,
    MapChanged,
    MesoChanged {
        amount: i32,
    },
    Error {
        error: String,
        #[serde(default)]
        amount: i32,
    },
}

impl From<StatusEventBody> for StatusEventKind {
    fn from(body: StatusEventBody) -> Self {
        match body {
            StatusEventBody::Logout => Self::Logout,
            StatusEventBody::ChannelChanged => Self::ChannelChanged,
            StatusEventBody::MapChanged => Self::MapChanged,
            StatusEventBody::MesoChanged { amount } => Self::MesoChanged { amount },
            StatusEventBody::Error { error, amount } => Self::Error { error, amount },
        }
    }
}

/// Request body for POST /status-events.
#[derive(Debug, Deserialize)]
pub struct StatusEventRequest {
    pub character_id: u32,
    pub world_id: u8,
    #[serde(flatten)]
    pub body: StatusEventBody,
}

/// POST /status-events
#[instrument(skip(state, request), fields(character_id = request.character_id))]
async fn status_event(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(request): Json<StatusEventRequest>,
) -> Result<StatusCode, ApiError> {
    let event = CharacterStatusEvent {
        tenant_id,
        character_id: request.character_id,
        world_id: request.world_id,
        kind: request.body.into(),
    };
    info!(kind = ?event.kind, "handling character status event");

    command_handlers::handle_status_event(&event, &state.processor).await?;

    Ok(StatusCode::NO_CONTENT)
}

/// Returns the character router.
pub fn router() -> Router<AppState> {
    Router::new().route("/status-events", post(status_event))
}
