//! Routes for driving NPC conversations.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use parley_core::field::Field;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use parley_conversation::application::{command_handlers, query_handlers};
use parley_conversation::domain::commands;

use crate::error::ApiError;
use crate::state::AppState;
use crate::tenant::Tenant;

/// Request body for POST /start.
#[derive(Debug, Deserialize)]
pub struct StartRequest {
    pub world_id: u8,
    pub channel_id: u8,
    pub map_id: u32,
    /// The NPC the character clicked.
    pub npc_id: u32,
    pub character_id: u32,
}

/// Request body for POST /continue.
#[derive(Debug, Deserialize)]
pub struct ContinueRequest {
    pub npc_id: u32,
    pub character_id: u32,
    /// Client action code; its meaning depends on the dialogue type.
    pub action: u8,
    pub last_message_type: u8,
    /// Chosen option index, or -1 when the client sent none.
    #[serde(default = "no_selection")]
    pub selection: i32,
}

const fn no_selection() -> i32 {
    -1
}

/// Request body for POST /continue-via-event.
#[derive(Debug, Deserialize)]
pub struct ContinueViaEventRequest {
    pub character_id: u32,
    pub action: u8,
    /// Zero-based index of the state to resume at; negative ends the
    /// conversation.
    pub reference_id: i32,
}

/// Request body for POST /end.
#[derive(Debug, Deserialize)]
pub struct EndRequest {
    pub character_id: u32,
}

/// Response body returned after a command is successfully handled.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// Correlation id the command was logged under.
    pub correlation_id: Uuid,
}

fn accepted(correlation_id: Uuid) -> (StatusCode, Json<CommandResponse>) {
    (StatusCode::ACCEPTED, Json(CommandResponse { correlation_id }))
}

/// POST /start
#[instrument(
    skip(state, request),
    fields(npc_id = request.npc_id, character_id = request.character_id)
)]
async fn start(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(request): Json<StartRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = commands::StartConversation {
        correlation_id: Uuid::new_v4(),
        tenant_id,
        field: Field::new(request.world_id, request.channel_id, request.map_id),
        npc_id: request.npc_id,
        character_id: request.character_id,
    };

    command_handlers::handle_start(&command, &state.processor).await?;

    Ok(accepted(command.correlation_id))
}

/// POST /continue
#[instrument(skip(state, request), fields(character_id = request.character_id))]
async fn continue_conversation(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(request): Json<ContinueRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = commands::ContinueConversation {
        correlation_id: Uuid::new_v4(),
        tenant_id,
        npc_id: request.npc_id,
        character_id: request.character_id,
        action: request.action,
        last_message_type: request.last_message_type,
        selection: request.selection,
    };

    command_handlers::handle_continue(&command, &state.processor).await?;

    Ok(accepted(command.correlation_id))
}

/// POST /continue-via-event
#[instrument(skip(state, request), fields(character_id = request.character_id))]
async fn continue_via_event(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(request): Json<ContinueViaEventRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = commands::ContinueConversationViaEvent {
        correlation_id: Uuid::new_v4(),
        tenant_id,
        character_id: request.character_id,
        action: request.action,
        reference_id: request.reference_id,
    };

    command_handlers::handle_continue_via_event(&command, &state.processor).await?;

    Ok(accepted(command.correlation_id))
}

/// POST /end
#[instrument(skip(state, request), fields(character_id = request.character_id))]
async fn end(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(request): Json<EndRequest>,
) -> Result<(StatusCode, Json<CommandResponse>), ApiError> {
    let command = commands::EndConversation {
        correlation_id: Uuid::new_v4(),
        tenant_id,
        character_id: request.character_id,
    };

    command_handlers::handle_end(&command, &state.processor).await?;

    Ok(accepted(command.correlation_id))
}

/// GET /{character_id}
#[instrument(skip(state))]
async fn get_session(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(character_id): Path<u32>,
) -> Result<Json<query_handlers::SessionView>, ApiError> {
    let view = query_handlers::get_session(state.processor.registry(), &tenant_id, character_id)?;
    Ok(Json(view))
}

/// Returns the conversation router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/start", post(start))
        .route("/continue", post(continue_conversation))
        .route("/continue-via-event", post(continue_via_event))
        .route("/end", post(end))
        .route("/{character_id}", get(get_session))
}
