//! Routes for NPC conversation definitions.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use parley_content::domain::document::ConversationDocument;
use parley_core::error::DomainError;
use tracing::instrument;
use uuid::Uuid;

use parley_conversation::application::query_handlers::{self, DefinitionSummaryView};

use crate::error::ApiError;
use crate::state::AppState;
use crate::tenant::Tenant;

/// GET /{npc_id}/conversation
#[instrument(skip(state))]
async fn get_conversation(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(npc_id): Path<u32>,
) -> Result<Json<DefinitionSummaryView>, ApiError> {
    let view =
        query_handlers::get_definition_summary(&*state.definitions, &tenant_id, npc_id).await?;
    Ok(Json(view))
}

/// GET /conversations
#[instrument(skip(state))]
async fn list_conversations(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
) -> Result<Json<Vec<DefinitionSummaryView>>, ApiError> {
    let definitions = state.definitions.list(&tenant_id).await?;
    Ok(Json(definitions.into_iter().map(Into::into).collect()))
}

/// GET /conversations/{conversation_id}
#[instrument(skip(state))]
async fn get_conversation_by_id(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(conversation_id): Path<Uuid>,
) -> Result<Json<DefinitionSummaryView>, ApiError> {
    let definition = state
        .definitions
        .find_by_id(&tenant_id, conversation_id)
        .await?
        .ok_or_else(|| DomainError::NotFound(format!("conversation [{conversation_id}]")))?;
    Ok(Json(definition.into()))
}

/// POST /conversations
#[instrument(skip(state, document), fields(npc_id = document.npc_id))]
async fn create_conversation(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Json(document): Json<ConversationDocument>,
) -> Result<(StatusCode, Json<DefinitionSummaryView>), ApiError> {
    let definition = document.into_definition()?;
    let created = state.definitions.create(&tenant_id, definition).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

/// PATCH /conversations/{conversation_id}
///
/// The body is a full document; it replaces the stored definition.
#[instrument(skip(state, document), fields(npc_id = document.npc_id))]
async fn update_conversation(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(conversation_id): Path<Uuid>,
    Json(document): Json<ConversationDocument>,
) -> Result<Json<DefinitionSummaryView>, ApiError> {
    let definition = document.into_definition()?;
    let updated = state
        .definitions
        .update(&tenant_id, conversation_id, definition)
        .await?;
    Ok(Json(updated.into()))
}

/// DELETE /conversations/{conversation_id}
#[instrument(skip(state))]
async fn delete_conversation(
    State(state): State<AppState>,
    Tenant(tenant_id): Tenant,
    Path(conversation_id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    state
        .definitions
        .delete(&tenant_id, conversation_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Returns the NPC router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/conversations",
            get(list_conversations).post(create_conversation),
        )
        .route(
            "/conversations/{conversation_id}",
            get(get_conversation_by_id)
                .patch(update_conversation)
                .delete(delete_conversation),
        )
        .route("/{npc_id}/conversation", get(get_conversation))
}
