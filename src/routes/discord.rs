use axum::{
    extract::{Query, State},
    response::Redirect,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, AppResult},
    middleware::RequestId,
    models::{DiscordChannel, DiscordConnection},
    routes::AppState,
    services::discord::{compose_share_message, connect, random_lead_line},
};

#[derive(Debug, Deserialize)]
pub struct CallbackQuery {
    pub code: Option<String>,
    /// Server the bot was added to during authorization
    pub guild_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelsRequest {
    #[serde(default)]
    pub server_id: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ChannelsResponse {
    pub channels: Vec<DiscordChannel>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    #[serde(default)]
    pub channel_id: Option<String>,
    /// Link (or any text) to share
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageResponse {
    pub success: bool,
    pub message_id: String,
    pub random_message: String,
}

fn required(value: Option<String>, what: &str) -> AppResult<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::InvalidInput(format!("Missing {}", what)))
}

/// Redirects the browser to Discord's authorization screen
pub async fn authorize(State(state): State<AppState>) -> AppResult<Redirect> {
    let url = state.discord.authorize_url()?;
    Ok(Redirect::temporary(&url))
}

/// OAuth redirect target: exchanges the code and returns the connection record
pub async fn callback(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Query(query): Query<CallbackQuery>,
) -> AppResult<Json<DiscordConnection>> {
    let code = required(query.code, "code")?;

    tracing::info!(
        request_id = %request_id,
        guild_id = ?query.guild_id,
        "Processing Discord callback"
    );

    let connection = connect(state.discord.as_ref(), &code, query.guild_id).await?;
    Ok(Json(connection))
}

/// Lists the text channels of a server the bot is in
pub async fn channels(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ChannelsRequest>,
) -> AppResult<Json<ChannelsResponse>> {
    let server_id = required(request.server_id, "serverId")?;

    tracing::info!(request_id = %request_id, server_id = %server_id, "Listing channels");

    let channels = state.discord.text_channels(&server_id).await?;
    Ok(Json(ChannelsResponse { channels }))
}

/// Posts a shared link to a channel, prefixed with a random lead line
pub async fn send_message(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<SendMessageRequest>,
) -> AppResult<Json<SendMessageResponse>> {
    let channel_id = required(request.channel_id, "channelId or message")?;
    let message = required(request.message, "channelId or message")?;

    let lead = random_lead_line();
    let content = compose_share_message(lead, &message);

    tracing::info!(request_id = %request_id, channel_id = %channel_id, "Sending message");

    let posted = state.discord.post_message(&channel_id, &content).await?;

    Ok(Json(SendMessageResponse {
        success: true,
        message_id: posted.id,
        random_message: lead.to_string(),
    }))
}
