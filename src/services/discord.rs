/// Discord REST client
///
/// Covers the OAuth2 authorization-code flow (user credentials) and the two bot
/// actions the feed needs: listing a server's text channels and posting a link.
///
/// API Flow:
/// 1. Authorize: redirect to `/oauth2/authorize` → Discord redirects back with `code`
/// 2. Exchange: `/oauth2/token` → access + refresh token
/// 3. Profile: `/users/@me`, `/users/@me/guilds` (Bearer)
/// 4. Bot: `/guilds/{id}/channels`, `/channels/{id}/messages` (Bot)
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use reqwest::{header::AUTHORIZATION, Client as HttpClient, Response};
use serde::de::DeserializeOwned;
use serde_json::json;

use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{
        DiscordChannel, DiscordConnection, DiscordGuild, DiscordUser, OAuthTokens, PostedMessage,
    },
};

const OAUTH_SCOPE: &str = "identify guilds bot";
/// View Channels, Send Messages, Embed Links, Attach Files, Read Message History
const BOT_PERMISSIONS: &str = "117760";

/// Casual lead lines prepended to every shared link
const LEAD_LINES: &[&str] = &[
    "Mira este video bro😱😱",
    "Mira esto jaajaj😂",
    "Tenés que ver esto🔥",
    "JAJAJA mirá esto😭",
    "No puedo creer lo que vi🤯",
    "Esto está buenísimo🎬",
    "Che mirá este video💯",
    "WTF con esto😱",
    "Reacciona a este video porfa🙏",
    "Esto es oro puro✨",
];

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DiscordApi: Send + Sync {
    /// URL the user is sent to in order to authorize the app and add the bot
    fn authorize_url(&self) -> AppResult<String>;

    /// Exchange an authorization code for user tokens
    async fn exchange_code(&self, code: &str) -> AppResult<OAuthTokens>;

    async fn current_user(&self, access_token: &str) -> AppResult<DiscordUser>;

    async fn current_user_guilds(&self, access_token: &str) -> AppResult<Vec<DiscordGuild>>;

    /// Text channels of a guild, fetched with the bot credential
    async fn text_channels(&self, guild_id: &str) -> AppResult<Vec<DiscordChannel>>;

    /// Post a message to a channel as the bot
    async fn post_message(&self, channel_id: &str, content: &str) -> AppResult<PostedMessage>;
}

#[derive(Clone)]
pub struct DiscordClient {
    http_client: HttpClient,
    api_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
    redirect_uri: String,
    bot_token: Option<String>,
}

impl DiscordClient {
    pub fn new(http_client: HttpClient, config: &Config) -> Self {
        Self {
            http_client,
            api_url: config.discord_api_url.trim_end_matches('/').to_string(),
            client_id: config.discord_client_id.clone(),
            client_secret: config.discord_client_secret.clone(),
            redirect_uri: config.discord_redirect_uri.clone(),
            bot_token: config.discord_bot_token.clone(),
        }
    }

    fn client_id(&self) -> AppResult<&str> {
        self.client_id
            .as_deref()
            .ok_or_else(|| AppError::NotConfigured("Discord client id".to_string()))
    }

    fn bot_authorization(&self) -> AppResult<String> {
        self.bot_token
            .as_deref()
            .map(|token| format!("Bot {}", token))
            .ok_or_else(|| AppError::NotConfigured("Bot token".to_string()))
    }
}

#[async_trait]
impl DiscordApi for DiscordClient {
    fn authorize_url(&self) -> AppResult<String> {
        Ok(format!(
            "{}/oauth2/authorize?client_id={}&redirect_uri={}&response_type=code&scope={}&permissions={}",
            self.api_url,
            urlencoding::encode(self.client_id()?),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(OAUTH_SCOPE),
            BOT_PERMISSIONS,
        ))
    }

    async fn exchange_code(&self, code: &str) -> AppResult<OAuthTokens> {
        let client_id = self.client_id()?;
        let client_secret = self
            .client_secret
            .as_deref()
            .ok_or_else(|| AppError::NotConfigured("Discord client secret".to_string()))?;

        tracing::debug!("Exchanging Discord authorization code");

        let response = self
            .http_client
            .post(format!("{}/oauth2/token", self.api_url))
            .form(&[
                ("client_id", client_id),
                ("client_secret", client_secret),
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.redirect_uri.as_str()),
            ])
            .send()
            .await?;

        read_json(response).await
    }

    async fn current_user(&self, access_token: &str) -> AppResult<DiscordUser> {
        let response = self
            .http_client
            .get(format!("{}/users/@me", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        read_json(response).await
    }

    async fn current_user_guilds(&self, access_token: &str) -> AppResult<Vec<DiscordGuild>> {
        let response = self
            .http_client
            .get(format!("{}/users/@me/guilds", self.api_url))
            .bearer_auth(access_token)
            .send()
            .await?;

        read_json(response).await
    }

    async fn text_channels(&self, guild_id: &str) -> AppResult<Vec<DiscordChannel>> {
        let response = self
            .http_client
            .get(format!("{}/guilds/{}/channels", self.api_url, guild_id))
            .header(AUTHORIZATION, self.bot_authorization()?)
            .send()
            .await?;

        let channels: Vec<DiscordChannel> = read_json(response).await?;
        let total = channels.len();
        let text: Vec<DiscordChannel> = channels.into_iter().filter(|c| c.is_text()).collect();

        tracing::info!(guild_id = %guild_id, total, text = text.len(), "Fetched guild channels");

        Ok(text)
    }

    async fn post_message(&self, channel_id: &str, content: &str) -> AppResult<PostedMessage> {
        let response = self
            .http_client
            .post(format!("{}/channels/{}/messages", self.api_url, channel_id))
            .header(AUTHORIZATION, self.bot_authorization()?)
            .json(&json!({ "content": content }))
            .send()
            .await?;

        let posted: PostedMessage = read_json(response).await?;
        tracing::info!(channel_id = %channel_id, message_id = %posted.id, "Message posted");
        Ok(posted)
    }
}

/// Deserializes a successful response, or surfaces status and body as `ExternalApi`
async fn read_json<T: DeserializeOwned>(response: Response) -> AppResult<T> {
    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(status, body = %body, "Discord API request failed");
        return Err(AppError::ExternalApi { status, body });
    }
    Ok(response.json::<T>().await?)
}

/// Completes the OAuth callback: tokens, profile and server list in one record
pub async fn connect(
    api: &dyn DiscordApi,
    code: &str,
    guild_id: Option<String>,
) -> AppResult<DiscordConnection> {
    let tokens = api.exchange_code(code).await?;
    let user = api.current_user(&tokens.access_token).await?;
    let servers = api.current_user_guilds(&tokens.access_token).await?;

    tracing::info!(
        discord_user = %user.username,
        server_count = servers.len(),
        "Discord account connected"
    );

    let expires_at = expiry_instant(tokens.expires_in)?;

    Ok(DiscordConnection {
        user,
        access_token: tokens.access_token,
        refresh_token: tokens.refresh_token,
        expires_in: tokens.expires_in,
        expires_at,
        servers,
        guild_id,
    })
}

/// RFC 3339 instant `expires_in` seconds from now; out-of-range lifetimes are rejected
fn expiry_instant(expires_in: i64) -> AppResult<String> {
    Duration::try_seconds(expires_in)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .map(|instant| instant.to_rfc3339())
        .ok_or_else(|| AppError::Internal(format!("token lifetime out of range: {}", expires_in)))
}

/// Picks a random lead line for a shared link
pub fn random_lead_line() -> &'static str {
    LEAD_LINES
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(LEAD_LINES[0])
}

/// Message body posted to the channel: lead line, newline, link
pub fn compose_share_message(lead: &str, link: &str) -> String {
    format!("{}\n{}", lead, link)
}
