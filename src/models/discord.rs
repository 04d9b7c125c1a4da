use serde::{Deserialize, Serialize};

/// Discord channel type for guild text channels
pub const GUILD_TEXT_CHANNEL: u8 = 0;

/// Token set returned by the OAuth2 code exchange
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OAuthTokens {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: String,
    /// Lifetime of the access token in seconds
    pub expires_in: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub discriminator: String,
    #[serde(default)]
    pub avatar: Option<String>,
}

/// A server (guild) the user belongs to
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordGuild {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub owner: bool,
    #[serde(default)]
    pub permissions: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DiscordChannel {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

impl DiscordChannel {
    pub fn is_text(&self) -> bool {
        self.kind == GUILD_TEXT_CHANNEL
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PostedMessage {
    pub id: String,
}

/// Result of a completed OAuth callback, handed back to the UI
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiscordConnection {
    pub user: DiscordUser,
    pub access_token: String,
    pub refresh_token: String,
    pub expires_in: i64,
    /// RFC 3339 instant at which the access token stops working
    pub expires_at: String,
    pub servers: Vec<DiscordGuild>,
    /// Guild the bot was just added to, if Discord reported one
    pub guild_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_type_field() {
        let channel: DiscordChannel =
            serde_json::from_str(r#"{"id":"1","name":"general","type":0}"#).unwrap();
        assert!(channel.is_text());

        let voice: DiscordChannel =
            serde_json::from_str(r#"{"id":"2","name":"Lounge","type":2}"#).unwrap();
        assert!(!voice.is_text());
    }

    #[test]
    fn test_guild_tolerates_missing_fields() {
        let guild: DiscordGuild = serde_json::from_str(r#"{"id":"9","name":"Amigos"}"#).unwrap();
        assert!(!guild.owner);
        assert!(guild.icon.is_none());
    }

    #[test]
    fn test_connection_serializes_camel_case() {
        let connection = DiscordConnection {
            user: DiscordUser {
                id: "1".to_string(),
                username: "ana".to_string(),
                discriminator: "0".to_string(),
                avatar: None,
            },
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 604800,
            expires_at: "2026-01-01T00:00:00Z".to_string(),
            servers: vec![],
            guild_id: Some("42".to_string()),
        };

        let json = serde_json::to_value(&connection).unwrap();
        assert_eq!(json["accessToken"], "a");
        assert_eq!(json["guildId"], "42");
        assert_eq!(json["expiresIn"], 604800);
    }
}
