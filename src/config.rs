use serde::Deserialize;

/// Application configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Timeout applied to every upstream HTTP call, in seconds
    #[serde(default = "default_upstream_timeout_secs")]
    pub upstream_timeout_secs: u64,

    /// User agent presented to upstream sites
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Health-ranked directory of Invidious instances
    #[serde(default = "default_instance_directory_url")]
    pub instance_directory_url: String,

    /// Maximum number of instances tried per request
    #[serde(default = "default_max_instances")]
    pub max_instances: usize,

    /// Base URL of the YouTube web frontend
    #[serde(default = "default_youtube_base_url")]
    pub youtube_base_url: String,

    /// Discord REST API base URL
    #[serde(default = "default_discord_api_url")]
    pub discord_api_url: String,

    /// Discord OAuth2 application id
    #[serde(default)]
    pub discord_client_id: Option<String>,

    /// Discord OAuth2 application secret
    #[serde(default)]
    pub discord_client_secret: Option<String>,

    /// Where Discord sends the user after authorization
    #[serde(default = "default_discord_redirect_uri")]
    pub discord_redirect_uri: String,

    /// Bot credential used for channel listing and posting
    #[serde(default)]
    pub discord_bot_token: Option<String>,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_upstream_timeout_secs() -> u64 {
    8
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36"
        .to_string()
}

fn default_instance_directory_url() -> String {
    "https://api.invidious.io/instances.json?sort_by=health".to_string()
}

fn default_max_instances() -> usize {
    6
}

fn default_youtube_base_url() -> String {
    "https://www.youtube.com".to_string()
}

fn default_discord_api_url() -> String {
    "https://discord.com/api".to_string()
}

fn default_discord_redirect_uri() -> String {
    "http://localhost:3000/api/discord/callback".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            upstream_timeout_secs: default_upstream_timeout_secs(),
            user_agent: default_user_agent(),
            instance_directory_url: default_instance_directory_url(),
            max_instances: default_max_instances(),
            youtube_base_url: default_youtube_base_url(),
            discord_api_url: default_discord_api_url(),
            discord_client_id: None,
            discord_client_secret: None,
            discord_redirect_uri: default_discord_redirect_uri(),
            discord_bot_token: None,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
