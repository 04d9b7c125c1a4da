pub mod discord;
pub mod providers;
pub mod recommendations;
pub mod relevance;
pub mod script;
pub mod shuffle;
pub mod text;

pub use discord::{DiscordApi, DiscordClient};
pub use providers::{InvidiousProvider, VideoProvider, YoutubeHtmlProvider};
pub use recommendations::RecommendationService;
