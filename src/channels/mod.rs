mod discord;

pub use discord::{DiscordRelay, DiscordTransport};
