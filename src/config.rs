use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub discord: DiscordConfig,
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DiscordConfig {
    /// Bot credential. The `DISCORD_BOT_TOKEN` environment variable takes
    /// precedence when set, so the secret can stay out of config.toml.
    #[serde(default)]
    pub bot_token: String,
    /// Channel whose messages are observed and relayed.
    pub source_channel_id: u64,
    /// Channel into which relayed copies are written.
    pub target_channel_id: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// How many forwarded messages remain editable. Oldest records are
    /// evicted first; an edit to an evicted message becomes a no-op, the
    /// same outcome as an edit arriving after a restart.
    #[serde(default = "default_max_tracked_messages")]
    pub max_tracked_messages: usize,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            max_tracked_messages: default_max_tracked_messages(),
        }
    }
}

fn default_max_tracked_messages() -> usize {
    8192
}

#[derive(Debug, Deserialize, Clone)]
pub struct DaemonConfig {
    #[serde(default = "default_health_port")]
    pub health_port: u16,
    /// IP address to bind the liveness server to (default: "0.0.0.0" so
    /// hosting platforms can reach it). Set to "127.0.0.1" for local-only.
    #[serde(default = "default_health_bind")]
    pub health_bind: String,
    /// Public URL to self-request periodically so the host does not idle the
    /// process out. Unset disables the pinger.
    #[serde(default)]
    pub keepalive_url: Option<String>,
    #[serde(default = "default_keepalive_interval_secs")]
    pub keepalive_interval_secs: u64,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            health_port: default_health_port(),
            health_bind: default_health_bind(),
            keepalive_url: None,
            keepalive_interval_secs: default_keepalive_interval_secs(),
        }
    }
}

fn default_health_port() -> u16 {
    8080
}

fn default_health_bind() -> String {
    "0.0.0.0".to_string()
}

fn default_keepalive_interval_secs() -> u64 {
    240
}

impl AppConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        if let Ok(token) = std::env::var("DISCORD_BOT_TOKEN") {
            if !token.is_empty() {
                config.discord.bot_token = token;
            }
        }
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        if self.discord.bot_token.is_empty() {
            anyhow::bail!("discord.bot_token is not set (config.toml or DISCORD_BOT_TOKEN)");
        }
        if self.discord.source_channel_id == 0 || self.discord.target_channel_id == 0 {
            anyhow::bail!("discord.source_channel_id and discord.target_channel_id must be set");
        }
        if self.discord.source_channel_id == self.discord.target_channel_id {
            anyhow::bail!("source and target channels must differ");
        }
        Ok(())
    }
}
