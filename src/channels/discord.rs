use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serenity::all::{
    Attachment, ChannelId, Context, CreateAttachment, CreateEmbed, CreateEmbedAuthor,
    CreateEmbedFooter, CreateMessage, EditAttachments, EditMessage, Embed, EventHandler,
    GatewayIntents, Message, MessageId, MessageUpdateEvent, OnlineStatus, Ready, Timestamp,
};
use serenity::http::Http;
use serenity::Client;
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::relay::{
    AttachmentRef, EmbedAuthor, EmbedField, ForwardOutcome, MessagePayload, RelayEmbed,
    RelayEngine, SourceMessage,
};
use crate::traits::RelayTransport;

/// REST-backed transport against the Discord API.
///
/// The HTTP handle is populated once the gateway client has started; calls
/// made before that fail fast instead of hanging.
pub struct DiscordTransport {
    http: Mutex<Option<Arc<Http>>>,
}

impl DiscordTransport {
    pub fn new() -> Self {
        Self {
            http: Mutex::new(None),
        }
    }

    async fn set_http(&self, http: Arc<Http>) {
        let mut guard = self.http.lock().await;
        *guard = Some(http);
    }

    async fn get_http(&self) -> anyhow::Result<Arc<Http>> {
        let guard = self.http.lock().await;
        guard
            .clone()
            .ok_or_else(|| anyhow::anyhow!("Discord HTTP client not ready"))
    }
}

impl Default for DiscordTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RelayTransport for DiscordTransport {
    async fn resolve_channel(&self, channel_id: u64) -> anyhow::Result<()> {
        let http = self.get_http().await?;
        http.get_channel(ChannelId::new(channel_id))
            .await
            .map_err(|e| anyhow::anyhow!("Could not fetch channel {}: {}", channel_id, e))?;
        Ok(())
    }

    async fn send_message(
        &self,
        channel_id: u64,
        payload: &MessagePayload,
    ) -> anyhow::Result<u64> {
        let http = self.get_http().await?;
        let mut msg = CreateMessage::new();
        if let Some(content) = &payload.content {
            msg = msg.content(content.clone());
        }
        msg = msg.embeds(payload.embeds.iter().map(embed_to_create).collect());
        for att in &payload.attachments {
            let file = CreateAttachment::url(&http, &att.url).await.map_err(|e| {
                anyhow::anyhow!("Failed to re-upload attachment {}: {}", att.filename, e)
            })?;
            msg = msg.add_file(file);
        }
        let sent = ChannelId::new(channel_id)
            .send_message(&http, msg)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to send message: {}", e))?;
        Ok(sent.id.get())
    }

    async fn fetch_message(&self, channel_id: u64, message_id: u64) -> anyhow::Result<()> {
        let http = self.get_http().await?;
        ChannelId::new(channel_id)
            .message(&http, MessageId::new(message_id))
            .await
            .map_err(|e| {
                anyhow::anyhow!("Could not fetch forwarded message {}: {}", message_id, e)
            })?;
        Ok(())
    }

    async fn edit_message(
        &self,
        channel_id: u64,
        message_id: u64,
        payload: &MessagePayload,
    ) -> anyhow::Result<()> {
        let http = self.get_http().await?;
        // Replace the attachment set wholesale so removed files disappear
        // from the forwarded copy too.
        let mut attachments = EditAttachments::new();
        for att in &payload.attachments {
            let file = CreateAttachment::url(&http, &att.url).await.map_err(|e| {
                anyhow::anyhow!("Failed to re-upload attachment {}: {}", att.filename, e)
            })?;
            attachments = attachments.add(file);
        }
        let edit = EditMessage::new()
            .content(payload.content.clone().unwrap_or_default())
            .embeds(payload.embeds.iter().map(embed_to_create).collect())
            .attachments(attachments);
        ChannelId::new(channel_id)
            .edit_message(&http, MessageId::new(message_id), edit)
            .await
            .map_err(|e| anyhow::anyhow!("Failed to edit message {}: {}", message_id, e))?;
        Ok(())
    }
}

fn embed_to_create(embed: &RelayEmbed) -> CreateEmbed {
    let mut out = CreateEmbed::new();
    if let Some(title) = &embed.title {
        out = out.title(title.clone());
    }
    if let Some(description) = &embed.description {
        out = out.description(description.clone());
    }
    if let Some(url) = &embed.url {
        out = out.url(url.clone());
    }
    if let Some(colour) = embed.colour {
        out = out.colour(colour);
    }
    if let Some(ts) = &embed.timestamp {
        if let Ok(ts) = Timestamp::parse(ts) {
            out = out.timestamp(ts);
        }
    }
    if let Some(author) = &embed.author {
        let mut a = CreateEmbedAuthor::new(author.name.clone());
        if let Some(url) = &author.url {
            a = a.url(url.clone());
        }
        if let Some(icon) = &author.icon_url {
            a = a.icon_url(icon.clone());
        }
        out = out.author(a);
    }
    if let Some(footer) = &embed.footer {
        out = out.footer(CreateEmbedFooter::new(footer.clone()));
    }
    if let Some(image) = &embed.image {
        out = out.image(image.clone());
    }
    if let Some(thumbnail) = &embed.thumbnail {
        out = out.thumbnail(thumbnail.clone());
    }
    for field in &embed.fields {
        out = out.field(field.name.clone(), field.value.clone(), field.inline);
    }
    out
}

fn relay_embed_from(embed: &Embed) -> RelayEmbed {
    RelayEmbed {
        title: embed.title.clone(),
        description: embed.description.clone(),
        url: embed.url.clone(),
        colour: embed.colour.map(|c| c.0),
        timestamp: embed.timestamp.as_ref().map(|t| t.to_string()),
        author: embed.author.as_ref().map(|a| EmbedAuthor {
            name: a.name.clone(),
            url: a.url.clone(),
            icon_url: a.icon_url.clone(),
        }),
        footer: embed.footer.as_ref().map(|f| f.text.clone()),
        image: embed.image.as_ref().map(|i| i.url.clone()),
        thumbnail: embed.thumbnail.as_ref().map(|t| t.url.clone()),
        fields: embed
            .fields
            .iter()
            .map(|f| EmbedField {
                name: f.name.clone(),
                value: f.value.clone(),
                inline: f.inline,
            })
            .collect(),
    }
}

fn attachment_ref_from(att: &Attachment) -> AttachmentRef {
    AttachmentRef {
        url: att.url.clone(),
        filename: att.filename.clone(),
    }
}

fn source_message_from(msg: &Message) -> SourceMessage {
    SourceMessage {
        id: msg.id.get(),
        channel_id: msg.channel_id.get(),
        author: msg.author.name.clone(),
        content: msg.content.clone(),
        embeds: msg.embeds.iter().map(relay_embed_from).collect(),
        attachments: msg.attachments.iter().map(attachment_ref_from).collect(),
    }
}

/// Discord gateway client that feeds source-channel events into the relay
/// engine.
pub struct DiscordRelay {
    bot_token: String,
    engine: Arc<RelayEngine>,
    transport: Arc<DiscordTransport>,
}

impl DiscordRelay {
    pub fn new(
        bot_token: &str,
        engine: Arc<RelayEngine>,
        transport: Arc<DiscordTransport>,
    ) -> Self {
        Self {
            bot_token: bot_token.to_string(),
            engine,
            transport,
        }
    }

    /// Start the Discord client with automatic retry on crash.
    /// Uses exponential backoff: 5s → 10s → 20s → 40s → 60s cap.
    pub async fn start_with_retry(self: Arc<Self>) {
        let initial_backoff = Duration::from_secs(5);
        let max_backoff = Duration::from_secs(60);
        let stable_threshold = Duration::from_secs(60);
        let mut backoff = initial_backoff;

        loop {
            info!("Starting Discord client");
            let started = tokio::time::Instant::now();
            self.clone().start().await;
            let ran_for = started.elapsed();

            if ran_for >= stable_threshold {
                backoff = initial_backoff;
            }

            warn!(
                backoff_secs = backoff.as_secs(),
                ran_for_secs = ran_for.as_secs(),
                "Discord client stopped, restarting"
            );
            tokio::time::sleep(backoff).await;
            backoff = std::cmp::min(backoff * 2, max_backoff);
        }
    }

    async fn start(self: Arc<Self>) {
        let intents = GatewayIntents::GUILDS
            | GatewayIntents::GUILD_MESSAGES
            | GatewayIntents::MESSAGE_CONTENT;

        let handler = RelayHandler {
            relay: Arc::clone(&self),
        };

        let mut client = match Client::builder(&self.bot_token, intents)
            .event_handler(handler)
            .await
        {
            Ok(c) => c,
            Err(e) => {
                warn!("Failed to create Discord client: {}", e);
                return;
            }
        };

        // Store the HTTP client so the transport can make REST calls.
        self.transport.set_http(client.http.clone()).await;

        if let Err(e) = client.start().await {
            warn!("Discord client error: {}", e);
        }
    }

    async fn handle_message_created(&self, msg: &Message) {
        let source = source_message_from(msg);
        match self.engine.on_message_created(&source).await {
            Ok(ForwardOutcome::Forwarded { .. }) | Ok(ForwardOutcome::NotSourceChannel) => {}
            Err(e) => {
                warn!(source_id = source.id, "Failed to forward message: {}", e);
            }
        }
    }

    async fn handle_message_edited(
        &self,
        ctx: &Context,
        new: Option<Message>,
        event: &MessageUpdateEvent,
    ) {
        // Cheap pre-filter: the engine only relays source-channel edits, so
        // skip the REST fetch for everything else.
        if event.channel_id.get() != self.engine.source_channel_id() {
            return;
        }

        // The gateway event may carry a partial payload; fall back to
        // fetching the full updated message over REST.
        let msg = match new {
            Some(m) => m,
            None => match event.channel_id.message(&ctx.http, event.id).await {
                Ok(m) => m,
                Err(e) => {
                    warn!(
                        source_id = event.id.get(),
                        "Could not fetch edited source message: {}", e
                    );
                    return;
                }
            },
        };

        let source = source_message_from(&msg);
        match self.engine.on_message_edited(&source).await {
            Ok(_) => {}
            Err(e) => {
                warn!(source_id = source.id, "Failed to relay edit: {}", e);
            }
        }
    }
}

/// Serenity event handler that bridges gateway events to the relay.
struct RelayHandler {
    relay: Arc<DiscordRelay>,
}

#[async_trait]
impl EventHandler for RelayHandler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        info!(username = %ready.user.name, "Logged in to Discord");
        ctx.set_presence(None, OnlineStatus::Invisible);
        info!("Presence set to invisible");
    }

    async fn message(&self, _ctx: Context, msg: Message) {
        self.relay.handle_message_created(&msg).await;
    }

    async fn message_update(
        &self,
        ctx: Context,
        _old_if_available: Option<Message>,
        new: Option<Message>,
        event: MessageUpdateEvent,
    ) {
        self.relay.handle_message_edited(&ctx, new, &event).await;
    }
}
