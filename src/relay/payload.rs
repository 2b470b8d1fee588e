//! Platform-neutral message shapes and the normalization rules applied to
//! every payload before it is sent to the target channel.

/// A file attached to a message, referenced by its CDN URL. Forwarding
/// re-uploads the file into the target channel from this URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub url: String,
    pub filename: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EmbedAuthor {
    pub name: String,
    pub url: Option<String>,
    pub icon_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbedField {
    pub name: String,
    pub value: String,
    pub inline: bool,
}

/// A structured rich-content block, distinct from plain text and from file
/// attachments.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RelayEmbed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub colour: Option<u32>,
    /// RFC 3339 timestamp, kept as text so this type stays platform-neutral.
    pub timestamp: Option<String>,
    pub author: Option<EmbedAuthor>,
    pub footer: Option<String>,
    pub image: Option<String>,
    pub thumbnail: Option<String>,
    pub fields: Vec<EmbedField>,
}

impl RelayEmbed {
    /// Copy of this embed with the footer removed. Every other field,
    /// including image and thumbnail, carries over untouched.
    pub fn without_footer(&self) -> RelayEmbed {
        RelayEmbed {
            footer: None,
            ..self.clone()
        }
    }
}

/// Snapshot of an incoming message, already converted away from the
/// platform client's types. The author name is used for logging only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceMessage {
    pub id: u64,
    pub channel_id: u64,
    pub author: String,
    pub content: String,
    pub embeds: Vec<RelayEmbed>,
    pub attachments: Vec<AttachmentRef>,
}

/// Outbound create/edit payload for the target channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessagePayload {
    /// `None` means "no text", which the platform treats differently from an
    /// empty string.
    pub content: Option<String>,
    pub embeds: Vec<RelayEmbed>,
    pub attachments: Vec<AttachmentRef>,
}

impl MessagePayload {
    /// Normalization shared by the create and edit paths: text becomes an
    /// absent marker when empty, every embed loses its footer, and
    /// attachments keep their original order.
    pub fn from_source(msg: &SourceMessage) -> Self {
        Self {
            content: if msg.content.is_empty() {
                None
            } else {
                Some(msg.content.clone())
            },
            embeds: msg.embeds.iter().map(RelayEmbed::without_footer).collect(),
            attachments: msg.attachments.clone(),
        }
    }
}
