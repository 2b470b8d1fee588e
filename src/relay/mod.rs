mod engine;
mod payload;
mod store;

pub use engine::{EditOutcome, ForwardOutcome, RelayEngine, RelayError};
pub use payload::{
    AttachmentRef, EmbedAuthor, EmbedField, MessagePayload, RelayEmbed, SourceMessage,
};
pub use store::ForwardStore;
