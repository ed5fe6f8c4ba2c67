//! Outfit suggestions from a chat-completion model

pub mod client;
pub mod parse;
pub mod prompt;

pub use client::{ChatMessage, CompletionClient, CompletionParams, OpenRouterClient};
pub use parse::parse_outfits;
pub use prompt::build_messages;
