//! Chat proxy: fixed persona prompt wrapped around caller history.

pub mod prompts;
pub mod proxy;

pub use proxy::{ChatMessage, ChatProxy, ChatRequest, ChatResponse, Role};
