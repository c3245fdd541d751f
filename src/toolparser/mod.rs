pub mod client;
pub mod models;

pub use client::ToolParserClient;
pub use models::{ToolIndexOutcome, ToolInput, ToolMetadata};
