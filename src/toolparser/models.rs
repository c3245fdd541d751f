use serde::{Deserialize, Serialize};

/// A single callable tool extracted from a repository
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolMetadata {
    pub name: String,
    pub doc: String,
    pub inputs: Vec<ToolInput>,
    pub output: String,
}

/// Declared input of a tool
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolInput {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
}

/// Outcome of a parse request, decided once at the service boundary
///
/// The upstream signals failure through the response shape (a bare JSON
/// string) rather than the status code. This is the tagged form callers
/// branch on; the raw shape is never re-inspected downstream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolIndexOutcome {
    Parsed {
        tools: Vec<ToolMetadata>,
        readme: String,
    },
    Rejected {
        message: String,
    },
}
