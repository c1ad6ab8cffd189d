//! Shared wire types for the orchestration boundary.

pub mod tool;

pub use tool::{FunctionDefinition, ToolCall, ToolDefinition, ToolResult};
