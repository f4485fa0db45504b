//! Assistant system: tool registry and the tool-dispatch chat session.
//!
//! Bridges the hosted model's function-call protocol to the local catalog
//! operations. The tool set is a single canonical registry shared by the
//! schema definitions and the parser.

mod session;
mod tools;

pub use session::{ChatSession, ToolCallRecord, TurnResponse};
pub use tools::{parse_tool_call, tool_definitions, ToolCall, ToolContext};
