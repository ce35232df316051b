pub mod runner;
pub mod tools;

pub use runner::{run_tool, stream_cmd_lines, ToolInvocation};
pub use tools::{Capability, ToolPaths};
