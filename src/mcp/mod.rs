pub mod catalog;
pub mod gateway;
pub mod server;

pub use catalog::{catalog, ToolDescriptor, WORKFLOW_TOOL};
pub use gateway::{Envelope, Gateway};
pub use server::McpServer;
