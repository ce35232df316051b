pub mod analyze;
pub mod batch;
pub mod config;
pub mod discover;
pub mod error;
pub mod external;
pub mod gather;
pub mod mcp;
pub mod output;
pub mod probe;
pub mod result;
pub mod toolkit;
pub mod utils;
pub mod workflow;

// re-export the types used by the binary and tests
pub use crate::result::{ResultSet, ToolFailure};
pub use crate::toolkit::{ProjectDiscovery, Toolkit};
