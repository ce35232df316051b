pub mod bug_bounty;
pub mod steps;
pub mod summary;

pub use bug_bounty::run_bug_bounty_workflow;
pub use steps::{Stage, StageRecord, Steps};
pub use summary::{WorkflowReport, WorkflowSummary};
