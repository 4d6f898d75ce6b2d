//! The Slurm side of jobinfo: job identity, the merged job view and the
//! command adapters that fetch raw records.

pub mod job;
pub mod source;

pub use job::{JobId, MergedJob, QueueInfo};
pub use source::{JobSource, SlurmCommands};
