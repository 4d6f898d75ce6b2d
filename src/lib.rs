pub mod assembler;
pub mod config;
pub mod error;
pub mod fields;
pub mod gpu;
pub mod identity;
pub mod record;
pub mod report;
pub mod slurm;
