//! CLI subcommand implementations.

pub mod contact;
pub mod render;
pub mod sections;
pub mod serve;
