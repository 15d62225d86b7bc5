//! CLI subcommand implementations.

pub mod age;
pub mod chart;
pub mod delete;
pub mod form;
pub mod log;
pub mod series;
pub mod show;
pub mod status;
pub mod util;
