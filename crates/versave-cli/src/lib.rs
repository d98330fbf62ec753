//! CLI library components for versave.

pub mod commands;
pub mod logging;
pub mod settings;
