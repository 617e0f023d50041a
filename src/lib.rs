pub mod automation;
pub mod commands;
