pub mod cli;
pub mod config;
pub mod history;
pub mod logging;
pub mod portfolio;
pub mod ws;
