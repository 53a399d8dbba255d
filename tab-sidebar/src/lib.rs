//! The core of a browser sidebar, which lists the tabs of one window.
//!
//! A `SidebarSession` keeps an ordered, keyed tab registry consistent with the browser's
//! event feed, applies the user's selection and filter, and turns the selection into
//! batch commands against the browser's `TabApi`.
use crate::config::SidebarConfig;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

pub mod config;
pub mod message;
pub mod session;
pub mod state;

mod bus;
mod prelude;
mod resource;
mod service;

pub use session::{SidebarSession, StateUninitalizedError};

/// Installs a stderr logger at the configured level
pub fn init_logging(config: &SidebarConfig) -> anyhow::Result<()> {
    let log_config = simplelog::ConfigBuilder::new()
        .set_time_format_str("%H:%M:%S%.3f SBR")
        .build();

    TermLogger::init(
        config.log_level,
        log_config,
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    Ok(())
}
