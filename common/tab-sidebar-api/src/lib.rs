//! Shared browser API, exported to `tab-sidebar`
//!
//! Everything the sidebar consumes from the host browser is described in this crate:
//! tab records, the push-event feed, the tab commands, and the async `TabApi` seam.

pub mod api;
pub mod command;
pub mod event;
pub mod memory;
pub mod tab;
