pub mod dispatch;
pub mod event_feed;
pub mod registry;
pub mod sidebar;
pub mod snapshot;
