use crate::{
    command::{CreateWindow, MoveDestination, TabUpdate},
    event::TabEvent,
    tab::{TabId, TabRecord, WindowId, WindowSnapshot},
};
use async_trait::async_trait;
use thiserror::Error;

/// A failure reported by the browser for a tab command or query
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("tab {0} does not exist")]
    NotFound(TabId),
    #[error("window {0} does not exist")]
    WindowNotFound(WindowId),
    #[error("command rejected: {0}")]
    Rejected(String),
}

/// A live subscription to the browser's tab events.  Dropping it removes the listener.
pub type EventFeed = postage::broadcast::Receiver<TabEvent>;

/// The host browser's tab-management service.
///
/// Commands resolve when the browser has accepted them.  The resulting state changes
/// are delivered separately, on the event feed.
#[async_trait]
pub trait TabApi: Send + Sync {
    /// Registers a listener on the tab event feed
    fn subscribe(&self) -> EventFeed;

    async fn get_window_snapshot(&self, window_id: WindowId) -> Result<WindowSnapshot, ApiError>;

    async fn get_tab(&self, id: TabId) -> Result<TabRecord, ApiError>;

    async fn remove_tabs(&self, ids: Vec<TabId>) -> Result<(), ApiError>;

    async fn move_tabs(&self, ids: Vec<TabId>, destination: MoveDestination)
        -> Result<(), ApiError>;

    async fn reload_tab(&self, id: TabId) -> Result<(), ApiError>;

    async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<(), ApiError>;

    /// Opens a window containing the seed tab, and returns the new window's id
    async fn create_window(&self, create: CreateWindow) -> Result<WindowId, ApiError>;
}
