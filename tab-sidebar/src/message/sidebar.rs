use crate::{config::SidebarConfig, state::plan::BatchCommand};
use lifeline::impl_storage_clone;
use tab_sidebar_api::tab::{TabId, WindowId};
use typed_builder::TypedBuilder;

/// A user interaction with the sidebar.
///
/// Usage:
/// - Tx from the `SidebarSession` entry points.
/// - Rx into the `RegistryService`, which applies mutators and plans commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarRecv {
    SetFilterText(String),
    ToggleSelection(TabId, bool),
    ToggleSelectAll(bool),
    Command(BatchCommand),
}

/// Terminates the sidebar session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SidebarShutdown {
    /// The window was closed, and the registry destroyed
    WindowClosed,
    /// The initial snapshot could not be fetched
    SnapshotFailed,
}

/// Describes the window a sidebar is mounted on
#[derive(TypedBuilder, Debug, Clone)]
pub struct SidebarOptions {
    pub window_id: WindowId,
    #[builder(default)]
    pub config: SidebarConfig,
}

impl_storage_clone!(SidebarOptions);
