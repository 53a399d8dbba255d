use crate::tab::{TabId, WindowId};
use serde::{Deserialize, Serialize};

/// An insertion position within a window
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TabIndex {
    At(usize),
    End,
}

impl Default for TabIndex {
    fn default() -> Self {
        TabIndex::End
    }
}

/// Where moved tabs are placed.  Multiple tabs are placed consecutively, starting at `index`.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveDestination {
    pub window_id: WindowId,
    pub index: TabIndex,
}

/// Properties that can be written to a tab
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

/// Opens a new window, moving the seed tab into it
#[derive(Serialize, Deserialize, Copy, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateWindow {
    pub seed_tab_id: TabId,
}

/// A command issued against the browser, as recorded by `MemoryBrowser`
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum TabCommand {
    Remove(Vec<TabId>),
    Move(Vec<TabId>, MoveDestination),
    Reload(TabId),
    Update(TabId, TabUpdate),
    CreateWindow(CreateWindow),
}
