use crate::tab::{TabId, TabPatch, TabRecord, WindowId};
use serde::{Deserialize, Serialize};

/// A push event from the browser's tab feed.
///
/// The feed is not scoped to a window.  Consumers must check `window_id()` themselves.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum TabEvent {
    /// The focused tab of a window changed
    Activated(ActiveInfo),

    /// A tab was opened.  The record carries the insertion index.
    Created(TabRecord),

    /// A tab changed position within its window
    Moved(MoveInfo),

    /// A tab was closed
    Removed(RemoveInfo),

    /// Properties of a tab changed
    Updated(UpdateInfo),

    /// A tab was moved into a window.  Carries no tab payload.
    Attached(AttachInfo),

    /// A tab was moved out of a window
    Detached(DetachInfo),
}

impl TabEvent {
    /// The window this event belongs to
    pub fn window_id(&self) -> WindowId {
        match self {
            TabEvent::Activated(info) => info.window_id,
            TabEvent::Created(tab) => tab.window_id,
            TabEvent::Moved(info) => info.window_id,
            TabEvent::Removed(info) => info.window_id,
            TabEvent::Updated(info) => info.tab.window_id,
            TabEvent::Attached(info) => info.new_window_id,
            TabEvent::Detached(info) => info.old_window_id,
        }
    }

    /// The tab this event refers to
    pub fn tab_id(&self) -> TabId {
        match self {
            TabEvent::Activated(info) => info.tab_id,
            TabEvent::Created(tab) => tab.id,
            TabEvent::Moved(info) => info.tab_id,
            TabEvent::Removed(info) => info.tab_id,
            TabEvent::Updated(info) => info.tab_id,
            TabEvent::Attached(info) => info.tab_id,
            TabEvent::Detached(info) => info.tab_id,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ActiveInfo {
    pub tab_id: TabId,
    pub window_id: WindowId,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MoveInfo {
    pub tab_id: TabId,
    pub window_id: WindowId,
    pub from_index: usize,
    pub to_index: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RemoveInfo {
    pub tab_id: TabId,
    pub window_id: WindowId,
    #[serde(default)]
    pub is_window_closing: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInfo {
    pub tab_id: TabId,
    pub change_info: TabPatch,
    /// The full state of the tab after the change
    pub tab: TabRecord,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AttachInfo {
    pub tab_id: TabId,
    pub new_window_id: WindowId,
    pub new_position: usize,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DetachInfo {
    pub tab_id: TabId,
    pub old_window_id: WindowId,
    pub old_position: usize,
}
