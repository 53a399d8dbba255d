use tab_sidebar_api::{
    api::ApiError,
    event::TabEvent,
    tab::{TabId, TabRecord, WindowSnapshot},
};

/// A message processed by the `RegistryService`, in arrival order.
///
/// Usage:
/// - Tx from the `EventFeedService`, which forwards every browser event.
/// - Tx from the `SnapshotService`, with the initial window snapshot.
/// - Tx from the attach fetch tasks spawned by the `RegistryService` itself.
#[derive(Debug)]
pub enum RegistryRecv {
    Snapshot(WindowSnapshot),
    Event(TabEvent),
    /// The fetched record of an attached tab
    AttachResolved {
        tab_id: TabId,
        result: Result<TabRecord, ApiError>,
    },
}
