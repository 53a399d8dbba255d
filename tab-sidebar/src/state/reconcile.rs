use super::{
    registry::{Change, ReconcileError, Registry},
    tab::Tab,
};
use tab_sidebar_api::{
    event::TabEvent,
    tab::{TabId, TabRecord},
};

/// The outcome of reconciling a browser event against the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reconciliation {
    /// A transition ran
    Applied(Change),

    /// A tab was attached to this window.  The caller must fetch it, and resolve it with `resolve_attached`.
    FetchAttached { tab_id: TabId, index: usize },

    /// The window is closing, and the registry is about to be destroyed
    WindowClosing,
}

/// Maps an event to a registry transition.  Events for other windows are rejected before any handler runs.
pub fn reconcile(registry: &mut Registry, event: &TabEvent) -> Result<Reconciliation, ReconcileError> {
    registry.guard(event.window_id())?;

    let change = match event {
        TabEvent::Activated(info) => registry.apply_activated(info.tab_id)?,
        TabEvent::Created(record) => {
            let change = registry.apply_create(Tab::from(record), record.index)?;
            activate_created(registry, record)?;
            change
        }
        TabEvent::Moved(info) => registry.apply_move(info.tab_id, info.from_index, info.to_index)?,
        TabEvent::Removed(info) if info.is_window_closing => {
            return Ok(Reconciliation::WindowClosing);
        }
        TabEvent::Removed(info) => registry.apply_remove(info.tab_id)?,
        TabEvent::Updated(info) => registry.apply_update(info.tab_id, &info.change_info)?,
        TabEvent::Attached(info) => {
            if registry.contains(info.tab_id) {
                return Err(ReconcileError::DuplicateTab(info.tab_id));
            }

            return Ok(Reconciliation::FetchAttached {
                tab_id: info.tab_id,
                index: info.new_position,
            });
        }
        TabEvent::Detached(info) => registry.apply_detached(info.tab_id)?,
    };

    Ok(Reconciliation::Applied(change))
}

/// Completes an attach, with the record fetched for the tab.
/// The tab is inserted at the fetched index, which reflects any move made during the fetch.
/// A record that has since left this window is rejected.
pub fn resolve_attached(registry: &mut Registry, record: &TabRecord) -> Result<Change, ReconcileError> {
    registry.guard(record.window_id)?;

    let change = registry.apply_attached(record)?;
    activate_created(registry, record)?;

    Ok(change)
}

fn activate_created(registry: &mut Registry, record: &TabRecord) -> Result<(), ReconcileError> {
    if record.active {
        registry.apply_activated(record.id)?;
    }

    Ok(())
}
