use super::{
    dispatch::DispatchService, event_feed::EventFeedService, registry::RegistryService,
    snapshot::SnapshotService,
};
use crate::prelude::*;

/// Spawns the services of a mounted sidebar.  Dropping it stops every task.
pub struct SidebarService {
    _registry: RegistryService,
    _event_feed: EventFeedService,
    _snapshot: SnapshotService,
    _dispatch: DispatchService,
}

impl Service for SidebarService {
    type Bus = SidebarBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let _registry = RegistryService::spawn(bus)?;
        // the feed must be subscribed before the snapshot is requested
        let _event_feed = EventFeedService::spawn(bus)?;
        let _snapshot = SnapshotService::spawn(bus)?;
        let _dispatch = DispatchService::spawn(bus)?;

        Ok(Self {
            _registry,
            _event_feed,
            _snapshot,
            _dispatch,
        })
    }
}
