use crate::{
    message::{
        registry::RegistryRecv,
        sidebar::{SidebarOptions, SidebarShutdown},
    },
    prelude::*,
    resource::TabApiResource,
};

/// Fetches the window snapshot once, and posts it into the registry queue.
/// If the window cannot be read, the session is shut down.
pub struct SnapshotService {
    _fetch: Lifeline,
}

impl Service for SnapshotService {
    type Bus = SidebarBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let api = bus.resource::<TabApiResource>()?;
        let options = bus.resource::<SidebarOptions>()?;
        let mut tx = bus.tx::<RegistryRecv>()?;
        let mut tx_shutdown = bus.tx::<SidebarShutdown>()?;

        let _fetch = Self::try_task("fetch", async move {
            let window_id = options.window_id;

            match api.0.get_window_snapshot(window_id).await {
                Ok(snapshot) => {
                    debug!(
                        "fetched snapshot of window {} with {} tabs",
                        window_id,
                        snapshot.tabs.len()
                    );
                    tx.send(RegistryRecv::Snapshot(snapshot)).await?;
                }
                Err(err) => {
                    error!("failed to fetch snapshot of window {}: {}", window_id, err);
                    tx_shutdown.send(SidebarShutdown::SnapshotFailed).await?;
                }
            }

            Ok(())
        });

        Ok(Self { _fetch })
    }
}
