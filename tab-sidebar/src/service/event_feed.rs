use crate::{message::registry::RegistryRecv, prelude::*, resource::TabApiResource};

/// Holds the browser's event-feed subscription, and forwards every event into the registry queue.
/// Dropping the service removes the listener.
pub struct EventFeedService {
    _forward: Lifeline,
}

impl Service for EventFeedService {
    type Bus = SidebarBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let api = bus.resource::<TabApiResource>()?;
        let mut tx = bus.tx::<RegistryRecv>()?;

        // subscribed before the snapshot fetch starts, so no event falls between them
        let mut feed = api.0.subscribe();

        let _forward = Self::try_task("forward", async move {
            while let Some(event) = feed.recv().await {
                trace!("tab event: {:?}", &event);
                tx.send(RegistryRecv::Event(event)).await?;
            }

            debug!("tab event feed closed");
            Ok(())
        });

        Ok(Self { _forward })
    }
}
