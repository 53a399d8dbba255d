use crate::{
    message::dispatch::{ActionOutcome, DispatchError, DispatchRequest},
    prelude::*,
    resource::TabApiResource,
    state::plan::DispatchPlan,
};
use tab_sidebar_api::{
    api::{ApiError, TabApi},
    command::{CreateWindow, MoveDestination, TabUpdate},
};

/// Executes dispatch plans against the browser, one at a time in request order,
/// and broadcasts an `ActionOutcome` for each.
///
/// Failures are reported, not retried.  The browser's follow-up events correct the registry.
pub struct DispatchService {
    _run: Lifeline,
}

impl Service for DispatchService {
    type Bus = SidebarBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let api = bus.resource::<TabApiResource>()?;
        let mut rx = bus.rx::<DispatchRequest>()?;
        let mut tx_outcome = bus.tx::<ActionOutcome>()?;

        let _run = Self::try_task("run", async move {
            while let Some(request) = rx.recv().await {
                let command = request.command;
                debug!("dispatching {}: {:?}", command, &request.plan);

                let outcome = match Self::execute(api.0.as_ref(), request.plan).await {
                    Ok(()) => {
                        info!("{} completed", command);
                        ActionOutcome::Completed(command)
                    }
                    Err(source) => {
                        let error = DispatchError::ExternalCommand {
                            action: command,
                            source,
                        };

                        error!("{}", &error);
                        ActionOutcome::Failed { command, error }
                    }
                };

                outcome.report(&mut tx_outcome);
            }

            Ok(())
        });

        Ok(Self { _run })
    }
}

impl DispatchService {
    async fn execute(api: &dyn TabApi, plan: DispatchPlan) -> Result<(), ApiError> {
        match plan {
            DispatchPlan::Remove(ids) => api.remove_tabs(ids).await,
            DispatchPlan::Move { ids, destination } => {
                if ids.is_empty() {
                    debug!("move batch is empty");
                    return Ok(());
                }

                api.move_tabs(ids, destination).await
            }
            DispatchPlan::Reload(ids) => {
                for id in ids {
                    api.reload_tab(id).await?;
                }

                Ok(())
            }
            DispatchPlan::SetPinned(pins) => {
                for (id, pinned) in pins {
                    let update = TabUpdate {
                        pinned: Some(pinned),
                        ..TabUpdate::default()
                    };

                    api.update_tab(id, update).await?;
                }

                Ok(())
            }
            DispatchPlan::NewWindow { seed, rest, index } => {
                let window_id = api.create_window(CreateWindow { seed_tab_id: seed }).await?;
                debug!("created window {} from tab {}", window_id, seed);

                if rest.is_empty() {
                    return Ok(());
                }

                api.move_tabs(rest, MoveDestination { window_id, index })
                    .await
            }
            DispatchPlan::Activate(id) => {
                let update = TabUpdate {
                    active: Some(true),
                    ..TabUpdate::default()
                };

                api.update_tab(id, update).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::DispatchService;
    use crate::{
        message::dispatch::{ActionOutcome, DispatchError, DispatchRequest},
        prelude::*,
        resource::TabApiResource,
        state::plan::{BatchCommand, DispatchPlan},
    };
    use lifeline::{assert_completes, dyn_bus::DynBus};
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tab_sidebar_api::{
        api::ApiError,
        command::{CreateWindow, MoveDestination, TabCommand, TabIndex, TabUpdate},
        memory::MemoryBrowser,
        tab::{TabId, TabRecord, WindowId},
    };

    fn browser() -> Arc<MemoryBrowser> {
        let tabs = (1..=4)
            .map(|id| TabRecord::builder().id(TabId(id)).window_id(WindowId(1)).build())
            .collect();

        Arc::new(MemoryBrowser::with_window(WindowId(1), tabs))
    }

    fn bus(browser: &Arc<MemoryBrowser>) -> SidebarBus {
        let bus = SidebarBus::default();
        bus.store_resource(TabApiResource(browser.clone()));
        bus
    }

    #[tokio::test]
    async fn reload_each() -> anyhow::Result<()> {
        let browser = browser();
        let bus = bus(&browser);
        let _service = DispatchService::spawn(&bus)?;

        let mut tx = bus.tx::<DispatchRequest>()?;
        let mut rx = bus.rx::<ActionOutcome>()?;

        tx.send(DispatchRequest {
            command: BatchCommand::Reload,
            plan: DispatchPlan::Reload(vec![TabId(2), TabId(4)]),
        })
        .await?;

        assert_completes!(async move {
            assert_eq!(
                Some(ActionOutcome::Completed(BatchCommand::Reload)),
                rx.recv().await
            );
        });

        assert_eq!(
            vec![TabCommand::Reload(TabId(2)), TabCommand::Reload(TabId(4))],
            browser.commands().await
        );

        Ok(())
    }

    #[tokio::test]
    async fn outcomes_dropped_without_subscribers() -> anyhow::Result<()> {
        let browser = browser();
        let bus = bus(&browser);
        let _service = DispatchService::spawn(&bus)?;

        let mut tx = bus.tx::<DispatchRequest>()?;
        drop(bus.rx::<ActionOutcome>()?);

        for _ in 0..40 {
            assert_completes!(tx.send(DispatchRequest {
                command: BatchCommand::Reload,
                plan: DispatchPlan::Reload(vec![TabId(1)]),
            }))?;
        }

        let mut rx = bus.rx::<ActionOutcome>()?;
        tx.send(DispatchRequest {
            command: BatchCommand::Activate(TabId(3)),
            plan: DispatchPlan::Activate(TabId(3)),
        })
        .await?;

        assert_completes!(async move {
            assert_eq!(
                Some(ActionOutcome::Completed(BatchCommand::Activate(TabId(3)))),
                rx.recv().await
            );
        });

        Ok(())
    }

    #[tokio::test]
    async fn new_window_then_move() -> anyhow::Result<()> {
        let browser = browser();
        let bus = bus(&browser);
        let _service = DispatchService::spawn(&bus)?;

        let mut tx = bus.tx::<DispatchRequest>()?;
        let mut rx = bus.rx::<ActionOutcome>()?;

        tx.send(DispatchRequest {
            command: BatchCommand::MoveToNewWindow,
            plan: DispatchPlan::NewWindow {
                seed: TabId(2),
                rest: vec![TabId(3)],
                index: TabIndex::End,
            },
        })
        .await?;

        assert_completes!(async move {
            assert_eq!(
                Some(ActionOutcome::Completed(BatchCommand::MoveToNewWindow)),
                rx.recv().await
            );
        });

        assert_eq!(
            vec![
                TabCommand::CreateWindow(CreateWindow {
                    seed_tab_id: TabId(2)
                }),
                TabCommand::Move(
                    vec![TabId(3)],
                    MoveDestination {
                        window_id: WindowId(2),
                        index: TabIndex::End
                    }
                )
            ],
            browser.commands().await
        );
        assert_eq!(vec![TabId(2), TabId(3)], browser.tab_ids(WindowId(2)).await);

        Ok(())
    }

    #[tokio::test]
    async fn empty_move_makes_no_call() -> anyhow::Result<()> {
        let browser = browser();
        let bus = bus(&browser);
        let _service = DispatchService::spawn(&bus)?;

        let mut tx = bus.tx::<DispatchRequest>()?;
        let mut rx = bus.rx::<ActionOutcome>()?;

        tx.send(DispatchRequest {
            command: BatchCommand::Gather,
            plan: DispatchPlan::Move {
                ids: vec![],
                destination: MoveDestination {
                    window_id: WindowId(1),
                    index: TabIndex::At(1),
                },
            },
        })
        .await?;

        assert_completes!(async move {
            assert_eq!(
                Some(ActionOutcome::Completed(BatchCommand::Gather)),
                rx.recv().await
            );
        });

        assert!(browser.commands().await.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn rejected_is_failed() -> anyhow::Result<()> {
        let browser = browser();
        browser.reject_commands(true).await;

        let bus = bus(&browser);
        let _service = DispatchService::spawn(&bus)?;

        let mut tx = bus.tx::<DispatchRequest>()?;
        let mut rx = bus.rx::<ActionOutcome>()?;

        tx.send(DispatchRequest {
            command: BatchCommand::Activate(TabId(3)),
            plan: DispatchPlan::Activate(TabId(3)),
        })
        .await?;

        let outcome = assert_completes!(async move { rx.recv().await });

        match outcome {
            Some(ActionOutcome::Failed {
                command,
                error: DispatchError::ExternalCommand { action, source },
            }) => {
                assert_eq!(BatchCommand::Activate(TabId(3)), command);
                assert_eq!(command, action);
                assert!(matches!(source, ApiError::Rejected(_)));
            }
            other => panic!("expected failure, got {:?}", other),
        }

        assert!(browser.commands().await.is_empty());
        assert_eq!(
            Some(false),
            browser
                .tabs(WindowId(1))
                .await
                .iter()
                .find(|tab| tab.id == TabId(3))
                .map(|tab| tab.active)
        );

        Ok(())
    }

    #[tokio::test]
    async fn pins_each() -> anyhow::Result<()> {
        let browser = browser();
        let bus = bus(&browser);
        let _service = DispatchService::spawn(&bus)?;

        let mut tx = bus.tx::<DispatchRequest>()?;
        let mut rx = bus.rx::<ActionOutcome>()?;

        tx.send(DispatchRequest {
            command: BatchCommand::TogglePin,
            plan: DispatchPlan::SetPinned(vec![(TabId(1), true), (TabId(2), false)]),
        })
        .await?;

        assert_completes!(async move {
            rx.recv().await;
        });

        let pinned = |pinned| TabUpdate {
            pinned: Some(pinned),
            active: None,
        };
        assert_eq!(
            vec![
                TabCommand::Update(TabId(1), pinned(true)),
                TabCommand::Update(TabId(2), pinned(false))
            ],
            browser.commands().await
        );

        Ok(())
    }
}
