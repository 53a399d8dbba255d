use crate::{
    message::{
        dispatch::ActionOutcome,
        registry::RegistryRecv,
        sidebar::{SidebarOptions, SidebarRecv, SidebarShutdown},
    },
    prelude::*,
    resource::TabApiResource,
    service::sidebar::SidebarService,
    state::{plan::BatchCommand, view::SidebarView},
};
use lifeline::dyn_bus::DynBus;
use postage::{mpsc, watch};
use std::sync::Arc;
use tab_sidebar_api::{api::TabApi, tab::TabId};
use thiserror::Error;

#[derive(Error, Debug)]
#[error("state never resolved to a value")]
pub struct StateUninitalizedError {}

/// A sidebar mounted on one browser window.
///
/// Owns the bus and every service task.  Unmounting (or dropping) the session removes
/// the event-feed listener and cancels any pending fetch.
pub struct SidebarSession {
    options: SidebarOptions,
    bus: SidebarBus,
    tx: mpsc::Sender<SidebarRecv>,
    rx_view: watch::Receiver<Option<SidebarView>>,
    _service: SidebarService,
}

impl SidebarSession {
    /// Mounts a sidebar on `options.window_id`.  Must be called within a tokio runtime.
    pub fn mount(api: Arc<dyn TabApi>, options: SidebarOptions) -> anyhow::Result<Self> {
        info!("mounting the sidebar on window {}", options.window_id);

        let bus = SidebarBus::default();
        bus.capacity::<RegistryRecv>(options.config.event_capacity)?;
        bus.store_resource(TabApiResource(api));
        bus.store_resource(options.clone());

        // the bus holds the first outcome receiver, which would fill and stall the dispatcher.
        // with it gone, every subscriber comes from `outcomes()`.
        drop(bus.rx::<ActionOutcome>()?);

        let _service = SidebarService::spawn(&bus)?;

        let tx = bus.tx::<SidebarRecv>()?;
        let rx_view = bus.rx::<Option<SidebarView>>()?;

        Ok(Self {
            options,
            bus,
            tx,
            rx_view,
            _service,
        })
    }

    pub fn options(&self) -> &SidebarOptions {
        &self.options
    }

    /// The latest published view, or None if the registry is still loading
    pub fn current_view(&self) -> Option<SidebarView> {
        (*self.rx_view.borrow()).clone()
    }

    /// Waits for the registry to load, and returns the latest view
    pub async fn view(&mut self) -> Result<SidebarView, StateUninitalizedError> {
        self.view_where(|_| true).await
    }

    /// Waits for a view that satisfies the condition
    pub async fn view_where<F>(&mut self, mut condition: F) -> Result<SidebarView, StateUninitalizedError>
    where
        F: FnMut(&SidebarView) -> bool,
    {
        loop {
            if let Some(view) = self.current_view() {
                if condition(&view) {
                    return Ok(view);
                }
            }

            if self.rx_view.recv().await.is_none() {
                return Err(StateUninitalizedError {});
            }
        }
    }

    /// Subscribes to the outcomes of batch commands issued after this call.
    ///
    /// A subscriber that falls a full buffer behind misses outcomes, and never slows the sidebar.
    pub fn outcomes(&self) -> anyhow::Result<impl Stream<Item = ActionOutcome>> {
        let rx = self.bus.rx::<ActionOutcome>()?;
        Ok(rx)
    }

    /// Takes the shutdown signal.  Can only be taken once.
    pub fn shutdown(&self) -> anyhow::Result<impl Stream<Item = SidebarShutdown>> {
        let rx = self.bus.rx::<SidebarShutdown>()?;
        Ok(rx)
    }

    pub async fn set_filter_text(&mut self, text: impl Into<String>) -> anyhow::Result<()> {
        self.send(SidebarRecv::SetFilterText(text.into())).await
    }

    pub async fn toggle_selection(&mut self, id: TabId, checked: bool) -> anyhow::Result<()> {
        self.send(SidebarRecv::ToggleSelection(id, checked)).await
    }

    pub async fn toggle_select_all(&mut self, checked: bool) -> anyhow::Result<()> {
        self.send(SidebarRecv::ToggleSelectAll(checked)).await
    }

    pub async fn close_selected(&mut self) -> anyhow::Result<()> {
        self.command(BatchCommand::Close).await
    }

    pub async fn gather_selected(&mut self) -> anyhow::Result<()> {
        self.command(BatchCommand::Gather).await
    }

    pub async fn reload_selected(&mut self) -> anyhow::Result<()> {
        self.command(BatchCommand::Reload).await
    }

    pub async fn pin_selected(&mut self) -> anyhow::Result<()> {
        self.command(BatchCommand::TogglePin).await
    }

    pub async fn move_selected_to_new_window(&mut self) -> anyhow::Result<()> {
        self.command(BatchCommand::MoveToNewWindow).await
    }

    pub async fn activate(&mut self, id: TabId) -> anyhow::Result<()> {
        self.command(BatchCommand::Activate(id)).await
    }

    pub async fn command(&mut self, command: BatchCommand) -> anyhow::Result<()> {
        self.send(SidebarRecv::Command(command)).await
    }

    /// Stops every task, and removes the event-feed listener
    pub fn unmount(self) {
        info!("unmounting the sidebar from window {}", self.options.window_id);
    }

    async fn send(&mut self, msg: SidebarRecv) -> anyhow::Result<()> {
        self.tx.send(msg).await?;
        Ok(())
    }
}
