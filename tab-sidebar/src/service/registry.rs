use crate::{
    message::{
        dispatch::{ActionOutcome, DispatchRequest},
        registry::RegistryRecv,
        sidebar::{SidebarOptions, SidebarRecv, SidebarShutdown},
    },
    prelude::*,
    resource::TabApiResource,
    state::{
        reconcile::{reconcile, resolve_attached, Reconciliation},
        registry::{Change, ReconcileError, Registry},
        view::SidebarView,
    },
};
use postage::{broadcast, mpsc, sink::TrySendError, watch};
use std::collections::{HashMap, VecDeque};
use tab_sidebar_api::{
    api::ApiError,
    event::TabEvent,
    tab::{TabId, TabRecord, WindowSnapshot},
};

/// The exclusive owner of the window's `Registry`.
///
/// Processes the registry queue and the user's interactions one message at a time,
/// publishes the `SidebarView` after every change, and plans batch commands.
pub struct RegistryService {
    _run: Lifeline,
}

enum Recv {
    Registry(RegistryRecv),
    Sidebar(SidebarRecv),
}

enum Flow {
    Unchanged,
    Changed,
    Stop,
}

impl From<Change> for Flow {
    fn from(change: Change) -> Self {
        match change {
            Change::Changed => Flow::Changed,
            Change::Corrected(warning) => {
                warn!("{}", warning);
                Flow::Changed
            }
            Change::Unchanged => Flow::Unchanged,
        }
    }
}

impl From<Result<Change, ReconcileError>> for Flow {
    fn from(result: Result<Change, ReconcileError>) -> Self {
        match result {
            Ok(change) => change.into(),
            Err(err) => {
                debug!("ignored: {}", err);
                Flow::Unchanged
            }
        }
    }
}

enum Phase {
    /// Waiting for the window snapshot.  Events are buffered in arrival order.
    Loading(VecDeque<TabEvent>),
    Ready(Registry),
}

struct Reconciler {
    options: SidebarOptions,
    api: TabApiResource,
    phase: Phase,
    /// In-flight attach fetches.  Dropping a lifeline cancels its fetch.
    attaching: HashMap<TabId, Lifeline>,
    tx: mpsc::Sender<RegistryRecv>,
    tx_view: watch::Sender<Option<SidebarView>>,
    tx_dispatch: mpsc::Sender<DispatchRequest>,
    tx_outcome: broadcast::Sender<ActionOutcome>,
    tx_shutdown: mpsc::Sender<SidebarShutdown>,
}

impl Service for RegistryService {
    type Bus = SidebarBus;
    type Lifeline = anyhow::Result<Self>;

    fn spawn(bus: &Self::Bus) -> Self::Lifeline {
        let mut rx = bus.rx::<RegistryRecv>()?;
        let mut rx_sidebar = bus.rx::<SidebarRecv>()?;

        let mut reconciler = Reconciler {
            options: bus.resource::<SidebarOptions>()?,
            api: bus.resource::<TabApiResource>()?,
            phase: Phase::Loading(VecDeque::new()),
            attaching: HashMap::new(),
            tx: bus.tx::<RegistryRecv>()?,
            tx_view: bus.tx::<Option<SidebarView>>()?,
            tx_dispatch: bus.tx::<DispatchRequest>()?,
            tx_outcome: bus.tx::<ActionOutcome>()?,
            tx_shutdown: bus.tx::<SidebarShutdown>()?,
        };

        let _run = Self::try_task("run", async move {
            loop {
                let recv = tokio::select! {
                    Some(msg) = rx.recv() => Recv::Registry(msg),
                    Some(msg) = rx_sidebar.recv() => Recv::Sidebar(msg),
                    else => break,
                };

                let flow = match recv {
                    Recv::Registry(msg) => reconciler.recv_registry(msg).await?,
                    Recv::Sidebar(msg) => reconciler.recv_sidebar(msg).await?,
                };

                match flow {
                    Flow::Changed => reconciler.publish().await?,
                    Flow::Unchanged => {}
                    Flow::Stop => break,
                }
            }

            Ok(())
        });

        Ok(Self { _run })
    }
}

impl Reconciler {
    async fn recv_registry(&mut self, msg: RegistryRecv) -> anyhow::Result<Flow> {
        match msg {
            RegistryRecv::Snapshot(snapshot) => self.initialize(snapshot).await,
            RegistryRecv::Event(event) => self.apply(event).await,
            RegistryRecv::AttachResolved { tab_id, result } => Ok(self.resolve(tab_id, result)),
        }
    }

    async fn initialize(&mut self, snapshot: WindowSnapshot) -> anyhow::Result<Flow> {
        let window_id = self.options.window_id;
        let pending = match self.phase {
            Phase::Loading(ref mut pending) => std::mem::take(pending),
            Phase::Ready(_) => {
                warn!("ignored a second snapshot of window {}", window_id);
                return Ok(Flow::Unchanged);
            }
        };

        let mut registry = Registry::new(window_id);
        registry.initialize(&snapshot.tabs);
        info!(
            "registry of window {} initialized with {} tabs",
            window_id,
            registry.len()
        );

        self.phase = Phase::Ready(registry);

        if !pending.is_empty() {
            debug!("replaying {} buffered events", pending.len());
        }

        for event in pending {
            if let Flow::Stop = self.apply(event).await? {
                return Ok(Flow::Stop);
            }
        }

        Ok(Flow::Changed)
    }

    async fn apply(&mut self, event: TabEvent) -> anyhow::Result<Flow> {
        let registry = match self.phase {
            Phase::Ready(ref mut registry) => registry,
            Phase::Loading(ref mut pending) => {
                pending.push_back(event);
                return Ok(Flow::Unchanged);
            }
        };

        if registry.guard(event.window_id()).is_ok() {
            if let TabEvent::Removed(_) | TabEvent::Detached(_) = event {
                if self.attaching.remove(&event.tab_id()).is_some() {
                    debug!("cancelled the pending attach of tab {}", event.tab_id());
                }
            }
        }

        let reconciliation = match reconcile(registry, &event) {
            Ok(reconciliation) => reconciliation,
            Err(err) => {
                debug!("ignored {:?}: {}", &event, err);
                return Ok(Flow::Unchanged);
            }
        };

        match reconciliation {
            Reconciliation::Applied(change) => Ok(change.into()),
            Reconciliation::FetchAttached { tab_id, index } => {
                self.fetch_attached(tab_id, index);
                Ok(Flow::Unchanged)
            }
            Reconciliation::WindowClosing => {
                info!("window {} is closing", self.options.window_id);
                self.tx_shutdown.send(SidebarShutdown::WindowClosed).await?;
                Ok(Flow::Stop)
            }
        }
    }

    fn fetch_attached(&mut self, tab_id: TabId, index: usize) {
        debug!("fetching tab {}, attached at {}", tab_id, index);

        let api = self.api.clone();
        let mut tx = self.tx.clone();

        let fetch = RegistryService::task("fetch_attached", async move {
            let result = api.0.get_tab(tab_id).await;
            tx.send(RegistryRecv::AttachResolved { tab_id, result })
                .await
                .ok();
        });

        self.attaching.insert(tab_id, fetch);
    }

    fn resolve(&mut self, tab_id: TabId, result: Result<TabRecord, ApiError>) -> Flow {
        if self.attaching.remove(&tab_id).is_none() {
            debug!("dropped the cancelled attach of tab {}", tab_id);
            return Flow::Unchanged;
        }

        let registry = match self.phase {
            Phase::Ready(ref mut registry) => registry,
            Phase::Loading(_) => return Flow::Unchanged,
        };

        match result {
            Ok(record) => resolve_attached(registry, &record).into(),
            Err(ApiError::NotFound(_)) => {
                debug!("tab {} was closed before its attach resolved", tab_id);
                Flow::Unchanged
            }
            Err(err) => {
                warn!("failed to fetch attached tab {}: {}", tab_id, err);
                Flow::Unchanged
            }
        }
    }

    async fn recv_sidebar(&mut self, msg: SidebarRecv) -> anyhow::Result<Flow> {
        let registry = match self.phase {
            Phase::Ready(ref mut registry) => registry,
            Phase::Loading(_) => {
                debug!("registry is loading, dropped {:?}", &msg);

                if let SidebarRecv::Command(command) = msg {
                    ActionOutcome::Skipped(command).report(&mut self.tx_outcome);
                }

                return Ok(Flow::Unchanged);
            }
        };

        let flow = match msg {
            SidebarRecv::SetFilterText(text) => registry.set_filter_text(text).into(),
            SidebarRecv::ToggleSelection(id, checked) => {
                registry.toggle_selection(id, checked).into()
            }
            SidebarRecv::ToggleSelectAll(checked) => registry.toggle_select_all(checked).into(),
            SidebarRecv::Command(command) => {
                match registry.plan(command, self.options.config.new_window_index) {
                    Some(plan) => self.dispatch(DispatchRequest { command, plan }),
                    None => {
                        info!("nothing selected for {}", command);
                        ActionOutcome::Skipped(command).report(&mut self.tx_outcome);
                    }
                }

                Flow::Unchanged
            }
        };

        Ok(flow)
    }

    /// Queues the request for the dispatcher.  Never waits, so browser events are reconciled
    /// while long batches run.
    fn dispatch(&mut self, request: DispatchRequest) {
        let command = request.command;

        if let Err(err) = self.tx_dispatch.try_send(request) {
            match err {
                TrySendError::Pending(_) => warn!("dispatch queue is full, skipped {}", command),
                TrySendError::Rejected(_) => error!("dispatcher has stopped, skipped {}", command),
            }

            ActionOutcome::Skipped(command).report(&mut self.tx_outcome);
        }
    }

    async fn publish(&mut self) -> anyhow::Result<()> {
        let view = match self.phase {
            Phase::Ready(ref registry) => registry.view(),
            Phase::Loading(_) => return Ok(()),
        };

        self.tx_view.send(Some(view)).await?;
        Ok(())
    }
}
