//! An in-memory browser, which implements `TabApi` without a host.
//!
//! Commands mutate the in-memory windows and emit the same events a browser would.
//! Every command is recorded, and commands can be rejected on demand.
use crate::{
    api::{ApiError, EventFeed, TabApi},
    command::{CreateWindow, MoveDestination, TabCommand, TabIndex, TabUpdate},
    event::{ActiveInfo, AttachInfo, DetachInfo, MoveInfo, RemoveInfo, TabEvent, UpdateInfo},
    tab::{TabId, TabPatch, TabRecord, WindowId, WindowSnapshot},
};
use async_trait::async_trait;
use log::debug;
use postage::{broadcast, sink::Sink};
use std::collections::BTreeMap;
use tokio::sync::Mutex;

const FEED_CAPACITY: usize = 256;

pub struct MemoryBrowser {
    state: Mutex<BrowserState>,
    tx_events: broadcast::Sender<TabEvent>,
}

#[derive(Default)]
struct BrowserState {
    windows: BTreeMap<WindowId, Vec<TabRecord>>,
    commands: Vec<TabCommand>,
    reject: bool,
}

impl MemoryBrowser {
    pub fn new() -> Self {
        Self::from_state(BrowserState::default())
    }

    /// Creates a browser with a single window, containing the given tabs in order
    pub fn with_window(window_id: WindowId, mut tabs: Vec<TabRecord>) -> Self {
        for tab in tabs.iter_mut() {
            tab.window_id = window_id;
        }
        reindex(&mut tabs);

        let mut state = BrowserState::default();
        state.windows.insert(window_id, tabs);
        Self::from_state(state)
    }

    fn from_state(state: BrowserState) -> Self {
        let (tx_events, _rx) = broadcast::channel(FEED_CAPACITY);

        Self {
            state: Mutex::new(state),
            tx_events,
        }
    }

    /// Opens a tab at `record.index` in `record.window_id`, as if the user had opened it
    pub async fn open_tab(&self, record: TabRecord) -> TabRecord {
        let created = {
            let mut state = self.state.lock().await;
            let tabs = state.windows.entry(record.window_id).or_default();

            let index = record.index.min(tabs.len());
            if record.active {
                for tab in tabs.iter_mut() {
                    tab.active = false;
                }
            }

            tabs.insert(index, record);
            reindex(tabs);
            tabs[index].clone()
        };

        self.emit(TabEvent::Created(created.clone())).await;
        created
    }

    /// Changes tab properties, as if the page had changed them
    pub async fn change_tab(&self, id: TabId, patch: TabPatch) -> Result<(), ApiError> {
        let tab = {
            let mut state = self.state.lock().await;
            let tab = state.find_mut(id).ok_or(ApiError::NotFound(id))?;

            if let Some(ref title) = patch.title {
                tab.title = title.clone();
            }
            if let Some(ref url) = patch.url {
                tab.url = url.clone();
            }
            if let Some(ref fav_icon_url) = patch.fav_icon_url {
                tab.fav_icon_url = fav_icon_url.clone();
            }
            if let Some(pinned) = patch.pinned {
                tab.pinned = pinned;
            }
            if let Some(discarded) = patch.discarded {
                tab.discarded = discarded;
            }

            tab.clone()
        };

        self.emit(TabEvent::Updated(UpdateInfo {
            tab_id: id,
            change_info: patch,
            tab,
        }))
        .await;

        Ok(())
    }

    /// Closes a window, removing every tab with `is_window_closing` set
    pub async fn close_window(&self, window_id: WindowId) -> Result<(), ApiError> {
        let tabs = {
            let mut state = self.state.lock().await;
            state
                .windows
                .remove(&window_id)
                .ok_or(ApiError::WindowNotFound(window_id))?
        };

        for tab in tabs {
            self.emit(TabEvent::Removed(RemoveInfo {
                tab_id: tab.id,
                window_id,
                is_window_closing: true,
            }))
            .await;
        }

        Ok(())
    }

    /// Emits a raw event on the feed, without changing any state
    pub async fn emit(&self, event: TabEvent) {
        debug!("memory browser event: {:?}", &event);

        let mut tx = self.tx_events.clone();
        tx.send(event).await.ok();
    }

    /// When set, every subsequent command is rejected without effect
    pub async fn reject_commands(&self, reject: bool) {
        self.state.lock().await.reject = reject;
    }

    /// The commands received so far, in order
    pub async fn commands(&self) -> Vec<TabCommand> {
        self.state.lock().await.commands.clone()
    }

    /// The tabs of the window, in window order
    pub async fn tabs(&self, window_id: WindowId) -> Vec<TabRecord> {
        let state = self.state.lock().await;
        state.windows.get(&window_id).cloned().unwrap_or_default()
    }

    pub async fn tab_ids(&self, window_id: WindowId) -> Vec<TabId> {
        self.tabs(window_id)
            .await
            .into_iter()
            .map(|tab| tab.id)
            .collect()
    }

    async fn emit_all(&self, events: Vec<TabEvent>) {
        for event in events {
            self.emit(event).await;
        }
    }
}

impl Default for MemoryBrowser {
    fn default() -> Self {
        Self::new()
    }
}

impl BrowserState {
    fn record(&mut self, command: TabCommand) -> Result<(), ApiError> {
        if self.reject {
            return Err(ApiError::Rejected(format!("{:?}", command)));
        }

        self.commands.push(command);
        Ok(())
    }

    fn locate(&self, id: TabId) -> Option<(WindowId, usize)> {
        self.windows.iter().find_map(|(window_id, tabs)| {
            tabs.iter()
                .position(|tab| tab.id == id)
                .map(|index| (*window_id, index))
        })
    }

    fn find_mut(&mut self, id: TabId) -> Option<&mut TabRecord> {
        self.windows
            .values_mut()
            .flat_map(|tabs| tabs.iter_mut())
            .find(|tab| tab.id == id)
    }

    fn require(&self, ids: &[TabId]) -> Result<(), ApiError> {
        for id in ids {
            if self.locate(*id).is_none() {
                return Err(ApiError::NotFound(*id));
            }
        }

        Ok(())
    }

    fn take(&mut self, window_id: WindowId, index: usize) -> Option<TabRecord> {
        let tabs = self.windows.get_mut(&window_id)?;
        let tab = tabs.remove(index);
        reindex(tabs);
        Some(tab)
    }

    /// Moves a single tab, returning the events a browser would emit
    fn relocate(&mut self, id: TabId, window_id: WindowId, target: TabIndex) -> Vec<TabEvent> {
        let (from_window, from_index) = match self.locate(id) {
            Some(location) => location,
            None => return vec![],
        };

        let mut tab = match self.take(from_window, from_index) {
            Some(tab) => tab,
            None => return vec![],
        };

        let tabs = self.windows.entry(window_id).or_default();
        let to_index = match target {
            TabIndex::At(index) => index.min(tabs.len()),
            TabIndex::End => tabs.len(),
        };

        let moving_window = from_window != window_id;
        if moving_window {
            tab.active = false;
        }

        tab.window_id = window_id;
        tabs.insert(to_index, tab);
        reindex(tabs);

        if moving_window {
            vec![
                TabEvent::Detached(DetachInfo {
                    tab_id: id,
                    old_window_id: from_window,
                    old_position: from_index,
                }),
                TabEvent::Attached(AttachInfo {
                    tab_id: id,
                    new_window_id: window_id,
                    new_position: to_index,
                }),
            ]
        } else if from_index != to_index {
            vec![TabEvent::Moved(MoveInfo {
                tab_id: id,
                window_id,
                from_index,
                to_index,
            })]
        } else {
            vec![]
        }
    }

    fn next_window_id(&self) -> WindowId {
        let max = self.windows.keys().map(|id| id.0).max().unwrap_or(0);
        WindowId(max + 1)
    }
}

fn reindex(tabs: &mut Vec<TabRecord>) {
    for (index, tab) in tabs.iter_mut().enumerate() {
        tab.index = index;
    }
}

#[async_trait]
impl TabApi for MemoryBrowser {
    fn subscribe(&self) -> EventFeed {
        self.tx_events.subscribe()
    }

    async fn get_window_snapshot(&self, window_id: WindowId) -> Result<WindowSnapshot, ApiError> {
        let state = self.state.lock().await;
        let tabs = state
            .windows
            .get(&window_id)
            .ok_or(ApiError::WindowNotFound(window_id))?;

        Ok(WindowSnapshot {
            window_id,
            tabs: tabs.clone(),
        })
    }

    async fn get_tab(&self, id: TabId) -> Result<TabRecord, ApiError> {
        let state = self.state.lock().await;
        let (window_id, index) = state.locate(id).ok_or(ApiError::NotFound(id))?;
        Ok(state.windows[&window_id][index].clone())
    }

    async fn remove_tabs(&self, ids: Vec<TabId>) -> Result<(), ApiError> {
        let events = {
            let mut state = self.state.lock().await;
            state.require(ids.as_slice())?;
            state.record(TabCommand::Remove(ids.clone()))?;

            let mut events = Vec::with_capacity(ids.len());
            for id in ids {
                if let Some((window_id, index)) = state.locate(id) {
                    state.take(window_id, index);
                    events.push(TabEvent::Removed(RemoveInfo {
                        tab_id: id,
                        window_id,
                        is_window_closing: false,
                    }));
                }
            }

            events
        };

        self.emit_all(events).await;
        Ok(())
    }

    async fn move_tabs(
        &self,
        ids: Vec<TabId>,
        destination: MoveDestination,
    ) -> Result<(), ApiError> {
        let events = {
            let mut state = self.state.lock().await;
            if !state.windows.contains_key(&destination.window_id) {
                return Err(ApiError::WindowNotFound(destination.window_id));
            }

            state.require(ids.as_slice())?;
            state.record(TabCommand::Move(ids.clone(), destination))?;

            let mut events = Vec::new();
            for (offset, id) in ids.into_iter().enumerate() {
                let target = match destination.index {
                    TabIndex::At(index) => TabIndex::At(index + offset),
                    TabIndex::End => TabIndex::End,
                };

                events.extend(state.relocate(id, destination.window_id, target));
            }

            events
        };

        self.emit_all(events).await;
        Ok(())
    }

    async fn reload_tab(&self, id: TabId) -> Result<(), ApiError> {
        let mut state = self.state.lock().await;
        state.require(&[id])?;
        state.record(TabCommand::Reload(id))
    }

    async fn update_tab(&self, id: TabId, update: TabUpdate) -> Result<(), ApiError> {
        let events = {
            let mut state = self.state.lock().await;
            state.require(&[id])?;
            state.record(TabCommand::Update(id, update))?;

            let mut events = Vec::new();
            let (window_id, index) = state.locate(id).ok_or(ApiError::NotFound(id))?;
            let tabs = state
                .windows
                .get_mut(&window_id)
                .ok_or(ApiError::WindowNotFound(window_id))?;

            if let Some(pinned) = update.pinned {
                if tabs[index].pinned != pinned {
                    tabs[index].pinned = pinned;
                    events.push(TabEvent::Updated(UpdateInfo {
                        tab_id: id,
                        change_info: TabPatch {
                            pinned: Some(pinned),
                            ..TabPatch::default()
                        },
                        tab: tabs[index].clone(),
                    }));
                }
            }

            if update.active == Some(true) && !tabs[index].active {
                for tab in tabs.iter_mut() {
                    tab.active = tab.id == id;
                }

                events.push(TabEvent::Activated(ActiveInfo {
                    tab_id: id,
                    window_id,
                }));
            }

            events
        };

        self.emit_all(events).await;
        Ok(())
    }

    async fn create_window(&self, create: CreateWindow) -> Result<WindowId, ApiError> {
        let (window_id, events) = {
            let mut state = self.state.lock().await;
            state.require(&[create.seed_tab_id])?;
            state.record(TabCommand::CreateWindow(create))?;

            let window_id = state.next_window_id();
            state.windows.insert(window_id, Vec::new());
            let events = state.relocate(create.seed_tab_id, window_id, TabIndex::End);

            (window_id, events)
        };

        self.emit_all(events).await;
        Ok(window_id)
    }
}
