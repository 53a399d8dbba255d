use super::tab::Tab;
use std::{cell::Cell, collections::HashMap};
use tab_sidebar_api::tab::{TabId, TabPatch, TabRecord, WindowId, WindowSnapshot};
use thiserror::Error;

/// A reason an event was ignored by the registry.  The registry is unchanged.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    #[error("event for window {actual} ignored by the registry of window {expected}")]
    WindowMismatch {
        expected: WindowId,
        actual: WindowId,
    },
    #[error("tab {0} is not in the registry")]
    UnknownTab(TabId),
    #[error("tab {0} is already in the registry")]
    DuplicateTab(TabId),
}

/// An event disagreed with the registry.  The transition was applied after a correction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsistencyWarning {
    #[error("index {index} for tab {id} is out of range of {len} tabs, clamped")]
    IndexOutOfRange { id: TabId, index: usize, len: usize },
    #[error("tab {id} was expected at index {expected}, but found at {actual}")]
    MisplacedTab {
        id: TabId,
        expected: usize,
        actual: usize,
    },
}

/// The effect of a transition on the registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    Changed,
    Corrected(ConsistencyWarning),
    Unchanged,
}

impl Change {
    pub fn is_changed(&self) -> bool {
        !matches!(self, Change::Unchanged)
    }

    fn or_warning(changed: bool, warning: Option<ConsistencyWarning>) -> Self {
        match warning {
            Some(warning) => Change::Corrected(warning),
            None if changed => Change::Changed,
            None => Change::Unchanged,
        }
    }
}

/// The ordered, keyed tab registry of a single window.
///
/// `order` is the only authority for positions.  `by_id` holds exactly the ids in `order`.
#[derive(Debug, Clone)]
pub struct Registry {
    pub(crate) window_id: WindowId,
    pub(crate) order: Vec<TabId>,
    pub(crate) by_id: HashMap<TabId, Tab>,
    pub(crate) active_id: Option<TabId>,
    pub(crate) filter_text: String,
    pub(crate) select_all: Cell<Option<bool>>,
}

impl Registry {
    pub fn new(window_id: WindowId) -> Self {
        Self {
            window_id,
            order: Vec::new(),
            by_id: HashMap::new(),
            active_id: None,
            filter_text: String::new(),
            select_all: Cell::new(None),
        }
    }

    pub fn from_snapshot(snapshot: &WindowSnapshot) -> Self {
        let mut registry = Self::new(snapshot.window_id);
        registry.initialize(&snapshot.tabs);
        registry
    }

    /// Replaces the contents of the registry with the snapshot tabs, in snapshot order.
    /// Duplicate ids are skipped, and the first record wins.
    pub fn initialize(&mut self, tabs: &[TabRecord]) {
        self.order.clear();
        self.by_id.clear();
        self.active_id = None;

        for record in tabs {
            if self.by_id.contains_key(&record.id) {
                continue;
            }

            self.order.push(record.id);
            self.by_id.insert(record.id, Tab::from(record));

            if record.active && self.active_id.is_none() {
                self.active_id = Some(record.id);
            }
        }

        self.invalidate();
    }

    pub fn window_id(&self) -> WindowId {
        self.window_id
    }

    pub fn order(&self) -> &[TabId] {
        self.order.as_slice()
    }

    pub fn get(&self, id: TabId) -> Option<&Tab> {
        self.by_id.get(&id)
    }

    pub fn contains(&self, id: TabId) -> bool {
        self.by_id.contains_key(&id)
    }

    pub fn active_id(&self) -> Option<TabId> {
        self.active_id
    }

    pub fn filter_text(&self) -> &str {
        self.filter_text.as_str()
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Tabs in window order
    pub fn tabs(&self) -> impl Iterator<Item = &Tab> + '_ {
        self.order.iter().filter_map(move |id| self.by_id.get(id))
    }

    /// Whether `order` and `by_id` hold exactly the same ids
    pub fn is_consistent(&self) -> bool {
        self.order.len() == self.by_id.len()
            && self.order.iter().all(|id| self.by_id.contains_key(id))
            && self.active_id.map_or(true, |id| self.by_id.contains_key(&id))
    }

    /// Rejects events that belong to another window
    pub fn guard(&self, window_id: WindowId) -> Result<(), ReconcileError> {
        if window_id != self.window_id {
            return Err(ReconcileError::WindowMismatch {
                expected: self.window_id,
                actual: window_id,
            });
        }

        Ok(())
    }

    pub fn apply_create(&mut self, tab: Tab, index: usize) -> Result<Change, ReconcileError> {
        if self.by_id.contains_key(&tab.id) {
            return Err(ReconcileError::DuplicateTab(tab.id));
        }

        let id = tab.id;
        let (at, warning) = self.clamp(id, index, self.order.len());

        self.order.insert(at, id);
        self.by_id.insert(id, tab);
        self.invalidate();

        Ok(Change::or_warning(true, warning))
    }

    pub fn apply_remove(&mut self, id: TabId) -> Result<Change, ReconcileError> {
        if self.by_id.remove(&id).is_none() {
            return Err(ReconcileError::UnknownTab(id));
        }

        self.order.retain(|entry| *entry != id);

        if self.active_id == Some(id) {
            self.active_id = None;
        }

        self.invalidate();
        Ok(Change::Changed)
    }

    /// Moves a tab within the window.  The indices are trusted when `order[from_index]` holds the tab.
    pub fn apply_move(
        &mut self,
        id: TabId,
        from_index: usize,
        to_index: usize,
    ) -> Result<Change, ReconcileError> {
        let actual = self
            .position(id)
            .ok_or(ReconcileError::UnknownTab(id))?;

        let mut warning = None;
        if actual != from_index {
            warning = Some(ConsistencyWarning::MisplacedTab {
                id,
                expected: from_index,
                actual,
            });
        }

        self.order.remove(actual);

        let (to, clamped) = self.clamp(id, to_index, self.order.len());
        self.order.insert(to, id);

        Ok(Change::or_warning(actual != to, warning.or(clamped)))
    }

    pub fn apply_update(&mut self, id: TabId, patch: &TabPatch) -> Result<Change, ReconcileError> {
        let tab = self
            .by_id
            .get_mut(&id)
            .ok_or(ReconcileError::UnknownTab(id))?;

        if !tab.apply_patch(patch) {
            return Ok(Change::Unchanged);
        }

        // the title or url may have moved the tab in or out of the filter
        self.invalidate();
        Ok(Change::Changed)
    }

    pub fn apply_activated(&mut self, id: TabId) -> Result<Change, ReconcileError> {
        if !self.by_id.contains_key(&id) {
            return Err(ReconcileError::UnknownTab(id));
        }

        if self.active_id == Some(id) {
            return Ok(Change::Unchanged);
        }

        self.active_id = Some(id);
        Ok(Change::Changed)
    }

    /// Inserts a tab that was moved into this window, using its freshly fetched record
    pub fn apply_attached(&mut self, record: &TabRecord) -> Result<Change, ReconcileError> {
        self.apply_create(Tab::from(record), record.index)
    }

    pub fn apply_detached(&mut self, id: TabId) -> Result<Change, ReconcileError> {
        self.apply_remove(id)
    }

    pub(crate) fn tab_mut(&mut self, id: TabId) -> Option<&mut Tab> {
        self.by_id.get_mut(&id)
    }

    /// Drops the memoized select-all flag
    pub(crate) fn invalidate(&self) {
        self.select_all.set(None);
    }

    fn position(&self, id: TabId) -> Option<usize> {
        self.order.iter().position(|entry| *entry == id)
    }

    fn clamp(&self, id: TabId, index: usize, len: usize) -> (usize, Option<ConsistencyWarning>) {
        if index > len {
            let warning = ConsistencyWarning::IndexOutOfRange { id, index, len };
            return (len, Some(warning));
        }

        (index, None)
    }
}
