use super::registry::Registry;
use std::fmt;
use tab_sidebar_api::{
    command::{MoveDestination, TabIndex},
    tab::TabId,
};

/// A batch action requested by the user
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchCommand {
    /// Close the selected tabs
    Close,
    /// Move the selected tabs to directly follow the first selected tab
    Gather,
    Reload,
    /// Flip the pinned state of each selected tab
    TogglePin,
    MoveToNewWindow,
    /// Focus a single tab, regardless of selection
    Activate(TabId),
}

impl fmt::Display for BatchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BatchCommand::Close => f.write_str("close"),
            BatchCommand::Gather => f.write_str("gather"),
            BatchCommand::Reload => f.write_str("reload"),
            BatchCommand::TogglePin => f.write_str("toggle pin"),
            BatchCommand::MoveToNewWindow => f.write_str("move to new window"),
            BatchCommand::Activate(id) => write!(f, "activate tab {}", id),
        }
    }
}

/// The external calls that carry out a batch command, computed from the registry at request time
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchPlan {
    /// A single remove call
    Remove(Vec<TabId>),

    /// A single move call.  An empty batch makes no call.
    Move {
        ids: Vec<TabId>,
        destination: MoveDestination,
    },

    /// One reload call per tab
    Reload(Vec<TabId>),

    /// One update call per tab, with the new pinned state
    SetPinned(Vec<(TabId, bool)>),

    /// Creates a window from the seed tab, then moves the rest into it
    NewWindow {
        seed: TabId,
        rest: Vec<TabId>,
        index: TabIndex,
    },

    Activate(TabId),
}

impl Registry {
    /// Selected tabs in window order
    pub fn selected_ids(&self) -> Vec<TabId> {
        self.tabs()
            .filter(|tab| tab.selected)
            .map(|tab| tab.id)
            .collect()
    }

    pub fn has_pinned_in_selection(&self) -> bool {
        self.tabs().any(|tab| tab.selected && tab.pinned)
    }

    /// Plans the command against the current selection.  Returns None if there is nothing to do.
    ///
    /// Pinned tabs in the selection are not rejected here.  The view disables close and gather instead.
    pub fn plan(&self, command: BatchCommand, new_window_index: TabIndex) -> Option<DispatchPlan> {
        if let BatchCommand::Activate(id) = command {
            return self.get(id).map(|tab| DispatchPlan::Activate(tab.id));
        }

        let mut selected = self.selected_ids();
        if selected.is_empty() {
            return None;
        }

        let plan = match command {
            BatchCommand::Close => DispatchPlan::Remove(selected),
            BatchCommand::Gather => {
                let anchor = selected.remove(0);
                let position = self.order.iter().position(|id| *id == anchor)?;

                DispatchPlan::Move {
                    ids: selected,
                    destination: MoveDestination {
                        window_id: self.window_id,
                        index: TabIndex::At(position + 1),
                    },
                }
            }
            BatchCommand::Reload => DispatchPlan::Reload(selected),
            BatchCommand::TogglePin => DispatchPlan::SetPinned(
                self.tabs()
                    .filter(|tab| tab.selected)
                    .map(|tab| (tab.id, !tab.pinned))
                    .collect(),
            ),
            BatchCommand::MoveToNewWindow => {
                let seed = selected.remove(0);
                DispatchPlan::NewWindow {
                    seed,
                    rest: selected,
                    index: new_window_index,
                }
            }
            BatchCommand::Activate(_) => return None,
        };

        Some(plan)
    }
}

#[cfg(test)]
mod tests {
    use super::{BatchCommand, DispatchPlan};
    use crate::state::registry::Registry;
    use pretty_assertions::assert_eq;
    use tab_sidebar_api::{
        command::{MoveDestination, TabIndex},
        tab::{TabId, TabRecord, WindowId, WindowSnapshot},
    };

    const WINDOW: WindowId = WindowId(1);

    fn registry(tabs: &[(u32, bool)]) -> Registry {
        let tabs = tabs
            .iter()
            .enumerate()
            .map(|(index, (id, pinned))| {
                TabRecord::builder()
                    .id(TabId(*id))
                    .window_id(WINDOW)
                    .index(index)
                    .pinned(*pinned)
                    .build()
            })
            .collect();

        Registry::from_snapshot(&WindowSnapshot {
            window_id: WINDOW,
            tabs,
        })
    }

    fn select(registry: &mut Registry, ids: &[u32]) {
        for id in ids {
            registry.toggle_selection(TabId(*id), true).unwrap();
        }
    }

    fn gather_fixture() -> Registry {
        registry(&[
            (1, false),
            (5, false),
            (3, false),
            (7, false),
            (9, false),
            (2, false),
        ])
    }

    #[test]
    fn selected_in_window_order() {
        let mut registry = gather_fixture();
        select(&mut registry, &[9, 5, 7]);

        assert_eq!(
            vec![TabId(5), TabId(7), TabId(9)],
            registry.selected_ids()
        );
    }

    #[test]
    fn gather_follows_anchor() {
        let mut registry = gather_fixture();
        select(&mut registry, &[5, 7, 9]);

        let plan = registry.plan(BatchCommand::Gather, TabIndex::End);

        assert_eq!(
            Some(DispatchPlan::Move {
                ids: vec![TabId(7), TabId(9)],
                destination: MoveDestination {
                    window_id: WINDOW,
                    index: TabIndex::At(2)
                }
            }),
            plan
        );
    }

    #[test]
    fn gather_single_is_empty_batch() {
        let mut registry = gather_fixture();
        select(&mut registry, &[3]);

        let plan = registry.plan(BatchCommand::Gather, TabIndex::End);

        assert!(matches!(plan, Some(DispatchPlan::Move { ids, .. }) if ids.is_empty()));
    }

    #[test]
    fn empty_selection_plans_nothing() {
        let registry = gather_fixture();

        for command in vec![
            BatchCommand::Close,
            BatchCommand::Gather,
            BatchCommand::Reload,
            BatchCommand::TogglePin,
            BatchCommand::MoveToNewWindow,
        ] {
            assert_eq!(None, registry.plan(command, TabIndex::End), "{}", command);
        }
    }

    #[test]
    fn close_selected() {
        let mut registry = gather_fixture();
        select(&mut registry, &[2, 1]);

        assert_eq!(
            Some(DispatchPlan::Remove(vec![TabId(1), TabId(2)])),
            registry.plan(BatchCommand::Close, TabIndex::End)
        );
    }

    #[test]
    fn pin_toggle_is_per_tab() {
        let mut registry = registry(&[(1, false), (2, true)]);
        select(&mut registry, &[1, 2]);

        assert!(registry.has_pinned_in_selection());
        assert_eq!(
            Some(DispatchPlan::SetPinned(vec![
                (TabId(1), true),
                (TabId(2), false)
            ])),
            registry.plan(BatchCommand::TogglePin, TabIndex::End)
        );
    }

    #[test]
    fn new_window_seeded_by_first() {
        let mut registry = gather_fixture();
        select(&mut registry, &[9, 3]);

        assert_eq!(
            Some(DispatchPlan::NewWindow {
                seed: TabId(3),
                rest: vec![TabId(9)],
                index: TabIndex::At(0)
            }),
            registry.plan(BatchCommand::MoveToNewWindow, TabIndex::At(0))
        );
    }

    #[test]
    fn activate_ignores_selection() {
        let registry = gather_fixture();

        assert_eq!(
            Some(DispatchPlan::Activate(TabId(7))),
            registry.plan(BatchCommand::Activate(TabId(7)), TabIndex::End)
        );
        assert_eq!(
            None,
            registry.plan(BatchCommand::Activate(TabId(8)), TabIndex::End)
        );
    }

    #[test]
    fn pinned_selection() {
        let mut registry = registry(&[(1, false), (2, true)]);
        select(&mut registry, &[1]);
        assert!(!registry.has_pinned_in_selection());

        select(&mut registry, &[2]);
        assert!(registry.has_pinned_in_selection());
    }
}
