use super::{
    registry::{Change, ReconcileError, Registry},
    tab::Tab,
};
use std::collections::{HashMap, HashSet};
use tab_sidebar_api::tab::TabId;

/// The subsequence of `order` whose title or url contains `filter_text`, ignoring case.
/// An empty filter returns `order` unchanged.
pub fn compute_filtered_ids(
    order: &[TabId],
    by_id: &HashMap<TabId, Tab>,
    filter_text: &str,
) -> Vec<TabId> {
    if filter_text.is_empty() {
        return order.to_vec();
    }

    let needle = filter_text.to_lowercase();
    order
        .iter()
        .filter(|id| by_id.get(id).map_or(false, |tab| tab.matches(&needle)))
        .copied()
        .collect()
}

impl Registry {
    /// Tabs that pass the current filter, in window order
    pub fn filtered_ids(&self) -> Vec<TabId> {
        compute_filtered_ids(&self.order, &self.by_id, &self.filter_text)
    }

    /// True iff every tab in the filtered set is selected.  False if the filtered set is empty.
    pub fn select_all(&self) -> bool {
        if let Some(select_all) = self.select_all.get() {
            return select_all;
        }

        let filtered = self.filtered_ids();
        let select_all = !filtered.is_empty()
            && filtered
                .iter()
                .all(|id| self.by_id.get(id).map_or(false, |tab| tab.selected));

        self.select_all.set(Some(select_all));
        select_all
    }

    pub fn toggle_selection(&mut self, id: TabId, checked: bool) -> Result<Change, ReconcileError> {
        let tab = self.tab_mut(id).ok_or(ReconcileError::UnknownTab(id))?;

        if tab.selected == checked {
            return Ok(Change::Unchanged);
        }

        tab.selected = checked;
        self.invalidate();
        Ok(Change::Changed)
    }

    /// Selects or deselects the filtered set.  Tabs outside the filter take the opposite state.
    pub fn toggle_select_all(&mut self, checked: bool) -> Change {
        let filtered: HashSet<TabId> = self.filtered_ids().into_iter().collect();

        let mut changed = false;
        for (id, tab) in self.by_id.iter_mut() {
            let selected = if filtered.contains(id) {
                checked
            } else {
                !checked
            };

            changed |= tab.selected != selected;
            tab.selected = selected;
        }

        self.invalidate();

        if changed {
            Change::Changed
        } else {
            Change::Unchanged
        }
    }

    /// Replaces the filter.  If everything visible was selected, the new filtered set is selected.
    /// Otherwise tabs revealed by the new filter are deselected.
    pub fn set_filter_text(&mut self, text: impl Into<String>) -> Change {
        let text = text.into();
        if text == self.filter_text {
            return Change::Unchanged;
        }

        let was_select_all = self.select_all();
        let previous: HashSet<TabId> = self.filtered_ids().into_iter().collect();

        self.filter_text = text;
        self.invalidate();

        if was_select_all {
            self.toggle_select_all(true);
            return Change::Changed;
        }

        for id in self.filtered_ids() {
            if previous.contains(&id) {
                continue;
            }

            if let Some(tab) = self.tab_mut(id) {
                tab.selected = false;
            }
        }

        self.invalidate();
        Change::Changed
    }
}
