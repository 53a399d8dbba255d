use super::registry::Registry;
use std::collections::HashSet;
use tab_sidebar_api::tab::{TabId, WindowId};

/// A tab, as rendered by the sidebar
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TabView {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub fav_icon_url: Option<String>,
    pub pinned: bool,
    pub discarded: bool,
    pub active: bool,
    pub selected: bool,
    /// Hidden by the current filter
    pub filtered: bool,
}

/// The derived state the sidebar renders.  Republished after every registry mutation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SidebarView {
    pub window_id: WindowId,
    pub active_id: Option<TabId>,
    pub filter_text: String,
    /// All tabs, in window order
    pub tabs: Vec<TabView>,
    pub select_all: bool,
    pub selected_count: usize,
    pub total_count: usize,
    pub has_pinned_in_selection: bool,
}

impl SidebarView {
    /// Tabs that pass the filter, in window order
    pub fn filtered_tabs(&self) -> impl Iterator<Item = &TabView> + '_ {
        self.tabs.iter().filter(|tab| !tab.filtered)
    }

    pub fn tab_ids(&self) -> Vec<TabId> {
        self.tabs.iter().map(|tab| tab.id).collect()
    }

    pub fn get(&self, id: TabId) -> Option<&TabView> {
        self.tabs.iter().find(|tab| tab.id == id)
    }

    /// Close is disabled when the selection holds a pinned tab
    pub fn can_close(&self) -> bool {
        self.selected_count > 0 && !self.has_pinned_in_selection
    }

    /// Gather is disabled when the selection holds a pinned tab
    pub fn can_gather(&self) -> bool {
        self.selected_count > 0 && !self.has_pinned_in_selection
    }
}

impl Registry {
    pub fn view(&self) -> SidebarView {
        let visible: HashSet<TabId> = self.filtered_ids().into_iter().collect();

        let tabs: Vec<TabView> = self
            .tabs()
            .map(|tab| TabView {
                id: tab.id,
                title: tab.title.clone(),
                url: tab.url.clone(),
                fav_icon_url: tab.fav_icon_url.clone(),
                pinned: tab.pinned,
                discarded: tab.discarded,
                active: self.active_id == Some(tab.id),
                selected: tab.selected,
                filtered: !visible.contains(&tab.id),
            })
            .collect();

        SidebarView {
            window_id: self.window_id,
            active_id: self.active_id,
            filter_text: self.filter_text.clone(),
            select_all: self.select_all(),
            selected_count: tabs.iter().filter(|tab| tab.selected).count(),
            total_count: tabs.len(),
            has_pinned_in_selection: self.has_pinned_in_selection(),
            tabs,
        }
    }
}
