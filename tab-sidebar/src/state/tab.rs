use tab_sidebar_api::tab::{TabId, TabPatch, TabRecord};

/// A tab entry in the registry.  `selected` is sidebar state, everything else mirrors the browser.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub url: String,
    pub fav_icon_url: Option<String>,
    pub pinned: bool,
    pub discarded: bool,
    pub selected: bool,
}

impl Tab {
    /// Merges the fields present in the patch.  Returns true if any field changed.
    pub fn apply_patch(&mut self, patch: &TabPatch) -> bool {
        let mut changed = false;

        if let Some(ref title) = patch.title {
            changed |= replace(&mut self.title, title);
        }

        if let Some(ref url) = patch.url {
            changed |= replace(&mut self.url, url);
        }

        if let Some(ref fav_icon_url) = patch.fav_icon_url {
            changed |= replace(&mut self.fav_icon_url, fav_icon_url);
        }

        if let Some(pinned) = patch.pinned {
            changed |= replace(&mut self.pinned, &pinned);
        }

        if let Some(discarded) = patch.discarded {
            changed |= replace(&mut self.discarded, &discarded);
        }

        changed
    }

    /// Whether the title or url contains the needle.  The needle must already be lowercase.
    pub fn matches(&self, needle: &str) -> bool {
        self.title.to_lowercase().contains(needle) || self.url.to_lowercase().contains(needle)
    }
}

impl From<&TabRecord> for Tab {
    fn from(record: &TabRecord) -> Self {
        Self {
            id: record.id,
            title: record.title.clone(),
            url: record.url.clone(),
            fav_icon_url: record.fav_icon_url.clone(),
            pinned: record.pinned,
            discarded: record.discarded,
            selected: false,
        }
    }
}

fn replace<T: PartialEq + Clone>(field: &mut T, value: &T) -> bool {
    if field == value {
        return false;
    }

    *field = value.clone();
    true
}

#[cfg(test)]
mod tests {
    use super::Tab;
    use tab_sidebar_api::tab::{TabId, TabPatch};

    fn tab() -> Tab {
        Tab {
            id: TabId(1),
            title: "example.com/foo".into(),
            url: "http://example.com/foo".into(),
            fav_icon_url: Some("http://example.com/favicon.ico".into()),
            pinned: false,
            discarded: false,
            selected: true,
        }
    }

    #[test]
    fn patch_merges_present_fields() {
        let mut tab = tab();
        let patch = TabPatch {
            title: Some("foo bar baz".into()),
            url: Some("http://example.com/foobarbaz".into()),
            fav_icon_url: Some(None),
            ..TabPatch::default()
        };

        assert!(tab.apply_patch(&patch));
        assert_eq!("foo bar baz", tab.title);
        assert_eq!("http://example.com/foobarbaz", tab.url);
        assert_eq!(None, tab.fav_icon_url);
        assert!(tab.selected);
    }

    #[test]
    fn patch_absent_fields_unchanged() {
        let mut tab = tab();
        let patch = TabPatch {
            pinned: Some(true),
            ..TabPatch::default()
        };

        assert!(tab.apply_patch(&patch));
        assert!(tab.pinned);
        assert_eq!(Some("http://example.com/favicon.ico".to_string()), tab.fav_icon_url);
    }

    #[test]
    fn patch_same_values_is_unchanged() {
        let mut tab = tab();
        let patch = TabPatch {
            title: Some("example.com/foo".into()),
            pinned: Some(false),
            ..TabPatch::default()
        };

        assert!(!tab.apply_patch(&patch));
    }

    #[test]
    fn matches_title_or_url() {
        let tab = tab();

        assert!(tab.matches("foo"));
        assert!(tab.matches("http://"));
        assert!(!tab.matches("bar"));
    }
}
