use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use typed_builder::TypedBuilder;

/// The browser-assigned identifier of a tab.  Stable for the lifetime of the tab.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct TabId(pub u32);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The browser-assigned identifier of a window.
#[derive(Serialize, Deserialize, Copy, Clone, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
#[serde(transparent)]
pub struct WindowId(pub u32);

impl fmt::Display for WindowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A tab, as reported by the browser.
#[derive(TypedBuilder, Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabRecord {
    pub id: TabId,
    pub window_id: WindowId,
    /// The position of the tab within its window
    #[builder(default)]
    #[serde(default)]
    pub index: usize,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub title: String,
    #[builder(default, setter(into))]
    #[serde(default)]
    pub url: String,
    #[builder(default, setter(strip_option))]
    #[serde(default)]
    pub fav_icon_url: Option<String>,
    #[builder(default)]
    #[serde(default)]
    pub pinned: bool,
    #[builder(default)]
    #[serde(default)]
    pub active: bool,
    #[builder(default)]
    #[serde(default)]
    pub discarded: bool,
}

/// The changed properties of a tab, delivered with an update event.
///
/// Absent fields are unchanged.  `fav_icon_url` distinguishes an absent field (`None`)
/// from a cleared favicon (`Some(None)`).
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TabPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(
        default,
        deserialize_with = "deserialize_present",
        skip_serializing_if = "Option::is_none"
    )]
    pub fav_icon_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pinned: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discarded: Option<bool>,
}

impl TabPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.url.is_none()
            && self.fav_icon_url.is_none()
            && self.pinned.is_none()
            && self.discarded.is_none()
    }
}

// a field that is present, even as null, deserializes to Some
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// The tabs of a window, in window order.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WindowSnapshot {
    pub window_id: WindowId,
    pub tabs: Vec<TabRecord>,
}

impl WindowSnapshot {
    /// The tab flagged active in the snapshot, if any
    pub fn active_tab(&self) -> Option<TabId> {
        self.tabs.iter().find(|tab| tab.active).map(|tab| tab.id)
    }
}

#[cfg(test)]
mod tests {
    use super::{TabId, TabPatch, TabRecord, WindowId};
    use pretty_assertions::assert_eq;

    #[test]
    fn record_from_host_json() {
        let json = r#"{
            "id": 4,
            "windowId": 123,
            "index": 3,
            "title": "example.com/baz",
            "url": "http://example.com/baz",
            "favIconUrl": "http://example.com/baz.ico",
            "pinned": true
        }"#;

        let record: TabRecord = serde_json::from_str(json).unwrap();
        let expected = TabRecord::builder()
            .id(TabId(4))
            .window_id(WindowId(123))
            .index(3)
            .title("example.com/baz")
            .url("http://example.com/baz")
            .fav_icon_url("http://example.com/baz.ico".to_string())
            .pinned(true)
            .build();

        assert_eq!(expected, record);
    }

    #[test]
    fn patch_absent_favicon() {
        let patch: TabPatch = serde_json::from_str(r#"{ "title": "foo bar baz" }"#).unwrap();

        assert_eq!(Some("foo bar baz".to_string()), patch.title);
        assert_eq!(None, patch.fav_icon_url);
    }

    #[test]
    fn patch_cleared_favicon() {
        let patch: TabPatch = serde_json::from_str(r#"{ "favIconUrl": null }"#).unwrap();

        assert_eq!(Some(None), patch.fav_icon_url);
        assert!(!patch.is_empty());
    }

    #[test]
    fn patch_empty() {
        let patch: TabPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
