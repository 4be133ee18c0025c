/// Data structures for Flink
use serde::{Deserialize, Serialize};

/// Tab identifier assigned by the browser, reused after a tab closes
pub type TabId = i32;

/// Information about a browser tab
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TabInfo {
    pub id: TabId,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub window_id: i32,
}

impl TabInfo {
    pub fn new(id: TabId, url: String, title: String, window_id: i32) -> TabInfo {
        TabInfo {
            id,
            url,
            title,
            window_id,
        }
    }
}

/// The `changeInfo` record delivered with `tabs.onUpdated`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabChange {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl TabChange {
    pub fn is_loading(&self) -> bool {
        self.status.as_deref() == Some("loading")
    }

    pub fn is_complete(&self) -> bool {
        self.status.as_deref() == Some("complete")
    }
}

/// A link split into text around the anchor, as produced by the page inspector
///
/// All-empty parts mean the page has no site-specific formatting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormattedLink {
    pub pre_text: String,
    pub url_text: String,
    pub post_text: String,
    pub site_name: String,
}

impl FormattedLink {
    pub fn is_empty(&self) -> bool {
        self.url_text.is_empty()
    }
}

/// A value filled in by an asynchronous fetch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Fetch<T> {
    /// Request still in flight (or never answered)
    #[default]
    NotLoaded,
    /// Answered, nothing available
    Empty,
    Loaded(T),
}

impl<T> Fetch<T> {
    pub fn is_loaded(&self) -> bool {
        !matches!(self, Fetch::NotLoaded)
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Fetch::Loaded(value) => Some(value),
            _ => None,
        }
    }
}

impl Fetch<String> {
    /// Empty strings count as "nothing available"
    pub fn from_text(text: String) -> Self {
        if text.is_empty() {
            Fetch::Empty
        } else {
            Fetch::Loaded(text)
        }
    }
}

impl Fetch<FormattedLink> {
    pub fn from_link(link: Option<FormattedLink>) -> Self {
        match link {
            Some(link) if !link.is_empty() => Fetch::Loaded(link),
            _ => Fetch::Empty,
        }
    }
}

/// Derived display data for one tab
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TabDisplayState {
    pub url_text: String,
    pub title_text: Fetch<String>,
    pub formatted_link: Fetch<FormattedLink>,
    pub selection_text: Fetch<String>,
    pub is_loading: bool,
    /// Whether the action button is currently shown for this tab
    pub is_menu_visible: bool,
    pub(crate) generation: u64,
    pub(crate) selection_generation: u64,
}

impl TabDisplayState {
    /// Both page fetches have answered
    pub fn is_ready(&self) -> bool {
        self.title_text.is_loaded() && self.formatted_link.is_loaded()
    }

    pub fn selection(&self) -> Option<&str> {
        self.selection_text.value().map(String::as_str)
    }
}
