/// Link options offered for a tab and their clipboard payloads
use serde::{Deserialize, Serialize};

use crate::protocol::MenuEntry;
use crate::tab_data::{FormattedLink, TabDisplayState, TabInfo};
use crate::text::escape_html;

/// Stable identifier of a link option, also used as the context menu item id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OptionId {
    CopyLink,
    CopyTitle,
    CopySelectionLink,
    CopyFormattedLink,
}

impl OptionId {
    pub fn as_str(self) -> &'static str {
        match self {
            OptionId::CopyLink => "copyLink",
            OptionId::CopyTitle => "copyTitle",
            OptionId::CopySelectionLink => "copySelectionLink",
            OptionId::CopyFormattedLink => "copyFormattedLink",
        }
    }

    pub fn parse(id: &str) -> Option<OptionId> {
        match id {
            "copyLink" => Some(OptionId::CopyLink),
            "copyTitle" => Some(OptionId::CopyTitle),
            "copySelectionLink" => Some(OptionId::CopySelectionLink),
            "copyFormattedLink" => Some(OptionId::CopyFormattedLink),
            _ => None,
        }
    }
}

/// Parallel plain-text and HTML representations of a link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClipboardPayload {
    pub plain: String,
    pub html: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuOption {
    pub id: OptionId,
    pub label: String,
    pub preview: String,
    pub payload: ClipboardPayload,
}

impl MenuOption {
    /// Label followed by the preview text
    pub fn title(&self) -> String {
        format!("{}{}", self.label, self.preview)
    }

    pub fn entry(&self) -> MenuEntry {
        MenuEntry {
            id: self.id,
            title: self.title(),
        }
    }
}

/// Build the ordered option list for a tab
///
/// Order: URL (always), title link (once the title fetch answered), selection
/// link (non-empty selection), formatted link (site-specific text available).
pub fn build_menu_options(tab: &TabInfo, state: &TabDisplayState) -> Vec<MenuOption> {
    let mut options = Vec::with_capacity(4);

    let url_preview = if state.url_text.is_empty() {
        tab.url.clone()
    } else {
        state.url_text.clone()
    };
    options.push(MenuOption {
        id: OptionId::CopyLink,
        label: "Copy URL: ".to_string(),
        preview: url_preview,
        payload: ClipboardPayload {
            plain: tab.url.clone(),
            html: anchor(&tab.url, &tab.url),
        },
    });

    if state.title_text.is_loaded() {
        let title = state.title_text.value().cloned().unwrap_or_default();
        options.push(quoted_option(
            OptionId::CopyTitle,
            "Copy Title Link: ",
            &title,
            &tab.url,
        ));
    }

    if let Some(selection) = state.selection() {
        options.push(quoted_option(
            OptionId::CopySelectionLink,
            "Copy Selection Link: ",
            selection,
            &tab.url,
        ));
    }

    if let Some(link) = state.formatted_link.value() {
        if !link.url_text.is_empty() && !link.site_name.is_empty() {
            options.push(formatted_option(link, &tab.url));
        }
    }

    options
}

/// `"text" (url)` as plain text, anchor labelled `text` as HTML
fn quoted_option(id: OptionId, label: &str, text: &str, url: &str) -> MenuOption {
    MenuOption {
        id,
        label: label.to_string(),
        preview: text.to_string(),
        payload: ClipboardPayload {
            plain: format!("\"{}\" ({})", text, url),
            html: anchor(url, text),
        },
    }
}

fn formatted_option(link: &FormattedLink, url: &str) -> MenuOption {
    let plain = match link.site_name.as_str() {
        "Google Docs" => format!("\"{}\" ({})", link.url_text, url),
        "Wikipedia" => url.to_string(),
        _ => format!("{}{}", url, link.post_text),
    };

    MenuOption {
        id: OptionId::CopyFormattedLink,
        label: format!("Copy {} Flink: ", link.site_name),
        preview: format!("{}[{}]{}", link.pre_text, link.url_text, link.post_text),
        payload: ClipboardPayload {
            plain,
            html: format!(
                "{}{}{}",
                escape_html(&link.pre_text),
                anchor(url, &link.url_text),
                escape_html(&link.post_text)
            ),
        },
    }
}

fn anchor(url: &str, text: &str) -> String {
    format!("<a href='{}'>{}</a>", escape_html(url), escape_html(text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::Fetch;

    fn create_test_tab(url: &str, title: &str) -> TabInfo {
        TabInfo::new(1, url.to_string(), title.to_string(), 1)
    }

    fn loaded_state(url: &str, title: &str) -> TabDisplayState {
        TabDisplayState {
            url_text: url.to_string(),
            title_text: Fetch::Loaded(title.to_string()),
            formatted_link: Fetch::Empty,
            ..TabDisplayState::default()
        }
    }

    fn ids(options: &[MenuOption]) -> Vec<OptionId> {
        options.iter().map(|o| o.id).collect()
    }

    #[test]
    fn test_option_id_round_trip() {
        for id in [
            OptionId::CopyLink,
            OptionId::CopyTitle,
            OptionId::CopySelectionLink,
            OptionId::CopyFormattedLink,
        ] {
            assert_eq!(OptionId::parse(id.as_str()), Some(id));
        }
        assert_eq!(OptionId::parse("copyEverything"), None);
    }

    #[test]
    fn test_url_option_always_present() {
        let tab = create_test_tab("https://example.com/", "Example");
        let options = build_menu_options(&tab, &TabDisplayState::default());

        assert_eq!(ids(&options), vec![OptionId::CopyLink]);
        assert_eq!(options[0].title(), "Copy URL: https://example.com/");
        assert_eq!(options[0].payload.plain, "https://example.com/");
        assert_eq!(
            options[0].payload.html,
            "<a href='https://example.com/'>https://example.com/</a>"
        );
    }

    #[test]
    fn test_url_preview_uses_truncated_text() {
        let long_url = format!("https://example.com/{}", "p".repeat(80));
        let tab = create_test_tab(&long_url, "Example");
        let state = TabDisplayState {
            url_text: crate::text::truncate(&long_url),
            ..TabDisplayState::default()
        };

        let options = build_menu_options(&tab, &state);

        assert_eq!(options[0].preview.chars().count(), 64);
        assert_eq!(options[0].payload.plain, long_url);
    }

    #[test]
    fn test_title_option() {
        let tab = create_test_tab("https://example.com/", "Example");
        let options = build_menu_options(&tab, &loaded_state("https://example.com/", "Example Domain"));

        assert_eq!(ids(&options), vec![OptionId::CopyLink, OptionId::CopyTitle]);
        assert_eq!(options[1].title(), "Copy Title Link: Example Domain");
        assert_eq!(options[1].payload.plain, "\"Example Domain\" (https://example.com/)");
        assert_eq!(
            options[1].payload.html,
            "<a href='https://example.com/'>Example Domain</a>"
        );
    }

    #[test]
    fn test_empty_title_still_offered() {
        let tab = create_test_tab("https://example.com/", "");
        let state = TabDisplayState {
            title_text: Fetch::Empty,
            ..TabDisplayState::default()
        };

        let options = build_menu_options(&tab, &state);

        assert_eq!(ids(&options), vec![OptionId::CopyLink, OptionId::CopyTitle]);
        assert_eq!(options[1].payload.plain, "\"\" (https://example.com/)");
    }

    #[test]
    fn test_selection_option() {
        let tab = create_test_tab("https://example.com/", "Example");
        let mut state = loaded_state("https://example.com/", "Example");
        state.selection_text = Fetch::Loaded("hello world".to_string());

        let options = build_menu_options(&tab, &state);

        assert_eq!(
            ids(&options),
            vec![OptionId::CopyLink, OptionId::CopyTitle, OptionId::CopySelectionLink]
        );
        assert_eq!(options[2].title(), "Copy Selection Link: hello world");
        assert_eq!(options[2].payload.plain, "\"hello world\" (https://example.com/)");

        state.selection_text = Fetch::Empty;
        let options = build_menu_options(&tab, &state);
        assert!(!ids(&options).contains(&OptionId::CopySelectionLink));
    }

    #[test]
    fn test_jira_formatted_option() {
        let url = "https://acme.atlassian.net/browse/PROJ-123";
        let tab = create_test_tab(url, "[PROJ-123] Fix crash - Jira");
        let mut state = loaded_state(url, "Fix crash");
        state.formatted_link = Fetch::Loaded(FormattedLink {
            pre_text: String::new(),
            url_text: "PROJ-123".to_string(),
            post_text: ": Fix crash".to_string(),
            site_name: "Jira Ticket".to_string(),
        });

        let options = build_menu_options(&tab, &state);
        let formatted = options.last().unwrap();

        assert_eq!(formatted.id, OptionId::CopyFormattedLink);
        assert_eq!(formatted.title(), "Copy Jira Ticket Flink: [PROJ-123]: Fix crash");
        assert_eq!(
            formatted.payload.plain,
            "https://acme.atlassian.net/browse/PROJ-123: Fix crash"
        );
        assert_eq!(
            formatted.payload.html,
            "<a href='https://acme.atlassian.net/browse/PROJ-123'>PROJ-123</a>: Fix crash"
        );
    }

    #[test]
    fn test_google_docs_formatted_option() {
        let url = "https://docs.google.com/document/d/abc/edit";
        let tab = create_test_tab(url, "Plan - Google Docs");
        let mut state = loaded_state(url, "Plan");
        state.formatted_link = Fetch::Loaded(FormattedLink {
            url_text: "Plan".to_string(),
            site_name: "Google Docs".to_string(),
            ..FormattedLink::default()
        });

        let options = build_menu_options(&tab, &state);

        assert_eq!(
            options.last().unwrap().payload.plain,
            "\"Plan\" (https://docs.google.com/document/d/abc/edit)"
        );
    }

    #[test]
    fn test_wikipedia_formatted_option_plain_is_bare_url() {
        let url = "https://en.wikipedia.org/wiki/Cat#History";
        let tab = create_test_tab(url, "Cat");
        let mut state = loaded_state(url, "Cat");
        state.formatted_link = Fetch::Loaded(FormattedLink {
            url_text: "Cat".to_string(),
            site_name: "Wikipedia".to_string(),
            ..FormattedLink::default()
        });

        let options = build_menu_options(&tab, &state);
        let formatted = options.last().unwrap();

        assert_eq!(formatted.payload.plain, url);
        assert_eq!(formatted.payload.html, format!("<a href='{}'>Cat</a>", url));
    }

    #[test]
    fn test_formatted_option_requires_site_name() {
        let tab = create_test_tab("https://example.com/", "Example");
        let mut state = loaded_state("https://example.com/", "Example");
        state.formatted_link = Fetch::Loaded(FormattedLink {
            url_text: "Something".to_string(),
            ..FormattedLink::default()
        });

        let options = build_menu_options(&tab, &state);

        assert!(!ids(&options).contains(&OptionId::CopyFormattedLink));
    }

    #[test]
    fn test_html_is_escaped() {
        let tab = create_test_tab("https://example.com/?a=1&b=2", "Tom & Jerry");
        let options = build_menu_options(&tab, &loaded_state("https://example.com/", "<Tom & Jerry>"));

        assert_eq!(
            options[1].payload.html,
            "<a href='https://example.com/?a=1&amp;b=2'>&lt;Tom &amp; Jerry&gt;</a>"
        );
        assert_eq!(options[1].payload.plain, "\"<Tom & Jerry>\" (https://example.com/?a=1&b=2)");
    }

    #[test]
    fn test_build_is_idempotent() {
        let tab = create_test_tab("https://en.wikipedia.org/wiki/Cat", "Cat");
        let mut state = loaded_state("https://en.wikipedia.org/wiki/Cat", "Cat");
        state.selection_text = Fetch::Loaded("purr".to_string());
        state.formatted_link = Fetch::Loaded(FormattedLink {
            url_text: "Cat".to_string(),
            site_name: "Wikipedia".to_string(),
            ..FormattedLink::default()
        });

        assert_eq!(build_menu_options(&tab, &state), build_menu_options(&tab, &state));
    }
}
