/// Page inspector: answers the background's questions about the current page
use serde::{Deserialize, Serialize};

use crate::protocol::InspectorRequest;
use crate::sites::{self, PageDom};
use crate::tab_data::FormattedLink;
use crate::text::truncate;

const OG_TITLE: &str = r#"meta[property="og:title"]"#;

/// Page state beyond selector queries
pub trait PageContext: PageDom {
    fn url(&self) -> String;

    /// Currently selected text, untruncated
    fn selection(&self) -> String;
}

/// Reply to an [`InspectorRequest`], serialized as a bare string or a link object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum InspectorReply {
    Text(String),
    Link(FormattedLink),
}

pub struct Inspector<P> {
    page: P,
}

impl<P: PageContext> Inspector<P> {
    pub fn new(page: P) -> Self {
        Inspector { page }
    }

    pub fn respond(&self, request: InspectorRequest) -> InspectorReply {
        match request {
            InspectorRequest::GetOpenGraphTitle => InspectorReply::Text(self.open_graph_title()),
            InspectorRequest::GetFormattedLink => InspectorReply::Link(self.formatted_link()),
            InspectorRequest::GetSelection => InspectorReply::Text(self.selection()),
        }
    }

    /// Social-sharing title, empty when the page has none
    pub fn open_graph_title(&self) -> String {
        self.page.attribute(OG_TITLE, "content").unwrap_or_default()
    }

    pub fn formatted_link(&self) -> FormattedLink {
        let url = self.page.url();
        let link = sites::formatted_link(&url, &self.page);
        log::debug!("Formatted link for {}: {:?}", url, link);
        link
    }

    /// Selection as shown in menus
    pub fn selection(&self) -> String {
        truncate(&self.page.selection())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sites::tests::FakeDom;

    struct FakePage {
        url: String,
        selection: String,
        dom: FakeDom,
    }

    impl FakePage {
        fn new(url: &str, dom: FakeDom) -> Self {
            FakePage {
                url: url.to_string(),
                selection: String::new(),
                dom,
            }
        }
    }

    impl PageDom for FakePage {
        fn attribute(&self, selector: &str, name: &str) -> Option<String> {
            self.dom.attribute(selector, name)
        }

        fn input_value(&self, selector: &str) -> Option<String> {
            self.dom.input_value(selector)
        }

        fn inner_text(&self, selector: &str) -> Option<String> {
            self.dom.inner_text(selector)
        }
    }

    impl PageContext for FakePage {
        fn url(&self) -> String {
            self.url.clone()
        }

        fn selection(&self) -> String {
            self.selection.clone()
        }
    }

    #[test]
    fn test_open_graph_title() {
        let dom = FakeDom::default().with_attribute(OG_TITLE, "content", "Shared title");
        let inspector = Inspector::new(FakePage::new("https://example.com/", dom));

        assert_eq!(
            inspector.respond(InspectorRequest::GetOpenGraphTitle),
            InspectorReply::Text("Shared title".to_string())
        );
    }

    #[test]
    fn test_missing_open_graph_title_is_empty() {
        let inspector = Inspector::new(FakePage::new("https://example.com/", FakeDom::default()));

        assert_eq!(inspector.open_graph_title(), "");
    }

    #[test]
    fn test_formatted_link_for_jira() {
        let dom = FakeDom::default().with_text(
            r#"h1[data-testid="issue.views.issue-base.foundation.summary.heading"]"#,
            "Fix crash",
        );
        let inspector = Inspector::new(FakePage::new("https://acme.atlassian.net/browse/PROJ-123", dom));

        assert_eq!(
            inspector.respond(InspectorRequest::GetFormattedLink),
            InspectorReply::Link(FormattedLink {
                pre_text: "".to_string(),
                url_text: "PROJ-123".to_string(),
                post_text: ": Fix crash".to_string(),
                site_name: "Jira Ticket".to_string(),
            })
        );
    }

    #[test]
    fn test_selection_is_truncated() {
        let mut page = FakePage::new("https://example.com/", FakeDom::default());
        page.selection = "s".repeat(100);
        let inspector = Inspector::new(page);

        match inspector.respond(InspectorRequest::GetSelection) {
            InspectorReply::Text(text) => {
                assert_eq!(text.chars().count(), 64);
                assert!(text.ends_with("..."));
            }
            other => panic!("unexpected reply: {:?}", other),
        }
    }

    #[test]
    fn test_reply_wire_format() {
        let text = serde_json::to_value(InspectorReply::Text("hi".to_string())).unwrap();
        assert_eq!(text, serde_json::json!("hi"));

        let link = serde_json::to_value(InspectorReply::Link(FormattedLink::default())).unwrap();
        assert_eq!(
            link,
            serde_json::json!({"preText": "", "urlText": "", "postText": "", "siteName": ""})
        );
    }
}
