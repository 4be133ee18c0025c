/// Site-specific link formatting rules
///
/// Each supported site turns the current page into a formatted link with three
/// parts: `pre_text` before the anchor (unused by every current site),
/// `url_text` inside the anchor, and `post_text` after it. Pages from any other
/// site produce the empty link.
use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::tab_data::FormattedLink;

const JIRA_SUMMARY: &str = r#"h1[data-testid="issue.views.issue-base.foundation.summary.heading"]"#;
const BUGZILLA_SUMMARY: &str = "#field-value-short_desc";
const DOCS_TITLE: &str = ".docs-title-input";
const WIKIPEDIA_PREFIX: &str = "https://en.wikipedia.org/wiki/";

/// Read-only view of the page DOM
pub trait PageDom {
    /// Attribute `name` of the first element matching `selector`
    fn attribute(&self, selector: &str, name: &str) -> Option<String>;

    /// Value of the first `<input>` matching `selector`
    fn input_value(&self, selector: &str) -> Option<String>;

    /// Rendered text of the first element matching `selector`
    fn inner_text(&self, selector: &str) -> Option<String>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site {
    GoogleDocs,
    JiraTicket,
    Bugzilla,
    Wikipedia,
}

impl Site {
    pub fn name(self) -> &'static str {
        match self {
            Site::GoogleDocs => "Google Docs",
            Site::JiraTicket => "Jira Ticket",
            Site::Bugzilla => "Bugzilla",
            Site::Wikipedia => "Wikipedia",
        }
    }
}

// Checked in order, first match wins
static SITE_PATTERNS: LazyLock<Vec<(Site, Regex)>> = LazyLock::new(|| {
    [
        (Site::GoogleDocs, r"^https://docs\.google\.com/(document|spreadsheets|presentation)"),
        (Site::JiraTicket, r"^https://[^/]*\.atlassian\.net/browse"),
        (Site::Bugzilla, r"^https://bugzilla\.mozilla\.org/show_bug\.cgi"),
        (Site::Wikipedia, r"^https://en\.wikipedia\.org/wiki"),
    ]
    .into_iter()
    .filter_map(|(site, pattern)| match Regex::new(pattern) {
        Ok(regex) => Some((site, regex)),
        Err(e) => {
            log::error!("Invalid site pattern {}: {}", pattern, e);
            None
        }
    })
    .collect()
});

/// Find the supported site a URL belongs to
pub fn match_site(url: &str) -> Option<Site> {
    SITE_PATTERNS
        .iter()
        .find(|(_, regex)| regex.is_match(url))
        .map(|(site, _)| *site)
}

/// Compose the formatted link for a page
pub fn formatted_link(url: &str, dom: &impl PageDom) -> FormattedLink {
    let Some(site) = match_site(url) else {
        return FormattedLink::default();
    };

    let (url_text, post_text) = match site {
        Site::GoogleDocs => (dom.input_value(DOCS_TITLE).unwrap_or_default(), String::new()),
        Site::JiraTicket => (
            issue_key(url),
            format!(": {}", dom.inner_text(JIRA_SUMMARY).unwrap_or_default()),
        ),
        Site::Bugzilla => (
            bug_id(url),
            format!(": {}", dom.inner_text(BUGZILLA_SUMMARY).unwrap_or_default()),
        ),
        Site::Wikipedia => (article_name(url), String::new()),
    };

    FormattedLink {
        pre_text: String::new(),
        url_text,
        post_text,
        site_name: site.name().to_string(),
    }
}

/// Last path segment, e.g. "PROJ-123" for `.../browse/PROJ-123`
fn issue_key(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|segments| segments.filter(|s| !s.is_empty()).last().map(str::to_string))
        })
        .unwrap_or_else(|| url.rsplit('/').next().unwrap_or_default().to_string())
}

/// The `id` query parameter, or whatever follows the last '='
fn bug_id(url: &str) -> String {
    Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .query_pairs()
                .find(|(key, _)| key == "id")
                .map(|(_, value)| value.into_owned())
        })
        .unwrap_or_else(|| url.rsplit('=').next().unwrap_or_default().to_string())
}

/// Human-readable article name, e.g. "Rust (programming language)"
fn article_name(url: &str) -> String {
    let Some(rest) = url.strip_prefix(WIKIPEDIA_PREFIX) else {
        return String::new();
    };

    let raw = rest.split(['#', '?']).next().unwrap_or_default();
    let decoded = match percent_decode_str(raw).decode_utf8() {
        Ok(text) => text.into_owned(),
        Err(_) => raw.to_string(),
    };

    decoded.replace('_', " ")
}
