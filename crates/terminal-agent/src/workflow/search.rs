//! Web search for the workflow planner, scraped from DuckDuckGo's HTML results page.

use async_trait::async_trait;
use regex::Regex;
use std::time::Duration;
use tracing::debug;

use crate::error::DelegateError;

pub const DUCKDUCKGO_HTML_URL: &str = "https://html.duckduckgo.com/html/";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[async_trait]
pub trait SearchTool: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, DelegateError>;
}

/// Pulls result links and snippets out of a results page.
struct ResultParser {
    link: Regex,
    snippet: Regex,
    tag: Regex,
}

impl ResultParser {
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            link: Regex::new(r#"(?s)<a[^>]+class="result__a"[^>]+href="([^"]+)"[^>]*>(.*?)</a>"#)?,
            snippet: Regex::new(r#"(?s)<a[^>]+class="result__snippet"[^>]*>(.*?)</a>"#)?,
            tag: Regex::new(r"<[^>]+>")?,
        })
    }

    fn parse(&self, html: &str, max_results: usize) -> Vec<SearchHit> {
        let snippets: Vec<String> = self
            .snippet
            .captures_iter(html)
            .map(|cap| self.text(cap.get(1).map_or("", |m| m.as_str())))
            .collect();

        self.link
            .captures_iter(html)
            .take(max_results)
            .enumerate()
            .map(|(i, cap)| SearchHit {
                title: self.text(cap.get(2).map_or("", |m| m.as_str())),
                url: unwrap_redirect(cap.get(1).map_or("", |m| m.as_str())),
                snippet: snippets.get(i).cloned().unwrap_or_default(),
            })
            .collect()
    }

    /// Inline markup such as `<b>` is dropped and entities decoded.
    fn text(&self, fragment: &str) -> String {
        let stripped = self.tag.replace_all(fragment, "");
        html_escape::decode_html_entities(stripped.trim()).into_owned()
    }
}

/// Result links point at `/l/?uddg=<target>`; return the target.
fn unwrap_redirect(href: &str) -> String {
    let href = html_escape::decode_html_entities(href);
    let target = href
        .split("uddg=")
        .nth(1)
        .and_then(|rest| rest.split('&').next())
        .and_then(|encoded| urlencoding::decode(encoded).ok())
        .map(|decoded| decoded.into_owned());
    target.unwrap_or_else(|| href.into_owned())
}

pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    parser: ResultParser,
    base_url: String,
    max_results: usize,
}

impl DuckDuckGoSearch {
    pub fn new(max_results: usize) -> anyhow::Result<Self> {
        Self::with_base_url(DUCKDUCKGO_HTML_URL, max_results)
    }

    pub fn with_base_url(base_url: impl Into<String>, max_results: usize) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(concat!("terminal-agent/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            parser: ResultParser::new()?,
            base_url: base_url.into(),
            max_results,
        })
    }
}

#[async_trait]
impl SearchTool for DuckDuckGoSearch {
    async fn search(&self, query: &str) -> Result<Vec<SearchHit>, DelegateError> {
        if query.trim().is_empty() {
            return Err(DelegateError::Search("query cannot be empty".to_string()));
        }
        debug!("Searching DuckDuckGo for {:?}", query);

        let url = format!("{}?q={}", self.base_url, urlencoding::encode(query));
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| DelegateError::Search(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DelegateError::Search(format!("search returned {}", status)));
        }

        let html = response
            .text()
            .await
            .map_err(|e| DelegateError::Search(e.to_string()))?;

        let hits = self.parser.parse(&html, self.max_results);
        debug!("Search returned {} hit(s)", hits.len());
        Ok(hits)
    }
}
