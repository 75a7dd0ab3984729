//! RSS/Atom headline source for the ticker.

use std::collections::HashSet;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use quick_xml::de::from_str;
use reqwest::Client;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::{debug, warn};

use super::error::NwsError;
use crate::feed::{FeedCategory, FeedPayload, FeedSource, FetchFailure, HeadlineEntry};

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<RssItem>,
}

#[derive(Debug, Deserialize)]
struct RssItem {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Atom {
    #[serde(rename = "entry", default)]
    entries: Vec<AtomEntry>,
}

#[derive(Debug, Deserialize)]
struct AtomEntry {
    title: Option<AtomText>,
    #[serde(default)]
    link: Vec<AtomLink>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
}

/// Feeds in the wild carry HTML entities that are not valid XML.
fn scrub_html_entities(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}

fn headline(
    title: Option<&str>,
    link: Option<&str>,
    timestamp: Option<DateTime<Utc>>,
) -> Option<HeadlineEntry> {
    let text = title?.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }
    let key = match link.map(str::trim).filter(|l| !l.is_empty()) {
        Some(link) => link.to_string(),
        None => text.to_lowercase(),
    };
    Some(HeadlineEntry {
        id: format!("{:x}", Sha256::digest(key.as_bytes())),
        text,
        source_timestamp: timestamp,
    })
}

/// Parse an RSS 2.0 or Atom document into headlines, keeping at most
/// `max_items` entries with a non-blank title.
pub fn parse_feed(xml: &str, max_items: usize) -> Result<Vec<HeadlineEntry>, NwsError> {
    let xml = scrub_html_entities(xml);

    let entries: Vec<HeadlineEntry> = match from_str::<Rss>(&xml) {
        Ok(rss) => rss
            .channel
            .items
            .iter()
            .filter_map(|item| {
                let published = item
                    .pub_date
                    .as_deref()
                    .and_then(|d| DateTime::parse_from_rfc2822(d.trim()).ok())
                    .map(|d| d.with_timezone(&Utc));
                headline(item.title.as_deref(), item.link.as_deref(), published)
            })
            .take(max_items)
            .collect(),
        Err(rss_err) if !xml.contains("<feed") => {
            return Err(NwsError::ParseError(format!(
                "not an RSS or Atom document: {}",
                rss_err
            )));
        }
        Err(_) => {
            let atom = from_str::<Atom>(&xml)
                .map_err(|e| NwsError::ParseError(format!("invalid Atom feed: {}", e)))?;
            atom.entries
                .iter()
                .filter_map(|entry| {
                    let updated = entry
                        .updated
                        .as_deref()
                        .and_then(|d| DateTime::parse_from_rfc3339(d.trim()).ok())
                        .map(|d| d.with_timezone(&Utc));
                    headline(
                        entry.title.as_ref().map(|t| t.value.as_str()),
                        entry.link.iter().find_map(|l| l.href.as_deref()),
                        updated,
                    )
                })
                .take(max_items)
                .collect()
        }
    };

    Ok(entries)
}

/// Drop entries whose title repeats an earlier one, ignoring case.
pub fn dedupe_headlines(entries: Vec<HeadlineEntry>) -> Vec<HeadlineEntry> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|e| seen.insert(e.text.to_lowercase()))
        .collect()
}

/// Headlines merged from a list of RSS/Atom URLs.
pub struct RssHeadlineSource {
    client: Client,
    urls: Vec<String>,
    max_items_per_feed: usize,
}

impl RssHeadlineSource {
    pub fn new(
        urls: Vec<String>,
        max_items_per_feed: usize,
        user_agent: &str,
        timeout: Duration,
    ) -> Result<Self, NwsError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .build()?;

        Ok(Self {
            client,
            urls,
            max_items_per_feed,
        })
    }

    pub fn urls(&self) -> &[String] {
        &self.urls
    }

    async fn fetch_one(&self, url: &str) -> Result<Vec<HeadlineEntry>, NwsError> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response.text().await.unwrap_or_default();
            return Err(NwsError::ApiError {
                status,
                url: url.to_string(),
                message,
            });
        }

        let body = response.text().await?;
        parse_feed(&body, self.max_items_per_feed)
    }
}

#[async_trait]
impl FeedSource for RssHeadlineSource {
    fn name(&self) -> &str {
        "rss-headlines"
    }

    fn category(&self) -> FeedCategory {
        FeedCategory::Headlines
    }

    async fn fetch(&self) -> Result<FeedPayload, FetchFailure> {
        if self.urls.is_empty() {
            return Ok(FeedPayload::Headlines(Vec::new()));
        }

        let results = join_all(self.urls.iter().map(|url| self.fetch_one(url))).await;

        let mut merged = Vec::new();
        let mut failures = Vec::new();
        for (url, result) in self.urls.iter().zip(results) {
            match result {
                Ok(entries) => {
                    debug!(url = %url, count = entries.len(), "Fetched headline feed");
                    merged.extend(entries);
                }
                Err(e) => {
                    warn!(url = %url, error = %e, "Skipping headline feed");
                    failures.push(e);
                }
            }
        }

        if failures.len() == self.urls.len() {
            if let Some(e) = failures.pop() {
                return Err(e.into());
            }
        }

        Ok(FeedPayload::Headlines(dedupe_headlines(merged)))
    }
}
