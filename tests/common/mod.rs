//! Shared fakes for integration tests: an in-memory sheet, a scripted chat
//! model and a browser page that serves fixture HTML.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use candidate_scout::core::browser::PageSession;
use candidate_scout::core::config::BrowserSettings;
use candidate_scout::core::errors::CoreError;
use candidate_scout::core::llm::ChatModel;
use candidate_scout::core::profile_page;
use candidate_scout::core::prompts;
use candidate_scout::core::row_store::{SheetBackend, SheetSnapshot};

pub const PROFILE_PAGE: &str = include_str!("../fixtures/profile_page.html");
pub const SIGN_IN_PAGE: &str =
    "<html><body><form class=\"sign-in-form\"><input name=\"email\"></form></body></html>";

pub const HEADERS: [&str; 14] = [
    "id",
    "status",
    "age",
    "ambition",
    "skills",
    "preferredLocation",
    "preferredSalary",
    "careerSummary",
    "careerSummaryHighlights",
    "careerSummaryAnalysis",
    "motivationLevel",
    "ambitionSummary",
    "recommendPoint",
    "lastUpdated",
];

pub fn browser_settings() -> BrowserSettings {
    BrowserSettings {
        site_origin: "https://profiles.test".to_string(),
        headless: true,
        navigation_timeout: Duration::from_secs(1),
        landmark_timeout: Duration::from_secs(1),
    }
}

/// Worksheet held in memory; row 0 of `values` is the header.
pub struct MemorySheet {
    values: Mutex<Vec<Vec<String>>>,
    writes: Mutex<Vec<usize>>,
    fail_load: bool,
    vanishing_id: Option<String>,
}

impl MemorySheet {
    pub fn new(headers: &[&str], rows: &[&[&str]]) -> Arc<Self> {
        let mut values = vec![headers.iter().map(|h| h.to_string()).collect::<Vec<_>>()];
        values.extend(
            rows.iter()
                .map(|row| row.iter().map(|c| c.to_string()).collect::<Vec<_>>()),
        );

        Arc::new(Self {
            values: Mutex::new(values),
            writes: Mutex::new(Vec::new()),
            fail_load: false,
            vanishing_id: None,
        })
    }

    pub fn unreachable() -> Arc<Self> {
        Arc::new(Self {
            values: Mutex::new(Vec::new()),
            writes: Mutex::new(Vec::new()),
            fail_load: true,
            vanishing_id: None,
        })
    }

    /// Queue rows with only `id` and `status` set, under the full header.
    pub fn queue(rows: &[(&str, &str)]) -> Arc<Self> {
        let rows: Vec<Vec<&str>> = rows.iter().map(|(id, status)| vec![*id, *status]).collect();
        let refs: Vec<&[&str]> = rows.iter().map(|r| r.as_slice()).collect();
        Self::new(&HEADERS, &refs)
    }

    /// Like [`MemorySheet::queue`], but the row holding `id` loses its key right after
    /// the first read, as if someone edited the sheet mid-run.
    pub fn queue_with_vanishing(rows: &[(&str, &str)], id: &str) -> Arc<Self> {
        let sheet = Self::queue(rows);
        let values = sheet.values.lock().unwrap().clone();
        Arc::new(Self {
            values: Mutex::new(values),
            writes: Mutex::new(Vec::new()),
            fail_load: false,
            vanishing_id: Some(id.to_string()),
        })
    }

    pub fn cell(&self, index: usize, column: &str) -> String {
        let values = self.values.lock().unwrap();
        let col = values[0].iter().position(|h| h == column).unwrap();
        values[index + 1].get(col).cloned().unwrap_or_default()
    }

    pub fn write_count(&self) -> usize {
        self.writes.lock().unwrap().len()
    }

    pub fn written_rows(&self) -> Vec<usize> {
        self.writes.lock().unwrap().clone()
    }
}

#[async_trait]
impl SheetBackend for MemorySheet {
    async fn load_info(&self) -> anyhow::Result<()> {
        if self.fail_load {
            return Err(CoreError::GoogleApi {
                status: 403,
                body: "caller does not have permission".to_string(),
            }
            .into());
        }
        Ok(())
    }

    async fn fetch_rows(&self) -> anyhow::Result<SheetSnapshot> {
        let mut values = self.values.lock().unwrap();
        let snapshot = SheetSnapshot::from_values(values.clone());

        if let Some(id) = &self.vanishing_id {
            for row in values.iter_mut().skip(1) {
                if row.first() == Some(id) {
                    row[0].clear();
                }
            }
        }

        Ok(snapshot)
    }

    async fn write_row(&self, index: usize, values: &[String]) -> anyhow::Result<()> {
        let mut sheet = self.values.lock().unwrap();
        sheet[index + 1] = values.to_vec();
        self.writes.lock().unwrap().push(index);
        Ok(())
    }
}

/// Answers career prompts and rating prompts with fixed JSON.
pub struct CannedModel {
    career_reply: String,
    rating_reply: String,
    fail_rating: bool,
    calls: Mutex<Vec<&'static str>>,
}

impl CannedModel {
    pub fn new() -> Arc<Self> {
        Self::build(false)
    }

    pub fn failing_rating() -> Arc<Self> {
        Self::build(true)
    }

    fn build(fail_rating: bool) -> Arc<Self> {
        Arc::new(Self {
            career_reply: r#"{"highlights":[{"point":"決済基盤の刷新","reason":"事業の中核","impact":"設計力"}],"summary":"決済領域に強いバックエンドエンジニア","point":7}"#.to_string(),
            rating_reply: r#"{"motivationLevel":"4","ambitionSummary":"技術責任者を目指している"}"#.to_string(),
            fail_rating,
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatModel for CannedModel {
    async fn complete_json(&self, system: &str, _prompt: &str) -> anyhow::Result<String> {
        if system == prompts::CAREER_SYSTEM {
            self.calls.lock().unwrap().push("career");
            return Ok(self.career_reply.clone());
        }

        self.calls.lock().unwrap().push("rating");
        if self.fail_rating {
            return Err(CoreError::LlmApi {
                status: 401,
                body: "invalid api key".to_string(),
            }
            .into());
        }
        Ok(self.rating_reply.clone())
    }
}

pub enum Fixture {
    Html(String),
    Unreachable,
}

/// Browser page that serves fixture HTML per URL.
pub struct FakePage {
    fixtures: HashMap<String, Fixture>,
    current: Mutex<Option<String>>,
    visited: Mutex<Vec<String>>,
    content_reads: Mutex<usize>,
    closed: Mutex<bool>,
}

impl FakePage {
    pub fn new(fixtures: Vec<(&str, Fixture)>) -> Arc<Self> {
        Arc::new(Self {
            fixtures: fixtures
                .into_iter()
                .map(|(url, fixture)| (url.to_string(), fixture))
                .collect(),
            current: Mutex::new(None),
            visited: Mutex::new(Vec::new()),
            content_reads: Mutex::new(0),
            closed: Mutex::new(false),
        })
    }

    pub fn visited(&self) -> Vec<String> {
        self.visited.lock().unwrap().clone()
    }

    pub fn content_reads(&self) -> usize {
        *self.content_reads.lock().unwrap()
    }

    pub fn is_closed(&self) -> bool {
        *self.closed.lock().unwrap()
    }

    fn current_html(&self) -> String {
        self.current.lock().unwrap().clone().unwrap_or_default()
    }
}

#[async_trait]
impl PageSession for FakePage {
    async fn goto(&self, url: &str, _timeout: Duration) -> anyhow::Result<()> {
        self.visited.lock().unwrap().push(url.to_string());
        match self.fixtures.get(url) {
            Some(Fixture::Html(html)) => {
                *self.current.lock().unwrap() = Some(html.clone());
                Ok(())
            }
            Some(Fixture::Unreachable) | None => Err(CoreError::NavigationTimeout {
                url: url.to_string(),
            }
            .into()),
        }
    }

    async fn has_element(&self, selector: &str) -> anyhow::Result<bool> {
        Ok(profile_page::has_landmark(&self.current_html(), selector))
    }

    async fn wait_for_element(&self, selector: &str, _timeout: Duration) -> anyhow::Result<bool> {
        Ok(profile_page::has_landmark(&self.current_html(), selector))
    }

    async fn content(&self) -> anyhow::Result<String> {
        *self.content_reads.lock().unwrap() += 1;
        Ok(self.current_html())
    }

    async fn current_url(&self) -> String {
        self.visited.lock().unwrap().last().cloned().unwrap_or_default()
    }

    async fn close(&self) -> anyhow::Result<()> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}
