use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use tracing::{error, info, warn};

use super::analyzer::ProfileAnalyzer;
use super::auth::ServiceAccountAuth;
use super::browser::{ChromeSession, PageSession};
use super::config::{AppConfig, BrowserSettings};
use super::extractor::ProfileExtractor;
use super::google_sheets::GoogleSheetsClient;
use super::llm::OpenAiClient;
use super::models::{ExtractedProfile, ProfileAnalysis, ProfileInput, RowUpdate, WorkStatus};
use super::row_store::RowStore;

const USER_AGENT: &str = concat!("CandidateScout/", env!("CARGO_PKG_VERSION"));
const SHEETS_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemOutcome {
    Completed,
    RowMissing,
}

/// Drives the pending rows of the sheet through extraction, rating and write-back, one at a time.
pub struct ScoutService {
    rows: RowStore,
    extractor: ProfileExtractor,
    analyzer: ProfileAnalyzer,
    throttle: Duration,
}

impl ScoutService {
    pub fn new(
        rows: RowStore,
        extractor: ProfileExtractor,
        analyzer: ProfileAnalyzer,
        throttle: Duration,
    ) -> Self {
        Self {
            rows,
            extractor,
            analyzer,
            throttle,
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        self.rows.init().await?;

        let ids = self
            .rows
            .list_pending_ids()
            .await
            .context("failed to fetch pending ids from spreadsheet")?;
        info!(total = ids.len(), "fetched pending ids");

        for (position, id) in ids.iter().enumerate() {
            if position > 0 {
                tokio::time::sleep(self.throttle).await;
            }

            info!(id = %id, position = position + 1, total = ids.len(), "processing profile");
            match self.process_item(id).await {
                Ok(ItemOutcome::Completed) => info!(id = %id, "profile processed"),
                Ok(ItemOutcome::RowMissing) => warn!(id = %id, "row not found; skipping"),
                Err(err) => {
                    error!(id = %id, error = %format!("{err:#}"), "failed to process profile");
                    self.mark_failed(id).await;
                }
            }
        }

        info!("finished processing pending ids");
        Ok(())
    }

    async fn process_item(&self, id: &str) -> anyhow::Result<ItemOutcome> {
        let Some(row) = self.rows.find_by_id(id).await? else {
            return Ok(ItemOutcome::RowMissing);
        };

        self.rows
            .update_status(row.index, WorkStatus::Processing)
            .await?;

        let profile = self.extractor.extract(id).await?;
        let analysis = self
            .analyzer
            .rate_profile(&ProfileInput::from(&profile))
            .await?;

        let update = completed_update(profile, &analysis)?;
        self.rows.update_row(row.index, &update).await?;

        Ok(ItemOutcome::Completed)
    }

    /// Best effort: the row is located again since the sheet may have shifted.
    async fn mark_failed(&self, id: &str) {
        let result = async {
            if let Some(row) = self.rows.find_by_id(id).await? {
                self.rows.update_status(row.index, WorkStatus::Error).await?;
            }
            anyhow::Ok(())
        }
        .await;

        if let Err(err) = result {
            warn!(id = %id, error = %format!("{err:#}"), "could not mark row as error");
        }
    }
}

fn completed_update(
    profile: ExtractedProfile,
    analysis: &ProfileAnalysis,
) -> anyhow::Result<RowUpdate> {
    let highlights = &analysis.career_highlights;

    Ok(RowUpdate {
        status: Some(WorkStatus::Completed),
        age: Some(profile.age),
        ambition: Some(profile.ambition),
        skills: Some(profile.skills),
        preferred_location: Some(profile.preferred_location),
        preferred_salary: Some(profile.preferred_salary),
        career_summary: Some(profile.career_summary),
        career_summary_highlights: Some(serde_json::to_string(&highlights.highlights)?),
        career_summary_analysis: Some(highlights.summary.clone()),
        motivation_level: Some(analysis.motivation_level.clone()),
        ambition_summary: Some(analysis.ambition_summary.clone()),
        recommend_point: highlights
            .point
            .map(|point| point.to_string())
            .or(profile.recommend_point),
        ..RowUpdate::default()
    })
}

/// Wires the production collaborators from `config` and runs one batch.
pub async fn run(config: &AppConfig) -> anyhow::Result<()> {
    let sheets_http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(SHEETS_TIMEOUT)
        .build()
        .context("failed to build HTTP client")?;
    let llm_http = reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(config.llm.timeout)
        .build()
        .context("failed to build HTTP client")?;

    let llm = OpenAiClient::new(llm_http, &config.llm);
    info!(model = llm.model(), "LLM client initialized");
    let analyzer = ProfileAnalyzer::new(Arc::new(llm));

    let auth = ServiceAccountAuth::new(sheets_http.clone(), &config.sheets);
    let sheets = GoogleSheetsClient::new(sheets_http, auth, config.sheets.spreadsheet_id.clone());
    let rows = RowStore::new(Arc::new(sheets));

    let session: Arc<dyn PageSession> = Arc::new(ChromeSession::launch(&config.browser).await?);
    run_with_session(session, rows, analyzer, &config.browser, config.throttle).await
}

/// Runs one batch on an already open page and closes it afterwards, whatever the outcome.
pub async fn run_with_session(
    session: Arc<dyn PageSession>,
    rows: RowStore,
    analyzer: ProfileAnalyzer,
    browser: &BrowserSettings,
    throttle: Duration,
) -> anyhow::Result<()> {
    let extractor = ProfileExtractor::new(Arc::clone(&session), analyzer.clone(), browser);
    let outcome = ScoutService::new(rows, extractor, analyzer, throttle)
        .run()
        .await;

    if let Err(err) = session.close().await {
        warn!(error = %format!("{err:#}"), "failed to close browser session");
    }

    outcome
}
