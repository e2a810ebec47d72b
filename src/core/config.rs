use std::time::Duration;

use super::errors::CoreError;

pub const DEFAULT_MODEL: &str = "chatgpt-4o-latest";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_SITE_ORIGIN: &str = "https://job-draft.jp";
/// Log filter used when `RUST_LOG` is unset or unparseable.
pub const DEFAULT_LOG_FILTER: &str = "candidate_scout=info";

#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct SheetsSettings {
    pub spreadsheet_id: String,
    pub client_email: Option<String>,
    pub private_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct BrowserSettings {
    pub site_origin: String,
    pub headless: bool,
    pub navigation_timeout: Duration,
    pub landmark_timeout: Duration,
}

/// Process configuration, built once at startup and handed to each component.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub llm: LlmSettings,
    pub sheets: SheetsSettings,
    pub browser: BrowserSettings,
    pub throttle: Duration,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("OPENAI_API_KEY").ok_or(CoreError::MissingConfig("OPENAI_API_KEY"))?;
        let spreadsheet_id =
            get("SPREADSHEET_ID").ok_or(CoreError::MissingConfig("SPREADSHEET_ID"))?;

        Ok(Self {
            llm: LlmSettings {
                api_key,
                model: get("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
                base_url: get("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                timeout: Duration::from_secs(parse_or("LLM_TIMEOUT_SECS", get("LLM_TIMEOUT_SECS"), 120)?),
            },
            sheets: SheetsSettings {
                spreadsheet_id,
                client_email: get("GOOGLE_SHEETS_CLIENT_EMAIL"),
                private_key: get("GOOGLE_SHEETS_PRIVATE_KEY").map(|key| unescape_private_key(&key)),
            },
            browser: BrowserSettings {
                site_origin: get("PROFILE_SITE_ORIGIN")
                    .unwrap_or_else(|| DEFAULT_SITE_ORIGIN.to_string())
                    .trim_end_matches('/')
                    .to_string(),
                headless: parse_bool("BROWSER_HEADLESS", get("BROWSER_HEADLESS"), true)?,
                navigation_timeout: Duration::from_secs(parse_or(
                    "NAVIGATION_TIMEOUT_SECS",
                    get("NAVIGATION_TIMEOUT_SECS"),
                    60,
                )?),
                landmark_timeout: Duration::from_secs(parse_or(
                    "LANDMARK_TIMEOUT_SECS",
                    get("LANDMARK_TIMEOUT_SECS"),
                    120,
                )?),
            },
            throttle: Duration::from_millis(parse_or("THROTTLE_MS", get("THROTTLE_MS"), 2000)?),
        })
    }
}

/// Private keys arrive with literal `\n` sequences when passed through a `.env` file.
pub fn unescape_private_key(raw: &str) -> String {
    raw.replace("\\n", "\n")
}

fn parse_or(key: &'static str, value: Option<String>, default: u64) -> anyhow::Result<u64> {
    match value {
        None => Ok(default),
        Some(raw) => raw.trim().parse::<u64>().map_err(|err| {
            CoreError::InvalidConfig {
                key,
                reason: err.to_string(),
            }
            .into()
        }),
    }
}

fn parse_bool(key: &'static str, value: Option<String>, default: bool) -> anyhow::Result<bool> {
    let Some(raw) = value else {
        return Ok(default);
    };

    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(CoreError::InvalidConfig {
            key,
            reason: format!("expected a boolean, got {other:?}"),
        }
        .into()),
    }
}
