use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::llm::ChatModel;
use super::models::{
    CareerAnalysis, CareerHighlight, JobDescriptionAnalysis, ProfileAnalysis, ProfileInput,
};
use super::prompts;

/// Summary returned for an empty career narrative; the model is not called.
pub const NO_CAREER_DATA_SUMMARY: &str = "経歴情報が提供されていません";
pub const DEFAULT_MOTIVATION_LEVEL: &str = "1";

static LEADING_NUMBER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*(-?\d+(?:\.\d+)?)").unwrap());

/// Narrative analysis, profile rating and job-description analysis over one chat model.
#[derive(Clone)]
pub struct ProfileAnalyzer {
    model: Arc<dyn ChatModel>,
}

impl ProfileAnalyzer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn analyze_career(&self, career_text: &str) -> anyhow::Result<CareerAnalysis> {
        if career_text.trim().is_empty() {
            debug!("career narrative is empty; skipping model call");
            return Ok(CareerAnalysis {
                highlights: Vec::new(),
                summary: NO_CAREER_DATA_SUMMARY.to_string(),
                point: None,
            });
        }

        let raw = self
            .model
            .complete_json(prompts::CAREER_SYSTEM, &prompts::career_highlights(career_text))
            .await?;

        Ok(parse_career_analysis(&raw))
    }

    /// Rates motivation and ambition. The career analysis is recomputed from
    /// `profile.career_summary` and returned alongside.
    pub async fn rate_profile(&self, profile: &ProfileInput) -> anyhow::Result<ProfileAnalysis> {
        let career_highlights = self.analyze_career(&profile.career_summary).await?;

        let raw = self
            .model
            .complete_json(prompts::RATING_SYSTEM, &prompts::profile_rating(profile))
            .await?;

        let (motivation_level, ambition_summary) = match parse_object(&raw) {
            Some(result) => (
                text_field(&result, "motivationLevel")
                    .filter(|level| !level.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_MOTIVATION_LEVEL.to_string()),
                text_field(&result, "ambitionSummary").unwrap_or_default(),
            ),
            // Only the rating fields fall back; the career analysis above is returned as computed
            // rather than reset to the unscored sentinel.
            None => {
                warn!("profile rating response is not a JSON object; using defaults");
                (DEFAULT_MOTIVATION_LEVEL.to_string(), String::new())
            }
        };

        Ok(ProfileAnalysis {
            career_highlights,
            motivation_level,
            ambition_summary,
        })
    }

    pub async fn analyze_job_description(
        &self,
        description: &str,
    ) -> anyhow::Result<JobDescriptionAnalysis> {
        let raw = self
            .model
            .complete_json(
                prompts::JOB_DESCRIPTION_SYSTEM,
                &prompts::job_description(description),
            )
            .await?;

        let Some(result) = parse_object(&raw) else {
            warn!("job description response is not a JSON object; using empty lists");
            return Ok(JobDescriptionAnalysis::default());
        };

        Ok(JobDescriptionAnalysis {
            required_skills: text_list(&result, "requiredSkills"),
            benefits: text_list(&result, "benefits"),
            key_points: text_list(&result, "keyPoints"),
        })
    }
}

pub fn parse_career_analysis(raw: &str) -> CareerAnalysis {
    let Some(result) = parse_object(raw) else {
        warn!("career analysis response is not a JSON object; using sentinel result");
        return CareerAnalysis::unscored();
    };

    let highlights = match result.get("highlights") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(|item| CareerHighlight {
                point: text_field(item, "point").unwrap_or_default(),
                reason: text_field(item, "reason").unwrap_or_default(),
                impact: text_field(item, "impact").unwrap_or_default(),
            })
            .collect(),
        _ => Vec::new(),
    };

    CareerAnalysis {
        highlights,
        summary: text_field(&result, "summary").unwrap_or_default(),
        point: Some(parse_point(result.get("point"))),
    }
}

/// Score from a number or a string such as `"7"` / `"7/10"`. Anything outside 1..=10 is unscored.
fn parse_point(value: Option<&Value>) -> f64 {
    let parsed = match value {
        Some(Value::Number(number)) => number.as_f64(),
        Some(Value::String(text)) => LEADING_NUMBER_RE
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| m.as_str().parse::<f64>().ok()),
        _ => None,
    };

    match parsed {
        Some(point) if (1.0..=10.0).contains(&point) => point,
        _ => CareerAnalysis::UNSCORED,
    }
}

fn parse_object(raw: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(strip_json_fences(raw)) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn text_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key)? {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn text_list(map: &Map<String, Value>, key: &str) -> Vec<String> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(text) => Some(text.clone()),
                Value::Number(number) => Some(number.to_string()),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    let inner = text
        .strip_prefix("```json")
        .or_else(|| text.strip_prefix("```"));

    match inner {
        Some(stripped) => stripped
            .trim_start()
            .strip_suffix("```")
            .map(str::trim)
            .unwrap_or(stripped.trim_start()),
        None => text,
    }
}
