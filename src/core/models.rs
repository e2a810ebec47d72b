use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum WorkStatus {
    Pending,
    Processing,
    Completed,
    Error,
}

impl WorkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkStatus::Pending => "pending",
            WorkStatus::Processing => "processing",
            WorkStatus::Completed => "completed",
            WorkStatus::Error => "error",
        }
    }
}

/// One spreadsheet row, keyed by the header names of the first tab.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorkItem {
    pub id: String,
    pub status: Option<String>,
    pub age: Option<String>,
    pub current_company: Option<String>,
    pub job_change_motivation: Option<String>,
    pub ambition: Option<String>,
    pub education: Option<String>,
    pub career_summary: Option<String>,
    pub skills: Option<String>,
    pub preferred_location: Option<String>,
    pub preferred_salary: Option<String>,
    pub career_summary_highlights: Option<String>,
    pub career_summary_analysis: Option<String>,
    pub motivation_level: Option<String>,
    pub ambition_summary: Option<String>,
    pub recommend_point: Option<String>,
    pub last_updated: Option<String>,
}

impl WorkItem {
    /// Rows without a status, or explicitly `pending`, are waiting to be processed.
    pub fn is_pending(&self) -> bool {
        match self.status.as_deref().map(str::trim) {
            None | Some("") => true,
            Some(status) => status == WorkStatus::Pending.as_str(),
        }
    }
}

/// Fields to write onto an existing row. `None` leaves the stored cell untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RowUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_change_motivation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_salary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_summary_highlights: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub career_summary_analysis: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivation_level: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ambition_summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recommend_point: Option<String>,
}

impl RowUpdate {
    pub fn status(status: WorkStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowMatch {
    pub index: usize,
    pub data: WorkItem,
}

/// Fields scraped from one profile page, with the career analysis folded in.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedProfile {
    pub age: String,
    pub ambition: String,
    pub skills: String,
    pub preferred_location: String,
    pub preferred_salary: String,
    pub career_summary: String,
    pub recommend_point: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileInput {
    pub age: String,
    pub current_company: String,
    pub job_change_motivation: String,
    pub ambition: String,
    pub education: String,
    pub career_summary: String,
    pub skills: String,
}

impl From<&ExtractedProfile> for ProfileInput {
    fn from(profile: &ExtractedProfile) -> Self {
        Self {
            age: profile.age.clone(),
            ambition: profile.ambition.clone(),
            career_summary: profile.career_summary.clone(),
            skills: profile.skills.clone(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CareerHighlight {
    pub point: String,
    pub reason: String,
    pub impact: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CareerAnalysis {
    pub highlights: Vec<CareerHighlight>,
    pub summary: String,
    /// Suitability on a 1-10 scale; `-1` when the model gave no usable score.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub point: Option<f64>,
}

impl CareerAnalysis {
    pub const UNSCORED: f64 = -1.0;

    pub fn unscored() -> Self {
        Self {
            highlights: Vec::new(),
            summary: String::new(),
            point: Some(Self::UNSCORED),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileAnalysis {
    pub career_highlights: CareerAnalysis,
    pub motivation_level: String,
    pub ambition_summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct JobDescriptionAnalysis {
    pub required_skills: Vec<String>,
    pub benefits: Vec<String>,
    pub key_points: Vec<String>,
}
