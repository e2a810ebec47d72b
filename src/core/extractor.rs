use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};
use url::Url;

use super::analyzer::ProfileAnalyzer;
use super::browser::PageSession;
use super::config::BrowserSettings;
use super::errors::CoreError;
use super::models::ExtractedProfile;
use super::profile_page::{self, CONTENT_BOX, RESUME_HEADER, SIGN_IN_FORM};

/// Loads one candidate page and turns it into profile fields plus a career analysis.
pub struct ProfileExtractor {
    page: Arc<dyn PageSession>,
    analyzer: ProfileAnalyzer,
    site_origin: String,
    navigation_timeout: Duration,
    landmark_timeout: Duration,
}

impl ProfileExtractor {
    pub fn new(page: Arc<dyn PageSession>, analyzer: ProfileAnalyzer, settings: &BrowserSettings) -> Self {
        Self {
            page,
            analyzer,
            site_origin: settings.site_origin.clone(),
            navigation_timeout: settings.navigation_timeout,
            landmark_timeout: settings.landmark_timeout,
        }
    }

    pub fn profile_url(&self, id: &str) -> anyhow::Result<String> {
        profile_url(&self.site_origin, id)
    }

    pub async fn extract(&self, id: &str) -> anyhow::Result<ExtractedProfile> {
        let url = self.profile_url(id)?;
        self.page.goto(&url, self.navigation_timeout).await?;

        if self.page.has_element(SIGN_IN_FORM).await? {
            error!(%url, "profile page redirected to the sign-in form");
            return Err(CoreError::NotAuthenticated { url }.into());
        }

        for landmark in [RESUME_HEADER, CONTENT_BOX] {
            if !self
                .page
                .wait_for_element(landmark, self.landmark_timeout)
                .await?
            {
                let current = self.page.current_url().await;
                error!(%url, current_url = %current, landmark, "landmark did not appear");
                return Err(CoreError::ElementNotFound {
                    selector: landmark.to_string(),
                    url,
                }
                .into());
            }
            debug!(landmark, "landmark present");
        }

        let html = self.page.content().await?;
        let scraped = profile_page::scrape_profile(&html);
        info!(
            id,
            skills = scraped.skills.split(", ").filter(|s| !s.is_empty()).count(),
            career_chars = scraped.career_text.chars().count(),
            "profile page scraped"
        );

        let analysis = self.analyzer.analyze_career(&scraped.career_text).await?;

        Ok(ExtractedProfile {
            age: scraped.age,
            ambition: scraped.ambition,
            skills: scraped.skills,
            preferred_location: scraped.preferred_location,
            preferred_salary: scraped.preferred_salary,
            career_summary: analysis.summary,
            recommend_point: analysis.point.map(|point| point.to_string()),
        })
    }
}

/// `<origin>/users/<id>`, with the id encoded as a single path segment.
pub fn profile_url(origin: &str, id: &str) -> anyhow::Result<String> {
    let mut url = Url::parse(origin)?;
    url.path_segments_mut()
        .map_err(|_| anyhow::anyhow!("site origin {origin} cannot carry a path"))?
        .pop_if_empty()
        .push("users")
        .push(id);
    Ok(url.to_string())
}
