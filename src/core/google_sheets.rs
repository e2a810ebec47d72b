use anyhow::Context;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::RwLock;
use tracing::debug;
use url::Url;

use super::auth::ServiceAccountAuth;
use super::errors::CoreError;
use super::row_store::{SheetBackend, SheetSnapshot};

const SHEETS_ENDPOINT: &str = "https://sheets.googleapis.com/v4/spreadsheets";

#[derive(Debug, Deserialize)]
struct SpreadsheetInfoResponse {
    sheets: Option<Vec<SheetEntry>>,
}

#[derive(Debug, Deserialize)]
struct SheetEntry {
    properties: SheetProperties,
}

#[derive(Debug, Deserialize)]
struct SheetProperties {
    title: String,
    #[serde(default)]
    index: i64,
}

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    values: Option<Vec<Vec<String>>>,
}

/// Sheets v4 client bound to one spreadsheet, operating on its first tab.
pub struct GoogleSheetsClient {
    client: Client,
    auth: ServiceAccountAuth,
    spreadsheet_id: String,
    sheet_title: RwLock<Option<String>>,
}

impl GoogleSheetsClient {
    pub fn new(client: Client, auth: ServiceAccountAuth, spreadsheet_id: String) -> Self {
        Self {
            client,
            auth,
            spreadsheet_id,
            sheet_title: RwLock::new(None),
        }
    }

    async fn sheet_title(&self) -> anyhow::Result<String> {
        if let Some(title) = self.sheet_title.read().await.clone() {
            return Ok(title);
        }

        self.load_info().await?;
        self.sheet_title
            .read()
            .await
            .clone()
            .ok_or_else(|| CoreError::SheetNotFound.into())
    }

    fn values_url(&self, range: &str) -> anyhow::Result<Url> {
        let mut url = Url::parse(SHEETS_ENDPOINT)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("invalid Sheets endpoint"))?
            .push(&self.spreadsheet_id)
            .push("values")
            .push(range);
        Ok(url)
    }
}

#[async_trait]
impl SheetBackend for GoogleSheetsClient {
    async fn load_info(&self) -> anyhow::Result<()> {
        let access_token = self.auth.get_access_token().await?;

        let mut url = Url::parse(SHEETS_ENDPOINT)?;
        url.path_segments_mut()
            .map_err(|_| anyhow::anyhow!("invalid Sheets endpoint"))?
            .push(&self.spreadsheet_id);

        let response = self
            .client
            .get(url)
            .bearer_auth(&access_token)
            .query(&[("fields", "sheets.properties(title,index)")])
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(CoreError::GoogleApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let info = serde_json::from_str::<SpreadsheetInfoResponse>(&body)
            .context("failed to parse spreadsheet metadata")?;

        let first = info
            .sheets
            .unwrap_or_default()
            .into_iter()
            .min_by_key(|sheet| sheet.properties.index)
            .ok_or(CoreError::SheetNotFound)?;

        debug!(title = %first.properties.title, "resolved first worksheet");
        *self.sheet_title.write().await = Some(first.properties.title);
        Ok(())
    }

    async fn fetch_rows(&self) -> anyhow::Result<SheetSnapshot> {
        let title = self.sheet_title().await?;
        let access_token = self.auth.get_access_token().await?;
        let url = self.values_url(&quote_sheet_title(&title))?;

        let response = self
            .client
            .get(url)
            .bearer_auth(&access_token)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(CoreError::GoogleApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let payload = serde_json::from_str::<ValuesResponse>(&body)
            .context("failed to parse Google Sheets values response")?;

        Ok(SheetSnapshot::from_values(payload.values.unwrap_or_default()))
    }

    async fn write_row(&self, index: usize, values: &[String]) -> anyhow::Result<()> {
        if values.is_empty() {
            return Ok(());
        }

        let title = self.sheet_title().await?;
        let access_token = self.auth.get_access_token().await?;
        let range = row_range(&title, index, values.len());
        let url = self.values_url(&range)?;

        let payload = json!({
            "range": range,
            "majorDimension": "ROWS",
            "values": [values],
        });

        let response = self
            .client
            .put(url)
            .bearer_auth(&access_token)
            .query(&[("valueInputOption", "USER_ENTERED")])
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(CoreError::GoogleApi {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        Ok(())
    }
}

fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// A1 range covering one data row; row 1 holds the header, so data index 0 is sheet row 2.
fn row_range(title: &str, index: usize, width: usize) -> String {
    let row_number = index + 2;
    format!(
        "{}!A{row_number}:{}{row_number}",
        quote_sheet_title(title),
        column_letter(width.saturating_sub(1))
    )
}

fn column_letter(mut index: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (index % 26) as u8) as char);
        if index < 26 {
            break;
        }
        index = index / 26 - 1;
    }
    letters.iter().rev().collect()
}
