use std::sync::Arc;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use super::errors::CoreError;
use super::models::{RowMatch, RowUpdate, WorkItem, WorkStatus};

const LAST_UPDATED_COLUMN: &str = "lastUpdated";

/// Header row plus data rows of one worksheet, every row padded to the header width.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SheetSnapshot {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl SheetSnapshot {
    pub fn from_values(values: Vec<Vec<String>>) -> Self {
        let mut values = values.into_iter();
        let headers: Vec<String> = values
            .next()
            .unwrap_or_default()
            .into_iter()
            .map(|h| h.trim().to_string())
            .collect();

        let rows = values
            .map(|mut row| {
                if row.len() < headers.len() {
                    row.resize(headers.len(), String::new());
                }
                row
            })
            .collect();

        Self { headers, rows }
    }

    pub fn column(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn item(&self, index: usize) -> anyhow::Result<WorkItem> {
        let row = self.rows.get(index).ok_or(CoreError::RowIndexOutOfRange {
            index,
            len: self.rows.len(),
        })?;

        let mut fields = Map::new();
        for (header, cell) in self.headers.iter().zip(row.iter()) {
            if header.is_empty() || cell.is_empty() || fields.contains_key(header) {
                continue;
            }
            fields.insert(header.clone(), Value::String(cell.clone()));
        }

        serde_json::from_value::<WorkItem>(Value::Object(fields))
            .with_context(|| format!("row {index} does not match the work item layout"))
    }
}

/// Storage behind the row store. Rows are addressed by 0-based data index (header excluded).
#[async_trait]
pub trait SheetBackend: Send + Sync {
    async fn load_info(&self) -> anyhow::Result<()>;

    async fn fetch_rows(&self) -> anyhow::Result<SheetSnapshot>;

    async fn write_row(&self, index: usize, values: &[String]) -> anyhow::Result<()>;
}

/// Work-queue view of the first worksheet. Every call re-reads the sheet.
#[derive(Clone)]
pub struct RowStore {
    backend: Arc<dyn SheetBackend>,
}

impl RowStore {
    pub fn new(backend: Arc<dyn SheetBackend>) -> Self {
        Self { backend }
    }

    pub async fn init(&self) -> anyhow::Result<()> {
        self.backend
            .load_info()
            .await
            .context("Spreadsheet initialization failed")
    }

    pub async fn list_pending_ids(&self) -> anyhow::Result<Vec<String>> {
        let snapshot = self.backend.fetch_rows().await?;
        let mut ids = Vec::new();

        for index in 0..snapshot.rows.len() {
            let item = snapshot.item(index)?;
            if !item.id.is_empty() && item.is_pending() {
                ids.push(item.id);
            }
        }

        Ok(ids)
    }

    pub async fn find_by_id(&self, id: &str) -> anyhow::Result<Option<RowMatch>> {
        if id.is_empty() {
            return Ok(None);
        }

        let snapshot = self.backend.fetch_rows().await?;
        for index in 0..snapshot.rows.len() {
            let data = snapshot.item(index)?;
            if data.id == id {
                return Ok(Some(RowMatch { index, data }));
            }
        }

        Ok(None)
    }

    pub async fn update_row(&self, index: usize, update: &RowUpdate) -> anyhow::Result<()> {
        let snapshot = self.backend.fetch_rows().await?;
        if index >= snapshot.rows.len() {
            return Err(CoreError::RowIndexOutOfRange {
                index,
                len: snapshot.rows.len(),
            }
            .into());
        }

        let current = snapshot.item(index)?;
        let mut row = snapshot.rows[index].clone();

        let mut fields = match serde_json::to_value(update)? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        fields.insert(
            LAST_UPDATED_COLUMN.to_string(),
            Value::String(next_timestamp(current.last_updated.as_deref(), Utc::now())),
        );

        for (key, value) in fields {
            let Some(column) = snapshot.column(&key) else {
                warn!(column = %key, index, "sheet has no such column; value not written");
                continue;
            };
            row[column] = match value {
                Value::String(text) => text,
                other => other.to_string(),
            };
        }

        debug!(index, "writing row");
        self.backend.write_row(index, &row).await
    }

    pub async fn update_status(&self, index: usize, status: WorkStatus) -> anyhow::Result<()> {
        self.update_row(index, &RowUpdate::status(status)).await
    }
}

/// Millisecond RFC 3339 stamp that always sorts after `previous`.
pub fn next_timestamp(previous: Option<&str>, now: DateTime<Utc>) -> String {
    let now = now.trunc_subsecs(3);
    let previous = previous
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|stamp| stamp.with_timezone(&Utc).trunc_subsecs(3));

    let stamp = match previous {
        Some(prev) if now <= prev => prev + chrono::Duration::milliseconds(1),
        _ => now,
    };

    stamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}
