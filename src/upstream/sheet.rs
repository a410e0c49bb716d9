use super::{UpstreamError, send_for_text};
use crate::config::{SheetConfig, SheetSource};
use crate::ingest::Table;

/// Reads the spreadsheet store, either as a CSV export or through the values API.
#[derive(Clone)]
pub struct SheetClient {
    http: reqwest::Client,
    config: SheetConfig,
}

impl SheetClient {
    pub fn new(http: reqwest::Client, config: SheetConfig) -> Self {
        Self { http, config }
    }

    pub fn is_configured(&self) -> bool {
        self.config.source.is_some()
    }

    pub async fn fetch_table(&self) -> Result<Table, UpstreamError> {
        let source = self
            .config
            .source
            .as_ref()
            .ok_or(UpstreamError::NotConfigured("SHEET_CSV_URL / SHEET_VALUES_URL"))?;

        let url = match source {
            SheetSource::Csv(url) | SheetSource::Values(url) => url,
        };
        let mut request = self.http.get(url.as_str());
        if let Some(key) = &self.config.api_key {
            request = request.query(&[("key", key.as_str())]);
        }

        log::debug!("Fetching spreadsheet rows");
        let text = send_for_text(request).await?;
        match source {
            SheetSource::Csv(_) => Ok(Table::from_csv(&text)),
            SheetSource::Values(_) => {
                let payload: serde_json::Value = serde_json::from_str(&text)?;
                Table::from_values(&payload)
                    .ok_or_else(|| UpstreamError::Decode("missing 'values' array".to_string()))
            }
        }
    }
}
