use std::time::Duration;

use async_trait::async_trait;
use primitives::{util::ApiUrl, A1Range, SheetId, TabId, TabSpec, ValueRange};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use url::Url;

use super::{ensure_success, json_response};
use crate::{Error, Rows, Spreadsheets, TabIds};

/// The header row tint of styled tabs.
const HEADER_BACKGROUND: (f64, f64, f64) = (1.0, 0.95, 0.75);

#[derive(Debug, Deserialize)]
struct ValuesResponse {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SpreadsheetResponse {
    #[serde(default)]
    spreadsheet_id: Option<String>,
    #[serde(default)]
    sheets: Vec<TabResponse>,
}

#[derive(Debug, Deserialize)]
struct TabResponse {
    properties: TabProperties,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TabProperties {
    sheet_id: TabId,
    title: String,
}

impl SpreadsheetResponse {
    fn tab_ids(self) -> TabIds {
        self.sheets
            .into_iter()
            .map(|tab| (tab.properties.title, tab.properties.sheet_id))
            .collect()
    }
}

/// Sheets reads return formatted strings, but numbers & booleans are accepted too.
fn cell_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Google Sheets v4 client authorized with an OAuth access token.
/// It's cheap to clone.
#[derive(Debug, Clone)]
pub struct GoogleSheets {
    api_url: ApiUrl,
    client: Client,
    access_token: String,
}

impl GoogleSheets {
    /// `timeout` applies to every request.
    pub fn new(
        api_url: ApiUrl,
        access_token: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(Error::request)?;

        Ok(Self {
            api_url,
            client,
            access_token: access_token.into(),
        })
    }

    fn spreadsheet_url(&self, sheet_id: &SheetId, rest: &[&str]) -> Url {
        self.api_url.segments(
            ["spreadsheets", sheet_id.as_str()]
                .into_iter()
                .chain(rest.iter().copied()),
        )
    }

    /// `POST spreadsheets/{id}:batchUpdate`
    async fn batch_update(&self, sheet_id: &SheetId, requests: Vec<Value>) -> Result<(), Error> {
        let endpoint = format!("{}:batchUpdate", sheet_id);
        let url = self.api_url.segments(["spreadsheets", endpoint.as_str()]);

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&json!({ "requests": requests }))
            .send()
            .await
            .map_err(Error::request)?;

        ensure_success(response).await.map(|_| ())
    }
}

#[async_trait]
impl Spreadsheets for GoogleSheets {
    async fn read_range(&self, sheet_id: &SheetId, range: &A1Range) -> Result<Rows, Error> {
        let range = range.to_string();
        let url = self.spreadsheet_url(sheet_id, &["values", range.as_str()]);

        let response = self
            .client
            .get(url)
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(Error::request)?;

        let values = json_response::<ValuesResponse>(response).await?.values;

        Ok(values
            .into_iter()
            .map(|row| row.into_iter().map(cell_text).collect())
            .collect())
    }

    async fn write_ranges(&self, sheet_id: &SheetId, data: Vec<ValueRange>) -> Result<(), Error> {
        if data.is_empty() {
            return Ok(());
        }

        let url = self.spreadsheet_url(sheet_id, &["values:batchUpdate"]);
        let body = json!({
            "valueInputOption": "RAW",
            "data": data,
        });

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.access_token)
            .json(&body)
            .send()
            .await
            .map_err(Error::request)?;

        ensure_success(response).await.map(|_| ())
    }

    async fn delete_row(&self, sheet_id: &SheetId, tab_id: TabId, row: u32) -> Result<(), Error> {
        if row == 0 {
            return Err(Error::invalid_range(format!("Row {} of tab {}", row, tab_id)));
        }

        // the dimension range is 0-based & end exclusive
        let request = json!({
            "deleteDimension": {
                "range": {
                    "sheetId": tab_id,
                    "dimension": "ROWS",
                    "startIndex": row - 1,
                    "endIndex": row,
                }
            }
        });

        self.batch_update(sheet_id, vec![request]).await
    }

    async fn tab_ids(&self, sheet_id: &SheetId) -> Result<TabIds, Error> {
        let url = self.spreadsheet_url(sheet_id, &[]);

        let response = self
            .client
            .get(url)
            .query(&[("fields", "sheets.properties(sheetId,title)")])
            .bearer_auth(&self.access_token)
            .send()
            .await
            .map_err(Error::request)?;

        Ok(json_response::<SpreadsheetResponse>(response)
            .await?
            .tab_ids())
    }

    async fn create_document(&self, title: &str, tabs: &[TabSpec]) -> Result<SheetId, Error> {
        let sheets: Vec<Value> = tabs
            .iter()
            .map(|tab| {
                let mut properties = json!({ "title": tab.title });
                if tab.frozen_header {
                    properties["gridProperties"] = json!({ "frozenRowCount": 1 });
                }

                json!({ "properties": properties })
            })
            .collect();

        let response = self
            .client
            .post(self.api_url.segments(["spreadsheets"]))
            .bearer_auth(&self.access_token)
            .json(&json!({
                "properties": { "title": title },
                "sheets": sheets,
            }))
            .send()
            .await
            .map_err(Error::request)?;

        let mut created = json_response::<SpreadsheetResponse>(response).await?;
        let sheet_id = created
            .spreadsheet_id
            .take()
            .map(SheetId::from)
            .ok_or_else(|| Error::request("Created spreadsheet has no id"))?;
        let tab_ids = created.tab_ids();

        let headers = tabs.iter().filter_map(TabSpec::header_values).collect();
        self.write_ranges(&sheet_id, headers).await?;

        let (red, green, blue) = HEADER_BACKGROUND;
        let styling = tabs
            .iter()
            .filter(|tab| tab.styled_header)
            .map(|tab| {
                let tab_id = tab_ids
                    .get(&tab.title)
                    .copied()
                    .ok_or_else(|| Error::tab_not_found(&tab.title))?;

                Ok(json!({
                    "repeatCell": {
                        "range": { "sheetId": tab_id, "startRowIndex": 0, "endRowIndex": 1 },
                        "cell": {
                            "userEnteredFormat": {
                                "backgroundColor": { "red": red, "green": green, "blue": blue },
                                "textFormat": { "bold": true },
                            }
                        },
                        "fields": "userEnteredFormat(backgroundColor,textFormat)",
                    }
                }))
            })
            .collect::<Result<Vec<_>, Error>>()?;

        if !styling.is_empty() {
            self.batch_update(&sheet_id, styling).await?;
        }

        Ok(sheet_id)
    }
}
