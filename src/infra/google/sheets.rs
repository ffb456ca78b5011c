//! Google Sheets v4 `values` endpoints (blocking, no Tokio runtime needed).

use std::time::Duration;

use reqwest::blocking::Response;
use reqwest::Url;
use serde::Deserialize;

use crate::domain::column::row_from_updated_range;
use crate::domain::entities::record::RowId;
use crate::infra::google::auth::TokenProvider;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::{SheetSource, SheetWriter};

const TIMEOUT_SECS: u64 = 30;

pub fn http_client() -> Result<reqwest::blocking::Client, PortError> {
    reqwest::blocking::Client::builder()
        .user_agent(format!("company-sheet/{}", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(TIMEOUT_SECS))
        .build()
        .map_err(|err| PortError::External(format!("failed to build http client: {err}")))
}

#[derive(Debug, Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendResponse {
    updates: Option<AppendUpdates>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppendUpdates {
    updated_range: Option<String>,
}

pub struct GoogleSheetsClient {
    http: reqwest::blocking::Client,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    auth: TokenProvider,
}

impl GoogleSheetsClient {
    pub fn new(
        http: reqwest::blocking::Client,
        api_base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
        auth: TokenProvider,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
            auth,
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{range}` with every segment escaped.
    fn values_url(&self, range: &str) -> Result<Url, PortError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(PortError::ConfigurationMissing(
                "SHEET_ID is not set".to_string(),
            ));
        }
        let mut url = Url::parse(&self.api_base)
            .map_err(|err| PortError::InvalidInput(format!("invalid sheets api base: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| PortError::InvalidInput("sheets api base cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", self.spreadsheet_id.as_str(), "values", range]);
        Ok(url)
    }

    fn send(&self, request: reqwest::blocking::RequestBuilder) -> Result<Response, PortError> {
        let token = self.auth.access_token()?;
        let resp = request
            .bearer_auth(token)
            .send()
            .map_err(|err| PortError::External(format!("network error: {err}")))?;
        if resp.status().is_success() {
            return Ok(resp);
        }
        let status = resp.status().as_u16();
        let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
        let message = body["error"]["message"]
            .as_str()
            .unwrap_or("unknown error")
            .to_string();
        log::warn!("sheets api returned {status}: {message}");
        if message.contains("Unable to parse range") {
            return Err(PortError::External(format!(
                "Could not find sheet named \"{}\". Check the sheet name and spreadsheet.",
                self.sheet_name
            )));
        }
        Err(PortError::External(format!("HTTP {status}: {message}")))
    }
}

fn cell_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

impl SheetSource for GoogleSheetsClient {
    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>, PortError> {
        let url = self.values_url(&self.sheet_name)?;
        log::debug!("GET {url}");
        let resp = self.send(self.http.get(url))?;
        let range: ValueRange = resp
            .json()
            .map_err(|err| PortError::Parse(format!("sheet values: {err}")))?;
        Ok(range
            .values
            .iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect())
    }
}

impl SheetWriter for GoogleSheetsClient {
    fn write_cell(&self, address: &str, value: &str) -> Result<(), PortError> {
        let mut url = self.values_url(address)?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED");
        log::debug!("PUT {address}");
        let body = serde_json::json!({
            "range": address,
            "majorDimension": "ROWS",
            "values": [[value]],
        });
        self.send(self.http.put(url).json(&body))?;
        Ok(())
    }

    fn append_row(&self, row: &[String]) -> Result<RowId, PortError> {
        let mut url = self.values_url(&format!("{}!A1:append", self.sheet_name))?;
        url.query_pairs_mut()
            .append_pair("valueInputOption", "USER_ENTERED")
            .append_pair("insertDataOption", "INSERT_ROWS");
        log::debug!("POST append to {}", self.sheet_name);
        let body = serde_json::json!({ "values": [row] });
        let resp = self.send(self.http.post(url).json(&body))?;

        let appended: AppendResponse = resp
            .json()
            .map_err(|err| PortError::Parse(format!("append response: {err}")))?;
        let range = appended
            .updates
            .and_then(|updates| updates.updated_range)
            .ok_or_else(|| {
                PortError::Parse("could not determine the new row after appending".to_string())
            })?;
        row_from_updated_range(&range)
            .ok_or_else(|| PortError::Parse(format!("could not read row number from {range:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::google::auth::GoogleCredentials;
    use httpmock::prelude::*;

    fn client(server: &MockServer, credentials: Option<GoogleCredentials>) -> GoogleSheetsClient {
        let http = reqwest::blocking::Client::new();
        let auth = TokenProvider::new(http.clone(), server.url("/token"), credentials);
        GoogleSheetsClient::new(http, server.base_url(), "sid", "Companies", auth)
    }

    fn token() -> Option<GoogleCredentials> {
        Some(GoogleCredentials::AccessToken("tok".into()))
    }

    #[test]
    fn read_rows_returns_all_values_as_text() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/v4/spreadsheets/sid/values/Companies")
                .header("Authorization", "Bearer tok");
            then.status(200).json_body(serde_json::json!({
                "range": "Companies!A1:Z1000",
                "majorDimension": "ROWS",
                "values": [["Company Name", "# Employees"], ["Acme", 42], []]
            }));
        });

        let rows = client(&server, token()).read_rows().expect("read should succeed");

        assert_eq!(
            rows,
            vec![
                vec!["Company Name".to_string(), "# Employees".to_string()],
                vec!["Acme".to_string(), "42".to_string()],
                Vec::new(),
            ]
        );
    }

    #[test]
    fn read_rows_of_empty_sheet_is_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sid/values/Companies");
            then.status(200)
                .json_body(serde_json::json!({ "range": "Companies!A1:Z1000" }));
        });

        let rows = client(&server, token()).read_rows().expect("read should succeed");

        assert!(rows.is_empty());
    }

    #[test]
    fn unknown_sheet_gets_friendly_message() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/v4/spreadsheets/sid/values/Companies");
            then.status(400).json_body(serde_json::json!({
                "error": { "code": 400, "message": "Unable to parse range: Companies" }
            }));
        });

        let err = client(&server, token())
            .read_rows()
            .expect_err("read should fail");

        assert!(err.to_string().contains("Could not find sheet named \"Companies\""));
    }

    #[test]
    fn write_cell_puts_single_value() {
        let server = MockServer::start();
        let put = server.mock(|when, then| {
            when.method(PUT)
                .path("/v4/spreadsheets/sid/values/Companies!C2")
                .query_param("valueInputOption", "USER_ENTERED")
                .header("Authorization", "Bearer tok")
                .json_body(serde_json::json!({
                    "range": "Companies!C2",
                    "majorDimension": "ROWS",
                    "values": [["https://acme.example"]]
                }));
            then.status(200).json_body(serde_json::json!({ "updatedCells": 1 }));
        });

        client(&server, token())
            .write_cell("Companies!C2", "https://acme.example")
            .expect("write should succeed");

        put.assert();
    }

    #[test]
    fn write_without_credentials_is_fatal_and_sends_nothing() {
        let server = MockServer::start();
        let put = server.mock(|when, then| {
            when.method(PUT);
            then.status(200);
        });

        let err = client(&server, None)
            .write_cell("Companies!C2", "x")
            .expect_err("write should fail");

        assert!(err.is_fatal());
        put.assert_calls(0);
    }

    #[test]
    fn append_row_reads_row_from_updated_range() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/v4/spreadsheets/sid/values/Companies!A1:append")
                .query_param("valueInputOption", "USER_ENTERED")
                .query_param("insertDataOption", "INSERT_ROWS")
                .json_body(serde_json::json!({ "values": [["Initech", "", "Lending"]] }));
            then.status(200).json_body(serde_json::json!({
                "spreadsheetId": "sid",
                "updates": { "updatedRange": "Companies!A82:C82", "updatedRows": 1 }
            }));
        });

        let row = client(&server, token())
            .append_row(&["Initech".into(), String::new(), "Lending".into()])
            .expect("append should succeed");

        assert_eq!(row, RowId(82));
    }

    #[test]
    fn missing_spreadsheet_id_is_configuration_error() {
        let server = MockServer::start();
        let http = reqwest::blocking::Client::new();
        let auth = TokenProvider::new(http.clone(), server.url("/token"), token());
        let sheets = GoogleSheetsClient::new(http, server.base_url(), " ", "Companies", auth);

        let err = sheets.read_rows().expect_err("read should fail");

        assert!(err.is_fatal());
    }
}
