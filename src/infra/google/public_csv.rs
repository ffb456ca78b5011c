use reqwest::Url;

use crate::infra::import::csv::parse_csv_text;
use crate::usecase::ports::error::PortError;
use crate::usecase::ports::sheet::SheetSource;

/// Unauthenticated read through the sheet's public CSV export. Only works
/// for sheets shared with "Anyone with the link".
pub struct PublicCsvSheet {
    http: reqwest::blocking::Client,
    base: String,
    spreadsheet_id: String,
    sheet_name: String,
}

impl PublicCsvSheet {
    pub fn new(
        http: reqwest::blocking::Client,
        base: impl Into<String>,
        spreadsheet_id: impl Into<String>,
        sheet_name: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base: base.into(),
            spreadsheet_id: spreadsheet_id.into(),
            sheet_name: sheet_name.into(),
        }
    }

    fn export_url(&self) -> Result<Url, PortError> {
        if self.spreadsheet_id.trim().is_empty() {
            return Err(PortError::ConfigurationMissing(
                "SHEET_ID is not set".to_string(),
            ));
        }
        let mut url = Url::parse(&self.base)
            .map_err(|err| PortError::InvalidInput(format!("invalid export base: {err}")))?;
        url.path_segments_mut()
            .map_err(|_| PortError::InvalidInput("export base cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["spreadsheets", "d", self.spreadsheet_id.as_str(), "gviz", "tq"]);
        url.query_pairs_mut()
            .append_pair("tqx", "out:csv")
            .append_pair("sheet", &self.sheet_name);
        Ok(url)
    }
}

impl SheetSource for PublicCsvSheet {
    fn sheet_name(&self) -> &str {
        &self.sheet_name
    }

    fn read_rows(&self) -> Result<Vec<Vec<String>>, PortError> {
        let url = self.export_url()?;
        log::debug!("GET {url}");
        let unreachable = || {
            PortError::External(
                "Could not load data from the public Google Sheet. Make sure it is shared with \
                 'Anyone with the link'."
                    .to_string(),
            )
        };
        let resp = self.http.get(url).send().map_err(|err| {
            log::warn!("public sheet request failed: {err}");
            unreachable()
        })?;
        if !resp.status().is_success() {
            log::warn!("public sheet export returned {}", resp.status().as_u16());
            return Err(unreachable());
        }
        let text = resp
            .text()
            .map_err(|err| PortError::Parse(format!("public sheet body: {err}")))?;
        Ok(parse_csv_text(&text))
    }
}
