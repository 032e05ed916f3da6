// The remote store: a Google Sheets spreadsheet, through the REST API (v4).

use reqwest::blocking::{Client, Response as HttpResponse};
use reqwest::Url;
use serde_json::json;
use serde_json::Value as JSValue;

use crate::survey::{io_common::rows_to_responses, *};

pub const DEFAULT_ENDPOINT: &str = "https://sheets.googleapis.com";

/// Environment variable holding the access token, when it is not in the configuration.
pub const ACCESS_TOKEN_ENV: &str = "SURVEY_SHEETS_TOKEN";

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct SheetsSettings {
    pub endpoint: String,
    pub spreadsheet_id: String,
    /// The first sheet of the spreadsheet when not provided.
    pub sheet_name: Option<String>,
    /// Obtained out-of-band, sent as a bearer token.
    pub access_token: String,
}

/// The payload of the `values` endpoints.
#[derive(PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct ValueRange {
    pub range: Option<String>,
    #[serde(rename = "majorDimension")]
    pub major_dimension: Option<String>,
    #[serde(default)]
    pub values: Vec<Vec<JSValue>>,
}

pub struct SheetsResponseStore {
    client: Client,
    settings: SheetsSettings,
    schema: SchemaVersion,
}

impl SheetsResponseStore {
    pub fn new(settings: SheetsSettings, schema: SchemaVersion) -> SheetsResponseStore {
        SheetsResponseStore {
            client: Client::new(),
            settings,
            schema,
        }
    }

    /// The A1 notation of the columns of the layout, for example `'Antwoorden'!A:H`.
    pub fn range(&self) -> String {
        a1_range(self.settings.sheet_name.as_deref(), self.schema)
    }

    fn values_url(&self, suffix: &str) -> SurveyResult<Url> {
        let endpoint = &self.settings.endpoint;
        let mut url = Url::parse(endpoint)
            .ok()
            .context(SheetsEndpointSnafu { endpoint })?;
        let range = format!("{}{}", self.range(), suffix);
        let segments = [
            "v4",
            "spreadsheets",
            self.settings.spreadsheet_id.as_str(),
            "values",
            range.as_str(),
        ];
        url.path_segments_mut()
            .ok()
            .context(SheetsEndpointSnafu { endpoint })?
            .pop_if_empty()
            .extend(segments.iter());
        Ok(url)
    }

    /// Reads the full range. No caching: other sessions write to the same sheet.
    pub fn fetch_values(&self) -> SurveyResult<ValueRange> {
        let url = self.values_url("")?;
        debug!("fetch_values: GET {}", url);
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.settings.access_token)
            .send()
            .context(SheetsRequestSnafu {})?;
        let resp = check_status(resp)?;
        resp.json::<ValueRange>().context(SheetsRequestSnafu {})
    }

    pub fn read_responses(&self) -> SurveyResult<Vec<Response>> {
        let vr = self.fetch_values()?;
        info!(
            "read_responses: {} rows in {:?}",
            vr.values.len(),
            vr.range
        );
        parse_value_range(self.schema, &vr, &self.settings.spreadsheet_id)
    }

    /// Appends one row after the last row of the range.
    ///
    /// The call is not idempotent: retrying it after a failure may add the row twice.
    pub fn append_row(&self, response: &Response) -> SurveyResult<()> {
        let url = self.values_url(":append")?;
        debug!("append_row: POST {}", url);
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.settings.access_token)
            .query(&[
                // Keeps the cells as text: phone numbers keep their leading zeros.
                ("valueInputOption", "RAW"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .json(&append_body(self.schema, response))
            .send()
            .context(SheetsRequestSnafu {})?;
        check_status(resp)?;
        Ok(())
    }
}

impl ResponseStore for SheetsResponseStore {
    fn list_all(&self) -> Result<Vec<Response>, StorageError> {
        self.read_responses().map_err(StorageError::new)
    }

    fn append(&mut self, response: &Response) -> Result<(), StorageError> {
        self.append_row(response).map_err(StorageError::new)
    }
}

fn check_status(resp: HttpResponse) -> SurveyResult<HttpResponse> {
    let status = resp.status();
    if status.is_success() {
        Ok(resp)
    } else {
        let body = resp.text().unwrap_or_default();
        warn!("check_status: spreadsheet service answered {}", status);
        SheetsStatusSnafu {
            status: status.as_u16(),
            body,
        }
        .fail()
    }
}

fn a1_range(sheet_name: Option<&str>, schema: SchemaVersion) -> String {
    match sheet_name {
        Some(name) => format!("'{}'!{}", name.replace('\'', "''"), schema.column_range()),
        None => schema.column_range().to_string(),
    }
}

fn cell_to_string(cell: &JSValue) -> String {
    match cell {
        JSValue::String(s) => s.clone(),
        JSValue::Null => String::new(),
        x => x.to_string(),
    }
}

pub fn parse_value_range(
    schema: SchemaVersion,
    vr: &ValueRange,
    source: &str,
) -> SurveyResult<Vec<Response>> {
    let rows: Vec<Vec<String>> = vr
        .values
        .iter()
        .map(|row| row.iter().map(cell_to_string).collect())
        .collect();
    rows_to_responses(schema, rows, source)
}

pub fn append_body(schema: SchemaVersion, response: &Response) -> JSValue {
    json!({
        "majorDimension": "ROWS",
        "values": [response.to_row(schema)],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(sheet_name: Option<&str>) -> SheetsResponseStore {
        SheetsResponseStore::new(
            SheetsSettings {
                endpoint: DEFAULT_ENDPOINT.to_string(),
                spreadsheet_id: "1AbC".to_string(),
                sheet_name: sheet_name.map(|s| s.to_string()),
                access_token: "token".to_string(),
            },
            SchemaVersion::V2,
        )
    }

    #[test]
    fn ranges() {
        assert_eq!(a1_range(None, SchemaVersion::V1), "A:G");
        assert_eq!(a1_range(Some("Antwoorden"), SchemaVersion::V2), "'Antwoorden'!A:H");
        assert_eq!(a1_range(Some("Sari's"), SchemaVersion::V2), "'Sari''s'!A:H");
    }

    #[test]
    fn urls() {
        let s = store(Some("Antwoorden"));
        let read = s.values_url("").unwrap();
        assert_eq!(read.host_str(), Some("sheets.googleapis.com"));
        assert!(read.path().starts_with("/v4/spreadsheets/1AbC/values/"));
        assert!(read.path().ends_with("!A:H"));

        let append = s.values_url(":append").unwrap();
        assert!(append.path().ends_with("!A:H:append"));

        let bad = SheetsResponseStore::new(
            SheetsSettings {
                endpoint: "not a url".to_string(),
                ..s.settings.clone()
            },
            SchemaVersion::V2,
        );
        assert!(matches!(
            bad.values_url(""),
            Err(SurveyError::SheetsEndpoint { .. })
        ));
    }

    #[test]
    fn parse_api_payload() {
        // Trailing empty cells are not returned by the API.
        let js = r#"{
            "range": "'Antwoorden'!A1:H3",
            "majorDimension": "ROWS",
            "values": [
                ["workshops", "massage_oil_rating", "muscle_spray_rating", "future_interests", "name", "email", "whatsapp", "feedback"],
                ["Klepon maken, Pitjit massage", "5", "4", "Workshop Jamu maken", "Sari", "sari@example.com", "0612345678", "Mooi"],
                ["", 3, 3, "", "Budi", "budi@example.com", "0687654321"]
            ]
        }"#;
        let vr: ValueRange = serde_json::from_str(js).unwrap();
        let res = parse_value_range(SchemaVersion::V2, &vr, "1AbC").unwrap();
        assert_eq!(res.len(), 2);
        assert_eq!(
            res[0].workshops_attended,
            vec![Workshop::KleponMaken, Workshop::PitjitMassage]
        );
        assert_eq!(res[0].feedback.as_deref(), Some("Mooi"));
        assert_eq!(res[1].massage_oil_rating.value(), 3);
        assert_eq!(res[1].feedback, None);
    }

    #[test]
    fn empty_sheet() {
        let vr: ValueRange = serde_json::from_str(r#"{"range": "A1:H1000"}"#).unwrap();
        assert!(parse_value_range(SchemaVersion::V2, &vr, "1AbC")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn unknown_label_in_sheet() {
        let vr = ValueRange {
            range: None,
            major_dimension: None,
            values: vec![vec![json!("Breien"), json!("3"), json!("3"), json!(""), json!("a@example.com"), json!("1")]],
        };
        assert!(matches!(
            parse_value_range(SchemaVersion::V1, &vr, "1AbC"),
            Err(SurveyError::MalformedRow { lineno: 1, .. })
        ));
    }

    #[test]
    fn append_payload() {
        let response = Response {
            workshops_attended: vec![Workshop::Spectator],
            massage_oil_rating: Rating::DEFAULT,
            muscle_spray_rating: Rating::new(1).unwrap(),
            future_interests: vec![],
            name: Some("Wim".to_string()),
            email: "wim@example.com".to_string(),
            whatsapp: "0611111111".to_string(),
            feedback: None,
        };
        let body = append_body(SchemaVersion::V2, &response);
        assert_eq!(
            body,
            json!({
                "majorDimension": "ROWS",
                "values": [["Geen van beide, ik was toeschouwer", "3", "1", "", "Wim", "wim@example.com", "0611111111", ""]]
            })
        );
    }
}
