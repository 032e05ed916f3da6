use crate::survey::*;

use log::debug;
use serde::{Deserialize, Serialize};

pub const DEFAULT_RESPONSES_PATH: &str = "responses.csv";
pub const DEFAULT_SPIN_COUNT: u32 = 20;
pub const DEFAULT_SPIN_DELAY_MS: u64 = 100;

/// Where the responses are kept.
#[derive(Eq, PartialEq, Debug, Clone, Serialize, Deserialize)]
pub struct StoreSource {
    /// `csv` or `sheets`
    pub provider: String,
    #[serde(rename = "filePath")]
    pub file_path: Option<String>,
    #[serde(rename = "spreadsheetId")]
    pub spreadsheet_id: Option<String>,
    #[serde(rename = "sheetName")]
    pub sheet_name: Option<String>,
    #[serde(rename = "accessToken")]
    pub access_token: Option<String>,
    pub endpoint: Option<String>,
}

impl Default for StoreSource {
    fn default() -> Self {
        StoreSource {
            provider: "csv".to_string(),
            file_path: Some(DEFAULT_RESPONSES_PATH.to_string()),
            spreadsheet_id: None,
            sheet_name: None,
            access_token: None,
            endpoint: None,
        }
    }
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawSettings {
    #[serde(rename = "spinCount")]
    pub spin_count: Option<u32>,
    #[serde(rename = "spinDelayMs")]
    pub spin_delay_ms: Option<u64>,
    #[serde(rename = "randomSeed")]
    pub random_seed: Option<u64>,
}

#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct SurveyConfig {
    #[serde(rename = "schemaVersion")]
    pub schema_version: Option<String>,
    #[serde(rename = "surveyUrl")]
    pub survey_url: Option<String>,
    #[serde(default)]
    pub store: StoreSource,
    pub draw: Option<DrawSettings>,
}

impl SurveyConfig {
    pub fn schema(&self) -> SurveyResult<SchemaVersion> {
        match &self.schema_version {
            None => Ok(SchemaVersion::CANONICAL),
            Some(s) => match s.parse::<SchemaVersion>() {
                Ok(x) => Ok(x),
                Err(msg) => whatever!("schemaVersion: {}", msg),
            },
        }
    }

    /// Command line flags take precedence over the file.
    pub fn with_overrides(mut self, responses: Option<String>, schema: Option<String>) -> SurveyConfig {
        if let Some(path) = responses {
            self.store = StoreSource {
                file_path: Some(path),
                ..StoreSource::default()
            };
        }
        if schema.is_some() {
            self.schema_version = schema;
        }
        self
    }
}

pub fn read_config(path: &str) -> SurveyResult<SurveyConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: SurveyConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu {})?;
    debug!("read_config: {:?}", config);
    // Fail early on a bad layout name.
    config.schema()?;
    Ok(config)
}
