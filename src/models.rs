use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub institution: String,
    // Path to a text file with the extracted transcript pages, form-feed
    // separated. When absent the built-in sample transcript is used.
    pub transcript_file: Option<String>,
    pub output_directory: Option<String>,
    #[serde(default)]
    pub forecast_courses: Vec<ForecastCourse>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            institution: "Trent University".to_string(),
            transcript_file: None,
            output_directory: Some("output".to_string()),
            forecast_courses: Vec::new(),
        }
    }
}

impl Config {
    pub fn load_from_file(file_path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(file_path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save_to_file(&self, file_path: &str) -> anyhow::Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(file_path, content)?;
        Ok(())
    }
}

/// A hypothetical course fed into the GPA forecast.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastCourse {
    pub name: String,
    pub grade: u32,
    pub credits: f64,
}

/// One tokenized transcript line before cleaning. Trailing fields are
/// missing on short rows; the cleaner decides whether that is fatal.
#[derive(Debug, Clone, Default)]
pub struct RawRow {
    pub major: Option<String>,
    pub course: Option<String>,
    pub credits: Option<String>,
    pub grade: Option<String>,
    pub letter_grade: Option<String>,
    pub replaced: Option<String>,
}

/// One completed course as it appears on the transcript.
#[derive(Debug, Clone, PartialEq)]
pub struct CourseRecord {
    pub course_code: String,
    pub course_name: String,
    pub credits: f64,
    pub grade: u32,
    pub letter_grade: Option<String>,
    pub replaced: Option<String>,
    // Position in transcript-appearance order. Assigned once by the
    // cleaner and used as the stable sort key from then on.
    pub sequence_index: usize,
}

#[derive(Debug, Error)]
pub enum ReadError {
    #[error("unknown institution: {0}")]
    UnknownInstitution(String),
    #[error("row {row}: grade present but no credits entry")]
    MalformedRow { row: usize },
    #[error("row {row}: could not read {field} value {value:?}")]
    NumericField {
        field: &'static str,
        value: String,
        row: usize,
    },
}

/// Collapse internal whitespace runs to single spaces and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
