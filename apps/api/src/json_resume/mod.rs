// JSON Resume interoperability: backup/restore of the builder document in the
// open jsonresume.org schema, plus the URL helpers the conversion relies on.

pub mod convert;
pub mod handlers;
pub mod schema;
pub mod url;

use thiserror::Error;

use crate::json_resume::schema::JsonResume;
use crate::models::resume::ResumeData;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid JSON Resume file: {0}")]
    InvalidJson(String),

    #[error("JSON Resume file is empty")]
    Empty,
}

/// Parses an uploaded JSON Resume file into a builder document.
pub fn parse_import(bytes: &[u8]) -> Result<ResumeData, ImportError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(ImportError::Empty);
    }

    let resume: JsonResume =
        serde_json::from_slice(bytes).map_err(|e| ImportError::InvalidJson(e.to_string()))?;

    Ok(convert::import(resume))
}
