use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ReportError {
    #[error("no results.csv found under {}", root.display())]
    NoResults { root: PathBuf },
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("unable to decode {} with any known encoding", path.display())]
    Decode { path: PathBuf },
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("row {row}: missing column '{column}'")]
    MissingColumn { row: usize, column: &'static str },
    #[error("row {row}: invalid {field} value '{value}'")]
    InvalidNumber {
        row: usize,
        field: &'static str,
        value: String,
    },
    #[error("failed to parse {lang} text table: {source}")]
    Texts {
        lang: &'static str,
        source: toml::de::Error,
    },
    #[error("failed to serialize report payload: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write report: {0}")]
    Persist(#[from] tempfile::PersistError),
}

impl ReportError {
    /// Process exit code for this error. A run with nothing to report is
    /// distinguished from a failed run.
    pub fn exit_code(&self) -> u8 {
        match self {
            ReportError::NoResults { .. } => 1,
            _ => 2,
        }
    }
}
