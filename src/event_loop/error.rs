use thiserror::Error;

/// Problems in the track catalog. Any of these aborts the run before output,
/// since a partial catalog would silently bias selection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("line {line}: expected 4 tab-separated fields (name, race type, area type, id), found {fields}")]
    MalformedRecord { line: usize, fields: usize },
    #[error("line {line}: blank track name with no preceding named track")]
    OrphanContinuation { line: usize },
    #[error("line {line}: track has neither race type nor area type")]
    MissingKind { line: usize },
    #[error("line {line}: blank track id")]
    MissingId { line: usize },
    #[error("line {line}: duplicate track id '{id}'")]
    DuplicateId { line: usize, id: String },
    #[error("line {line}: unreadable record: {message}")]
    Unreadable { line: usize, message: String },
}

/// Invalid tool settings.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SettingsError {
    #[error("{key} must be an integer between 0 and 100 (got '{value}')")]
    InvalidThreshold { key: String, value: String },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
