//! Failure kinds surfaced by one tracker cycle.
//!
//! Transport, parse and persistence failures are expected at runtime and the
//! driver loop logs them and keeps going. `Io` only shows up at startup,
//! when the replay file or the interval prompt cannot be read.
use std::io;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TrackerError {
    /// Request could not be sent, or the provider answered with a non-2xx status.
    #[error("transport error: {0}")]
    Transport(String),

    /// Provider payload did not match the expected schema.
    #[error("parse error: {0}")]
    Parse(ParseErrorKind),

    /// Snapshot could not be written to disk.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    #[error("body is not valid JSON ({0})")]
    InvalidJson(String),
    #[error("expected a JSON array of markets")]
    NotAnArray,
    #[error("missing field `{0}`")]
    FieldUnavailable(String),
    #[error("field `{0}` has an unexpected format")]
    FieldFormat(String),
}

impl TrackerError {
    pub fn field_unavailable(field: &str) -> Self {
        TrackerError::Parse(ParseErrorKind::FieldUnavailable(field.to_owned()))
    }

    pub fn field_format(field: &str) -> Self {
        TrackerError::Parse(ParseErrorKind::FieldFormat(field.to_owned()))
    }
}

impl From<ureq::Error> for TrackerError {
    fn from(err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(code, resp) => {
                TrackerError::Transport(format!("HTTP {} {} from {}", code, resp.status_text(), resp.get_url()))
            }
            ureq::Error::Transport(transport) => TrackerError::Transport(transport.to_string()),
        }
    }
}

impl From<rust_xlsxwriter::XlsxError> for TrackerError {
    fn from(err: rust_xlsxwriter::XlsxError) -> Self {
        TrackerError::Persistence(err.to_string())
    }
}

impl From<csv::Error> for TrackerError {
    fn from(err: csv::Error) -> Self {
        TrackerError::Persistence(err.to_string())
    }
}

pub type Result<T, E = TrackerError> = std::result::Result<T, E>;
