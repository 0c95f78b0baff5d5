//! Colon-separated values accepted by repeatable flags.

use std::str::FromStr;

use guardian_core::Location;

use crate::CliError;

/// `NODE:SEVERITY`, as taken by `--incident` and `--simulate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IncidentSpec {
    pub(crate) location: Location,
    pub(crate) severity: u8,
}

impl IncidentSpec {
    const FORMAT: &'static str = "NODE:SEVERITY";

    pub(crate) fn parse(field: &'static str, value: &str) -> Result<Self, CliError> {
        let invalid = || CliError::InvalidValue {
            field,
            value: value.to_owned(),
            expected: Self::FORMAT,
        };
        let (location, severity) = value.split_once(':').ok_or_else(invalid)?;
        Ok(Self {
            location: number(location).ok_or_else(invalid)?,
            severity: number(severity).ok_or_else(invalid)?,
        })
    }
}

/// `SRC:DST:THRESHOLD`, as taken by `--monitor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MonitorSpec {
    pub(crate) source: Location,
    pub(crate) destination: Location,
    pub(crate) threshold: i64,
}

impl MonitorSpec {
    const FORMAT: &'static str = "SRC:DST:THRESHOLD";

    pub(crate) fn parse(field: &'static str, value: &str) -> Result<Self, CliError> {
        let invalid = || CliError::InvalidValue {
            field,
            value: value.to_owned(),
            expected: Self::FORMAT,
        };
        let mut parts = value.split(':');
        let source = parts.next().and_then(number).ok_or_else(invalid)?;
        let destination = parts.next().and_then(number).ok_or_else(invalid)?;
        let threshold = parts.next().and_then(number).ok_or_else(invalid)?;
        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(Self {
            source,
            destination,
            threshold,
        })
    }
}

fn number<T: FromStr>(raw: &str) -> Option<T> {
    raw.trim().parse().ok()
}
