//! Remote time response validation

use chrono::DateTime;
use curfew_util::Hour;
use serde::Deserialize;

use crate::{TimeError, TimeResult};

/// Validated shape of the remote time response.
///
/// Only `datetime` is required; other fields the service sends are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TimeReading {
    pub datetime: String,
}

impl TimeReading {
    /// Parse and validate a raw response body
    pub fn from_json(body: &[u8]) -> TimeResult<Self> {
        serde_json::from_slice(body).map_err(|e| TimeError::validation(e.to_string()))
    }

    /// Hour of day in the offset carried by the datetime string
    pub fn hour(&self) -> TimeResult<Hour> {
        let dt = DateTime::parse_from_rfc3339(&self.datetime).map_err(|e| {
            TimeError::validation(format!("unparseable datetime '{}': {}", self.datetime, e))
        })?;
        Ok(Hour::of(&dt))
    }
}

/// Validate a response body and extract the hour in one step
pub fn hour_from_body(body: &[u8]) -> TimeResult<Hour> {
    TimeReading::from_json(body)?.hour()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_worldtimeapi_body() {
        let body = br#"{
            "abbreviation": "-03",
            "datetime": "2025-06-14T22:59:58.123456-03:00",
            "day_of_week": 6,
            "timezone": "America/Sao_Paulo",
            "unixtime": 1749952798,
            "utc_offset": "-03:00"
        }"#;

        assert_eq!(hour_from_body(body).unwrap().value(), 22);
    }

    #[test]
    fn hour_follows_embedded_offset() {
        let reading = TimeReading {
            datetime: "2025-06-15T01:30:00+00:00".into(),
        };
        assert_eq!(reading.hour().unwrap().value(), 1);

        let reading = TimeReading {
            datetime: "2025-06-15T01:30:00+09:00".into(),
        };
        assert_eq!(reading.hour().unwrap().value(), 1);

        let reading = TimeReading {
            datetime: "2025-06-15T23:05:00Z".into(),
        };
        assert_eq!(reading.hour().unwrap().value(), 23);
    }

    #[test]
    fn rejects_malformed_bodies() {
        let bodies: [&[u8]; 6] = [
            b"",
            b"not json",
            b"{}",
            br#"{"datetime": 1749952798}"#,
            br#"{"date_time": "2025-06-15T01:30:00+00:00"}"#,
            br#"["2025-06-15T01:30:00+00:00"]"#,
        ];

        for body in bodies {
            let err = hour_from_body(body).unwrap_err();
            assert!(
                matches!(err, TimeError::Validation(_)),
                "Expected validation error for {:?}, got {:?}",
                String::from_utf8_lossy(body),
                err
            );
        }
    }

    #[test]
    fn rejects_datetime_without_offset() {
        let invalid = [
            "2025-06-15T01:30:00",
            "2025-06-15",
            "01:30:00+00:00",
            "yesterday",
        ];

        for datetime in invalid {
            let reading = TimeReading {
                datetime: datetime.into(),
            };
            assert!(
                matches!(reading.hour(), Err(TimeError::Validation(_))),
                "Expected '{}' to be rejected",
                datetime
            );
        }
    }
}
