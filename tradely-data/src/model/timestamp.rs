//! Lenient (de)serialisation for backend timestamps.
//!
//! The backend emits pandas-formatted datetimes, ISO dates and RFC 3339 strings
//! depending on the route, so every shape is normalised to `DateTime<Utc>`.
//! Naive values are taken as UTC.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Millis(i64),
    Text(String),
}

/// Parse any supported textual timestamp shape.
pub fn parse(input: &str) -> Option<DateTime<Utc>> {
    let input = input.trim();

    if let Ok(time) = DateTime::parse_from_rfc3339(input) {
        return Some(time.with_timezone(&Utc));
    }

    NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            NaiveDate::parse_from_str(input, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
                .map(|naive| naive.and_utc())
        })
}

pub fn serialize<S>(time: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&time.to_rfc3339())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    match RawTimestamp::deserialize(deserializer)? {
        RawTimestamp::Millis(millis) => DateTime::from_timestamp_millis(millis)
            .ok_or_else(|| D::Error::custom(format!("timestamp out of range: {millis}"))),
        RawTimestamp::Text(text) => {
            parse(&text).ok_or_else(|| D::Error::custom(format!("unrecognised timestamp: {text}")))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_supported_shapes() {
        struct TestCase {
            input: &'static str,
            expected: Option<DateTime<Utc>>,
        }

        let tests = vec![
            TestCase {
                // TC0: RFC 3339 with offset
                input: "2025-07-01T11:30:00+02:00",
                expected: Some(Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap()),
            },
            TestCase {
                // TC1: naive ISO
                input: "2025-07-01T09:30:00",
                expected: Some(Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap()),
            },
            TestCase {
                // TC2: pandas space separated
                input: "2025-07-01 09:30:00",
                expected: Some(Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap()),
            },
            TestCase {
                // TC3: bare date
                input: "2025-07-01",
                expected: Some(Utc.with_ymd_and_hms(2025, 7, 1, 0, 0, 0).unwrap()),
            },
            TestCase {
                // TC4: garbage
                input: "yesterday",
                expected: None,
            },
        ];

        for (index, test) in tests.into_iter().enumerate() {
            let actual = parse(test.input);
            assert_eq!(actual, test.expected, "TC{} failed", index);
        }
    }

    #[test]
    fn test_deserialize_epoch_millis() {
        #[derive(Deserialize)]
        struct Wrapper {
            #[serde(with = "super")]
            at: DateTime<Utc>,
        }

        let wrapper: Wrapper = serde_json::from_str(r#"{"at": 1751362200000}"#).unwrap();
        assert_eq!(wrapper.at, Utc.with_ymd_and_hms(2025, 7, 1, 9, 30, 0).unwrap());

        assert!(serde_json::from_str::<Wrapper>(r#"{"at": "soon"}"#).is_err());
    }
}
