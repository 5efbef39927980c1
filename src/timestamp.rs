use chrono::NaiveDateTime;

#[derive(thiserror::Error, Debug)]
pub enum TimestampError {
    #[error(r#"failed to parse "{0}" as a date and time"#)]
    Parse(String),
}
type Result<T> = std::result::Result<T, TimestampError>;

/// Date and time layouts found in the sensor logs, tried in order
///
/// Dates with slashes are read day first, like the comma decimal locale of the iTools exports.
/// This departs from the month first default of pandas `to_datetime` on purpose.
const FORMATS: [&str; 10] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S%.f",
    "%d/%m/%Y %H:%M:%S%.f",
    "%d.%m.%Y %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M",
    "%d/%m/%Y %H:%M",
    "%d.%m.%Y %H:%M",
];

/// Parses a date and time from any of the supported layouts
pub fn parse<S: AsRef<str>>(text: S) -> Result<NaiveDateTime> {
    let text = text.as_ref().trim();
    FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .ok_or_else(|| TimestampError::Parse(text.to_string()))
}

/// Formats a date and time the way camonitor prints it
pub fn format(datetime: &NaiveDateTime) -> String {
    datetime.format("%Y-%m-%d %H:%M:%S%.6f").to_string()
}
