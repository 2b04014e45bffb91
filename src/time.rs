use chrono::prelude::{DateTime, SecondsFormat, Utc};

/// Formats a timestamp as an ISO 8601 string in UTC, to the second.
pub fn iso8601(st: std::time::SystemTime) -> String {
    let dt: DateTime<Utc> = st.into();
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}
