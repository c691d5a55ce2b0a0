// File: ./src/model/event.rs
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Which of the two children a star belongs to.
///
/// Persisted as lowercase text (`"a"` / `"b"`) in both backends. Display names
/// live in the config, not in the data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Child {
    A,
    B,
}

impl Child {
    pub const ALL: [Child; 2] = [Child::A, Child::B];

    pub fn as_str(&self) -> &'static str {
        match self {
            Child::A => "a",
            Child::B => "b",
        }
    }

    /// Stable slot for per-child arrays.
    pub fn index(&self) -> usize {
        match self {
            Child::A => 0,
            Child::B => 1,
        }
    }
}

impl fmt::Display for Child {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One star awarded to a child on a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StarEvent {
    pub id: i64,
    pub child: Child,
    /// Civil date in the household timezone, `YYYY-MM-DD` on the wire.
    pub local_date: NaiveDate,
    /// A plain `timestamp` column comes back without an offset; it is read as UTC.
    #[serde(deserialize_with = "created_at_utc")]
    pub created_at: DateTime<Utc>,
}

fn created_at_utc<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(stamp) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(stamp.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S%.f"))
        .map(|naive| naive.and_utc())
        .map_err(|e| de::Error::custom(format!("invalid created_at `{raw}`: {e}")))
}

impl StarEvent {
    pub fn is_for(&self, child: Child, date: NaiveDate) -> bool {
        self.child == child && self.local_date == date
    }
}

/// Which backend the store settled on during startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionMode {
    #[default]
    Initializing,
    Remote,
    Local,
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionMode::Initializing => f.write_str("initializing"),
            ConnectionMode::Remote => f.write_str("remote"),
            ConnectionMode::Local => f.write_str("local"),
        }
    }
}

/// The backend that actually served one store operation.
///
/// In remote mode a failed call is retried locally, so this can differ from
/// the store's `ConnectionMode`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Remote,
    Local,
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Backend::Remote => f.write_str("remote"),
            Backend::Local => f.write_str("local"),
        }
    }
}
