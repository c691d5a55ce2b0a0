// File: ./src/model/adapter.rs
// Handles the PostgREST row format for `star_events`
use crate::model::event::{Child, StarEvent};
use chrono::NaiveDate;
use serde::Serialize;

/// Insert payload: the server fills in `id` and `created_at`.
#[derive(Debug, Clone, Serialize)]
pub struct NewStarEvent {
    pub child: Child,
    pub local_date: NaiveDate,
}

impl NewStarEvent {
    pub fn new(child: Child, local_date: NaiveDate) -> Self {
        Self { child, local_date }
    }

    /// PostgREST bulk-insert body (always an array, here of one row).
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(std::slice::from_ref(self))
    }
}

impl StarEvent {
    /// Parses a PostgREST result set. A `null` body reads as no rows.
    pub fn list_from_json(raw: &[u8]) -> Result<Vec<StarEvent>, serde_json::Error> {
        let rows: Option<Vec<StarEvent>> = serde_json::from_slice(raw)?;
        Ok(rows.unwrap_or_default())
    }

    /// Parses the `return=representation` answer of an insert and keeps the
    /// first row.
    pub fn created_from_json(raw: &[u8]) -> Result<Option<StarEvent>, serde_json::Error> {
        Ok(Self::list_from_json(raw)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_body_is_single_row_array() {
        let row = NewStarEvent::new(Child::B, NaiveDate::from_ymd_opt(2024, 3, 9).unwrap());
        assert_eq!(
            row.to_json().unwrap(),
            r#"[{"child":"b","local_date":"2024-03-09"}]"#
        );
    }

    #[test]
    fn null_body_reads_as_empty() {
        assert!(StarEvent::list_from_json(b"null").unwrap().is_empty());
        assert!(StarEvent::created_from_json(b"[]").unwrap().is_none());
    }
}
