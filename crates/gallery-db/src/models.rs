//! Rust structs mapping to database tables.
//!
//! Each model implements `from_row` for constructing itself from a
//! `rusqlite::Row`.

use chrono::{DateTime, SecondsFormat, Utc};
use gallery_core::{BloggerId, PictureCategory, PictureId};
use serde::Serialize;

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn parse_category(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<PictureCategory> {
    let code: i64 = row.get(idx)?;
    PictureCategory::from_code(code).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            idx,
            rusqlite::types::Type::Integer,
            format!("unknown picture category code {code}").into(),
        )
    })
}

fn parse_timestamp(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|t| t.with_timezone(&Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
}

/// Text form of a timestamp as written to the `uploaded_at` column.
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

// ---------------------------------------------------------------------------
// Picture
// ---------------------------------------------------------------------------

/// A gallery picture record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Picture {
    pub id: PictureId,
    pub owner_id: BloggerId,
    pub category: PictureCategory,
    /// Store-relative location of the backing file.
    pub path: String,
    /// Caption.
    pub bewrite: Option<String>,
    pub title: String,
    pub uploaded_at: DateTime<Utc>,
}

impl Picture {
    pub fn from_row(row: &rusqlite::Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: PictureId::from(row.get::<_, i64>(0)?),
            owner_id: BloggerId::from(row.get::<_, i64>(1)?),
            category: parse_category(row, 2)?,
            path: row.get(3)?,
            bewrite: row.get(4)?,
            title: row.get(5)?,
            uploaded_at: parse_timestamp(row, 6)?,
        })
    }
}

/// Field values for a record that has not been assigned an id yet.
#[derive(Debug, Clone)]
pub struct NewPicture {
    pub owner_id: BloggerId,
    pub category: PictureCategory,
    pub path: String,
    pub bewrite: Option<String>,
    pub title: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use rusqlite::Connection;

    #[test]
    fn timestamp_text_roundtrips() {
        let t = Utc.with_ymd_and_hms(2024, 3, 9, 10, 30, 0).unwrap();
        assert_eq!(format_timestamp(&t), "2024-03-09T10:30:00Z");

        let conn = Connection::open_in_memory().unwrap();
        let back = conn
            .query_row("SELECT ?1", [format_timestamp(&t)], |row| {
                parse_timestamp(row, 0)
            })
            .unwrap();
        assert_eq!(back, t);
    }

    #[test]
    fn unknown_category_code_is_rejected() {
        let conn = Connection::open_in_memory().unwrap();
        let result = conn.query_row("SELECT 42", [], |row| parse_category(row, 0));
        assert!(result.is_err());
    }
}
