//! Row mapping helpers for record implementors
//!
//! Joined relation columns are projected as `<relation path>__<column>` and are only
//! present when the relation was joined, so mappers read them through
//! [`related_column`], which treats a missing column like a NULL.

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{Decode, FromRow, Row, Sqlite, Type};

use crate::schema::{Record, projection_alias};

/// A record the relational backend can materialize from SQLite rows
pub trait SqlRecord: Record + for<'r> FromRow<'r, SqliteRow> + Send + Unpin {}

impl<T> SqlRecord for T where T: Record + for<'r> FromRow<'r, SqliteRow> + Send + Unpin {}

/// Read a nullable column, mapping an absent column to `None`
pub fn optional_column<'r, T>(row: &'r SqliteRow, name: &str) -> sqlx::Result<Option<T>>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    match row.try_get::<Option<T>, _>(name) {
        Ok(value) => Ok(value),
        Err(sqlx::Error::ColumnNotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}

/// Read a column of a joined relation by relation path (`currency.issuer`)
pub fn related_column<'r, T>(
    row: &'r SqliteRow,
    relation_path: &str,
    column: &str,
) -> sqlx::Result<Option<T>>
where
    T: Decode<'r, Sqlite> + Type<Sqlite>,
{
    optional_column(row, &projection_alias(relation_path, column))
}

/// Convert stored epoch microseconds to a UTC timestamp
pub fn micros_to_datetime(micros: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp_micros(micros)
}

/// Convert stored microseconds since midnight to a time of day
pub fn micros_to_time(micros: i64) -> Option<NaiveTime> {
    let secs = u32::try_from(micros.div_euclid(1_000_000)).ok()?;
    let nanos = u32::try_from(micros.rem_euclid(1_000_000) * 1_000).ok()?;
    NaiveTime::from_num_seconds_from_midnight_opt(secs, nanos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::SqlitePool;

    #[tokio::test]
    async fn test_optional_column_missing_and_null() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        let row = sqlx::query("SELECT 1 AS id, NULL AS team__name, 'core' AS team__code")
            .fetch_one(&pool)
            .await
            .unwrap();

        let missing: Option<String> = optional_column(&row, "nope").unwrap();
        assert_eq!(missing, None);
        let null: Option<String> = related_column(&row, "team", "name").unwrap();
        assert_eq!(null, None);
        let code: Option<String> = related_column(&row, "team", "code").unwrap();
        assert_eq!(code.as_deref(), Some("core"));
    }

    #[test]
    fn test_micros_conversions() {
        let ts = micros_to_datetime(1_706_745_600_000_000).unwrap();
        assert_eq!(ts.to_rfc3339(), "2024-02-01T00:00:00+00:00");
        let t = micros_to_time(9 * 3600 * 1_000_000 + 250).unwrap();
        assert_eq!(t, NaiveTime::from_hms_micro_opt(9, 0, 0, 250).unwrap());
        assert!(micros_to_time(-1).is_none());
        assert!(micros_to_time(86_400_000_000).is_none());
    }
}
