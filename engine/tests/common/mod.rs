//! Shared SQLite fixture: members with an optional team
#![allow(dead_code)]

use chrono::{DateTime, TimeZone, Utc};
use filterkit::schema::{ColumnKind, Record, RecordSchema};
use filterkit::semantics::{Number, Value};
use filterkit::sql::row::{micros_to_datetime, related_column};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{FromRow, Row, SqlitePool};

#[derive(Debug, Clone, PartialEq)]
pub struct Team {
    pub id: i64,
    pub name: String,
}

impl Record for Team {
    fn describe() -> RecordSchema {
        RecordSchema::new("Team", "teams")
            .field("id", "id", ColumnKind::Integer)
            .field("name", "name", ColumnKind::Text)
            .primary_key("id")
    }

    fn field(&self, name: &str) -> Value<'_> {
        match name {
            "id" => Value::Number(Number::I64(self.id)),
            "name" => Value::Text(&self.name),
            _ => Value::Null,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    pub id: i64,
    pub name: String,
    pub role: Option<String>,
    pub score: Option<f64>,
    pub active: bool,
    pub joined_at: Option<DateTime<Utc>>,
    pub team_id: Option<i64>,
    pub team: Option<Team>,
}

impl Record for Member {
    fn describe() -> RecordSchema {
        RecordSchema::new("Member", "members")
            .field("id", "id", ColumnKind::Integer)
            .field("name", "name", ColumnKind::Text)
            .field("role", "role", ColumnKind::Text)
            .field("score", "score", ColumnKind::Real)
            .field("active", "active", ColumnKind::Boolean)
            .field("joined_at", "joined_at", ColumnKind::Timestamp)
            .field("team_id", "team_id", ColumnKind::Integer)
            .relation::<Team>("team", "team_id", "id")
            .primary_key("id")
    }

    fn field(&self, name: &str) -> Value<'_> {
        match name {
            "id" => self.id.into(),
            "name" => Value::Text(&self.name),
            "role" => self.role.as_ref().into(),
            "score" => self.score.into(),
            "active" => self.active.into(),
            "joined_at" => self.joined_at.into(),
            "team_id" => self.team_id.into(),
            _ => Value::Null,
        }
    }

    fn relation(&self, name: &str) -> Option<&dyn Record> {
        match name {
            "team" => self.team.as_ref().map(|t| t as &dyn Record),
            _ => None,
        }
    }
}

impl<'r> FromRow<'r, SqliteRow> for Member {
    fn from_row(row: &'r SqliteRow) -> sqlx::Result<Self> {
        let team = match related_column::<i64>(row, "team", "id")? {
            Some(id) => Some(Team {
                id,
                name: related_column::<String>(row, "team", "name")?.unwrap_or_default(),
            }),
            None => None,
        };
        let joined_at: Option<i64> = row.try_get("joined_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            role: row.try_get("role")?,
            score: row.try_get("score")?,
            active: row.try_get("active")?,
            joined_at: joined_at.and_then(micros_to_datetime),
            team_id: row.try_get("team_id")?,
            team,
        })
    }
}

fn at(y: i32, m: u32, d: u32, h: u32, min: u32, s: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, s).unwrap()
}

pub fn teams() -> Vec<Team> {
    vec![
        Team {
            id: 1,
            name: "Core".into(),
        },
        Team {
            id: 2,
            name: "Platform".into(),
        },
    ]
}

/// Ten members: three admins in mixed case, four February joiners, nulls scattered
pub fn members() -> Vec<Member> {
    let teams = teams();
    let rows: Vec<(i64, &str, Option<&str>, Option<f64>, bool, Option<DateTime<Utc>>, Option<i64>)> = vec![
        (1, "Ann", Some("admin"), Some(9.5), true, Some(at(2024, 1, 15, 10, 0, 0)), Some(1)),
        (2, "Bob", Some("Admin"), Some(7.0), true, Some(at(2024, 2, 1, 0, 0, 0)), Some(2)),
        (3, "Cid", Some("ADMIN"), None, false, Some(at(2024, 2, 14, 12, 30, 0)), None),
        (4, "Dee", Some("user"), Some(3.25), true, Some(at(2024, 1, 31, 23, 59, 59)), Some(1)),
        (5, "Éva", Some("user"), Some(4.0), false, Some(at(2024, 3, 1, 0, 0, 0)), Some(2)),
        (6, "Fay", None, Some(5.5), true, None, None),
        (7, "Gus", Some("guest"), Some(1.0), false, Some(at(2024, 2, 29, 23, 59, 59)), Some(2)),
        (8, "Hal", Some("administrator"), Some(8.75), true, Some(at(2023, 12, 31, 8, 0, 0)), Some(1)),
        (9, "Ivy", Some("user"), None, true, Some(at(2024, 2, 20, 9, 15, 0)), Some(1)),
        (10, "Jon", Some(""), Some(6.0), false, Some(at(2024, 4, 2, 18, 0, 0)), None),
    ];

    rows.into_iter()
        .map(|(id, name, role, score, active, joined_at, team_id)| Member {
            id,
            name: name.into(),
            role: role.map(String::from),
            score,
            active,
            joined_at,
            team_id,
            team: team_id.and_then(|tid| teams.iter().find(|t| t.id == tid).cloned()),
        })
        .collect()
}

pub async fn setup_test_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();

    sqlx::query("CREATE TABLE teams (id INTEGER PRIMARY KEY, name TEXT NOT NULL)")
        .execute(&pool)
        .await
        .unwrap();
    sqlx::query(
        "CREATE TABLE members (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            role TEXT,
            score REAL,
            active BOOLEAN NOT NULL,
            joined_at INTEGER,
            team_id INTEGER REFERENCES teams (id)
        )",
    )
    .execute(&pool)
    .await
    .unwrap();

    for team in teams() {
        sqlx::query("INSERT INTO teams (id, name) VALUES (?, ?)")
            .bind(team.id)
            .bind(&team.name)
            .execute(&pool)
            .await
            .unwrap();
    }
    for m in members() {
        sqlx::query(
            "INSERT INTO members (id, name, role, score, active, joined_at, team_id)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(m.id)
        .bind(&m.name)
        .bind(&m.role)
        .bind(m.score)
        .bind(m.active)
        .bind(m.joined_at.map(|ts| ts.timestamp_micros()))
        .bind(m.team_id)
        .execute(&pool)
        .await
        .unwrap();
    }
    pool
}

pub fn ids<'a>(records: impl IntoIterator<Item = &'a Member>) -> Vec<i64> {
    records.into_iter().map(|m| m.id).collect()
}
