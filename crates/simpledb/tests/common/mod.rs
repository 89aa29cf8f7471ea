#![allow(dead_code)]

use chrono::NaiveDateTime;
use simpledb::{Entity, SimpleDb, SimpleDbConfig};

#[derive(Debug, Default, Clone, PartialEq, Entity)]
pub struct Article {
    pub id: i64,
    pub created_date: NaiveDateTime,
    pub modified_date: NaiveDateTime,
    pub title: String,
    pub body: String,
    pub is_blind: bool,
}

pub const CREATE_ARTICLE: &str = "CREATE TABLE article (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    created_date DATETIME NOT NULL,
    modified_date DATETIME NOT NULL,
    title VARCHAR(100) NOT NULL,
    body TEXT NOT NULL,
    is_blind BOOLEAN NOT NULL DEFAULT 0
)";

/// Fresh in-memory session with a seeded `article` table.
///
/// Articles 1..=6 are titled `title{n}` with body `body{n}`; articles 4..=6
/// are blind.
pub fn seeded_db() -> SimpleDb {
    let config = SimpleDbConfig::new("sqlite::memory:").with_dev_mode(true);
    let mut db = SimpleDb::connect(&config).unwrap_or_else(|e| panic!("connect failed: {e}"));
    db.run("DROP TABLE IF EXISTS article", ()).unwrap();
    db.run(CREATE_ARTICLE, ()).unwrap();
    for no in 1..=6_i64 {
        db.run(
            "INSERT INTO article (created_date, modified_date, title, body, is_blind)
             VALUES (datetime('now'), datetime('now'), ?, ?, ?)",
            (format!("title{no}"), format!("body{no}"), no > 3),
        )
        .unwrap();
    }
    db
}

pub fn article_count(db: &mut SimpleDb) -> i64 {
    db.gen_sql()
        .append("select count(*)")
        .append("from article")
        .select_long()
        .unwrap()
        .unwrap_or(0)
}

pub fn column_names(db: &mut SimpleDb, table: &str) -> Vec<String> {
    db.describe(table)
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect()
}
