//! Statement lists issued against the warehouse, in execution order.

pub mod staging;
pub mod star;

use common::config::Settings;

/// A named warehouse statement. The name identifies the statement in logs
/// and run reports.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Statement {
    pub name: &'static str,
    pub sql: String,
}

impl Statement {
    pub fn new(name: &'static str, sql: impl Into<String>) -> Self {
        Self {
            name,
            sql: sql.into(),
        }
    }
}

pub const STAGING_EVENTS: &str = "staging_events";
pub const STAGING_SONGS: &str = "staging_songs";
pub const SONGPLAYS: &str = "songplays";
pub const USERS: &str = "users";
pub const SONGS: &str = "songs";
pub const ARTISTS: &str = "artists";
pub const TIME: &str = "time";

pub fn drop_table_queries() -> Vec<Statement> {
    [STAGING_EVENTS, STAGING_SONGS, SONGPLAYS, USERS, SONGS, ARTISTS, TIME]
        .into_iter()
        .map(|table| Statement::new(table, format!("DROP TABLE IF EXISTS {}", table)))
        .collect()
}

/// Dimensions are created before `songplays`, which references them.
pub fn create_table_queries() -> Vec<Statement> {
    vec![
        Statement::new(STAGING_EVENTS, staging::STAGING_EVENTS_CREATE),
        Statement::new(STAGING_SONGS, staging::STAGING_SONGS_CREATE),
        Statement::new(TIME, star::TIME_CREATE),
        Statement::new(ARTISTS, star::ARTISTS_CREATE),
        Statement::new(SONGS, star::SONGS_CREATE),
        Statement::new(USERS, star::USERS_CREATE),
        Statement::new(SONGPLAYS, star::SONGPLAYS_CREATE),
    ]
}

pub fn copy_table_queries(settings: &Settings) -> Vec<Statement> {
    vec![
        Statement::new(STAGING_EVENTS, staging::staging_events_copy(settings)),
        Statement::new(STAGING_SONGS, staging::staging_songs_copy(settings)),
    ]
}

/// Insert order matches the historical pipeline: `songplays` runs first even
/// though it references the dimension tables. The warehouse does not
/// enforce foreign keys, so the order only matters for readers of the model.
pub fn insert_table_queries() -> Vec<Statement> {
    vec![
        Statement::new(SONGPLAYS, star::SONGPLAYS_INSERT),
        Statement::new(USERS, star::USERS_INSERT),
        Statement::new(SONGS, star::SONGS_INSERT),
        Statement::new(ARTISTS, star::ARTISTS_INSERT),
        Statement::new(TIME, star::TIME_INSERT),
    ]
}

/// Renders `value` as a single-quoted SQL string literal.
pub(crate) fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}
