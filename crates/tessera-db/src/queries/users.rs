//! User query functions.
//!
//! User rows are written by external collaborators (registration, loyalty
//! awarding); the engine reads them for consumer entry generation and
//! winner contact lookup.

use rusqlite::Connection;

use crate::{map_constraint, storable, DbError, Result};

/// Insert a new user.
pub fn insert(
    conn: &Connection,
    user_id: &str,
    bot_handle: Option<&str>,
    created_at: u64,
) -> Result<()> {
    conn.execute(
        "INSERT INTO users (user_id, points, bot_handle, created_at)
         VALUES (?1, 0, ?2, ?3)",
        rusqlite::params![user_id, bot_handle, created_at as i64],
    )
    .map_err(|e| map_constraint(e, "user already registered"))?;
    Ok(())
}

/// Get a user by id.
pub fn get(conn: &Connection, user_id: &str) -> Result<UserRow> {
    conn.query_row(
        "SELECT user_id, points, bot_handle, created_at FROM users WHERE user_id = ?1",
        [user_id],
        |row| {
            Ok(UserRow {
                user_id: row.get(0)?,
                points: row.get::<_, i64>(1)? as u64,
                bot_handle: row.get(2)?,
                created_at: row.get::<_, i64>(3)? as u64,
            })
        },
    )
    .map_err(|e| match e {
        rusqlite::Error::QueryReturnedNoRows => DbError::NotFound("user".into()),
        other => DbError::Sqlite(other),
    })
}

/// Atomically add loyalty points to a user.
pub fn award_points(conn: &Connection, user_id: &str, points: u64) -> Result<()> {
    let points = storable(points, "point award")?;
    let updated = conn.execute(
        "UPDATE users SET points = points + ?1 WHERE user_id = ?2",
        rusqlite::params![points, user_id],
    )?;
    if updated == 0 {
        return Err(DbError::NotFound("user".into()));
    }
    Ok(())
}

/// List users holding at least `min_points` loyalty points, ordered by id.
///
/// The ordering makes entry generation deterministic within one call.
pub fn with_min_points(conn: &Connection, min_points: u64) -> Result<Vec<UserRow>> {
    let mut stmt = conn.prepare(
        "SELECT user_id, points, bot_handle, created_at
         FROM users WHERE points >= ?1 ORDER BY user_id",
    )?;

    let rows = stmt
        .query_map([min_points as i64], |row| {
            Ok(UserRow {
                user_id: row.get(0)?,
                points: row.get::<_, i64>(1)? as u64,
                bot_handle: row.get(2)?,
                created_at: row.get::<_, i64>(3)? as u64,
            })
        })?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

/// A raw user row.
#[derive(Debug)]
pub struct UserRow {
    pub user_id: String,
    pub points: u64,
    pub bot_handle: Option<String>,
    pub created_at: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_db() -> Connection {
        crate::open_memory().expect("open test db")
    }

    #[test]
    fn test_insert_and_get() {
        let conn = test_db();
        insert(&conn, "u-alice", Some("@alice"), 1000).expect("insert");

        let user = get(&conn, "u-alice").expect("get");
        assert_eq!(user.points, 0);
        assert_eq!(user.bot_handle.as_deref(), Some("@alice"));
        assert_eq!(user.created_at, 1000);
    }

    #[test]
    fn test_duplicate_user_rejected() {
        let conn = test_db();
        insert(&conn, "u-alice", None, 1000).expect("insert");
        let result = insert(&conn, "u-alice", None, 1001);
        assert!(matches!(result, Err(DbError::Constraint(_))));
    }

    #[test]
    fn test_award_points_accumulates() {
        let conn = test_db();
        insert(&conn, "u-bob", None, 1000).expect("insert");
        award_points(&conn, "u-bob", 7).expect("award");
        award_points(&conn, "u-bob", 5).expect("award");
        assert_eq!(get(&conn, "u-bob").expect("get").points, 12);
    }

    #[test]
    fn test_award_beyond_storable_range_rejected() {
        let conn = test_db();
        insert(&conn, "u-bob", None, 1000).expect("insert");
        let result = award_points(&conn, "u-bob", u64::MAX);
        assert!(matches!(result, Err(DbError::Constraint(_))));
        assert_eq!(get(&conn, "u-bob").expect("get").points, 0);
    }

    #[test]
    fn test_award_points_unknown_user() {
        let conn = test_db();
        let result = award_points(&conn, "u-ghost", 10);
        assert!(matches!(result, Err(DbError::NotFound(_))));
    }

    #[test]
    fn test_with_min_points_ordered() {
        let conn = test_db();
        insert(&conn, "u-b", None, 1000).expect("insert");
        insert(&conn, "u-a", None, 1000).expect("insert");
        insert(&conn, "u-c", None, 1000).expect("insert");
        award_points(&conn, "u-b", 10).expect("award");
        award_points(&conn, "u-a", 25).expect("award");
        award_points(&conn, "u-c", 9).expect("award");

        let rows = with_min_points(&conn, 10).expect("query");
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].user_id, "u-a");
        assert_eq!(rows[1].user_id, "u-b");
    }
}
