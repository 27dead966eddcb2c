//! Versioned schema scripts for the todo store.
//!
//! Scripts are embedded at build time and listed oldest first. The schema
//! version lives in `PRAGMA user_version`. A pending batch runs inside one
//! transaction, so a failing script leaves the store at its previous version.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::cmp::Ordering;

struct Migration {
    version: u32,
    name: &'static str,
    sql: &'static str,
}

const MIGRATIONS: [Migration; 2] = [
    Migration {
        version: 1,
        name: "init",
        sql: include_str!("0001_init.sql"),
    },
    Migration {
        version: 2,
        name: "routines",
        sql: include_str!("0002_routines.sql"),
    },
];

/// Schema version produced by running every embedded script.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings `conn` up to [`latest_version`].
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();
    match from_version.cmp(&latest) {
        Ordering::Greater => {
            return Err(DbError::UnsupportedSchemaVersion {
                db_version: from_version,
                latest_supported: latest,
            })
        }
        Ordering::Equal => return Ok(()),
        Ordering::Less => {}
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS
        .iter()
        .skip_while(|migration| migration.version <= from_version)
    {
        tx.execute_batch(migration.sql)
            .and_then(|()| tx.pragma_update(None, "user_version", migration.version))
            .map_err(|source| DbError::Migration {
                version: migration.version,
                name: migration.name,
                source,
            })?;
        info!(
            "event=db_migrate_step module=db status=ok version={} name={}",
            migration.version, migration.name
        );
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={from_version} to_version={latest}");
    Ok(())
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get(0))?)
}

#[cfg(test)]
mod tests {
    use super::{latest_version, MIGRATIONS};

    #[test]
    fn versions_are_contiguous_from_one() {
        for (index, migration) in MIGRATIONS.iter().enumerate() {
            assert_eq!(migration.version as usize, index + 1, "{}", migration.name);
        }
        assert_eq!(latest_version() as usize, MIGRATIONS.len());
    }
}
