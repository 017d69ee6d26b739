use std::path::Path;

use anyhow::Result;
use rusqlite::Connection;
use tracing::warn;

use crate::profile::CoachProfile;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS coaches (
            username     TEXT PRIMARY KEY,
            display_name TEXT NOT NULL,
            email        TEXT,
            role         TEXT,
            sports       TEXT,
            phone        TEXT,
            organization TEXT,
            location     TEXT,
            source       TEXT,
            is_claimed   BOOLEAN NOT NULL DEFAULT 0,
            profile_json TEXT NOT NULL,
            created_at   TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at   TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_coaches_organization ON coaches(organization);
        CREATE INDEX IF NOT EXISTS idx_coaches_claimed ON coaches(is_claimed);

        CREATE TABLE IF NOT EXISTS documents (
            id           INTEGER PRIMARY KEY,
            source       TEXT UNIQUE NOT NULL,
            coach_count  INTEGER NOT NULL,
            validated    BOOLEAN NOT NULL,
            imported_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;
    Ok(())
}

#[derive(Debug, Default)]
pub struct UploadOutcome {
    pub uploaded: usize,
    pub skipped_claimed: usize,
    pub errors: usize,
}

/// Upsert unclaimed profiles keyed by username. Rows already claimed by a
/// user are never overwritten. Per-profile failures are counted, not fatal.
pub fn upsert_profiles(conn: &Connection, profiles: &[CoachProfile]) -> Result<UploadOutcome> {
    let tx = conn.unchecked_transaction()?;
    let mut outcome = UploadOutcome::default();
    {
        let mut stmt = tx.prepare(
            "INSERT INTO coaches
             (username, display_name, email, role, sports, phone,
              organization, location, source, profile_json)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(username) DO UPDATE SET
                 display_name = excluded.display_name,
                 email        = excluded.email,
                 role         = excluded.role,
                 sports       = excluded.sports,
                 phone        = excluded.phone,
                 organization = excluded.organization,
                 location     = excluded.location,
                 source       = excluded.source,
                 profile_json = excluded.profile_json,
                 updated_at   = datetime('now')
             WHERE coaches.is_claimed = 0",
        )?;
        for profile in profiles {
            let json = match serde_json::to_string(profile) {
                Ok(json) => json,
                Err(err) => {
                    warn!(username = %profile.username, error = %err, "failed to serialize profile");
                    outcome.errors += 1;
                    continue;
                }
            };
            let changed = stmt.execute(rusqlite::params![
                profile.username,
                profile.display_name,
                profile.email,
                profile.role,
                profile.sports.join(", "),
                profile.phone_number,
                profile.organization,
                profile.location,
                profile.source_url,
                json,
            ]);
            match changed {
                Ok(0) => outcome.skipped_claimed += 1,
                Ok(_) => outcome.uploaded += 1,
                Err(err) => {
                    warn!(username = %profile.username, error = %err, "failed to upsert profile");
                    outcome.errors += 1;
                }
            }
        }
    }
    tx.commit()?;
    Ok(outcome)
}

pub fn record_document(
    conn: &Connection,
    source: &str,
    coach_count: usize,
    validated: bool,
) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO documents (source, coach_count, validated)
         VALUES (?1, ?2, ?3)",
        rusqlite::params![source, coach_count, validated],
    )?;
    Ok(())
}

pub struct Stats {
    pub coaches: usize,
    pub claimed: usize,
    pub unclaimed: usize,
    pub documents: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let coaches: usize = conn.query_row("SELECT COUNT(*) FROM coaches", [], |r| r.get(0))?;
    let claimed: usize = conn.query_row(
        "SELECT COUNT(*) FROM coaches WHERE is_claimed = 1",
        [],
        |r| r.get(0),
    )?;
    let documents: usize = conn.query_row("SELECT COUNT(*) FROM documents", [], |r| r.get(0))?;
    Ok(Stats {
        coaches,
        claimed,
        unclaimed: coaches - claimed,
        documents,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::OrganizationContext;
    use crate::parser::ContactRecord;
    use crate::profile::map_to_profile;

    fn profile(username: &str) -> CoachProfile {
        let record = ContactRecord {
            first_name: "John".into(),
            last_name: "Smith".into(),
            email: Some(format!("{}@school.edu", username)),
            username: username.into(),
            phone: None,
            title: "Head Coach".into(),
            sport_section: None,
            full_line: "John Smith Head Coach".into(),
            uploadable: true,
        };
        map_to_profile(&record, &OrganizationContext::default())
    }

    fn open_test_db(dir: &tempfile::TempDir) -> Connection {
        let conn = connect(&dir.path().join("coaches.sqlite")).unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn upsert_inserts_and_updates() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_test_db(&dir);

        let outcome = upsert_profiles(&conn, &[profile("jsmith")]).unwrap();
        assert_eq!(outcome.uploaded, 1);

        let outcome = upsert_profiles(&conn, &[profile("jsmith")]).unwrap();
        assert_eq!(outcome.uploaded, 1);
        assert_eq!(outcome.skipped_claimed, 0);

        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.coaches, 1);
    }

    #[test]
    fn claimed_rows_are_never_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_test_db(&dir);

        upsert_profiles(&conn, &[profile("jsmith")]).unwrap();
        conn.execute("UPDATE coaches SET is_claimed = 1", []).unwrap();

        let outcome = upsert_profiles(&conn, &[profile("jsmith")]).unwrap();
        assert_eq!(outcome.uploaded, 0);
        assert_eq!(outcome.skipped_claimed, 1);
    }

    #[test]
    fn document_bookkeeping() {
        let dir = tempfile::tempdir().unwrap();
        let conn = open_test_db(&dir);

        record_document(&conn, "pdfs/rowan.txt", 12, true).unwrap();
        record_document(&conn, "pdfs/rowan.txt", 14, true).unwrap();
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.documents, 1);
    }
}
