use anyhow::Result;
use rusqlite::Connection;
use sha2::{Digest, Sha256};

const DB_PATH: &str = "data/acm.sqlite";

pub fn connect() -> Result<Connection> {
    std::fs::create_dir_all("data")?;
    let conn = Connection::open(DB_PATH)?;
    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
    Ok(conn)
}

/// Idempotent DDL: safe to run on every start. This four-table layout is the
/// crate's durable output contract; do not rename columns.
pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS conferences (
            nick     TEXT PRIMARY KEY NOT NULL,
            fullname TEXT
        );

        CREATE TABLE IF NOT EXISTS papers (
            id    TEXT PRIMARY KEY NOT NULL,
            cid   TEXT,
            year  INTEGER,
            title TEXT
        );

        CREATE TABLE IF NOT EXISTS keywords (
            id   TEXT PRIMARY KEY NOT NULL,
            name TEXT
        );

        CREATE TABLE IF NOT EXISTS keymap (
            pid TEXT NOT NULL,
            kid TEXT NOT NULL,
            PRIMARY KEY (pid, kid)
        );
        ",
    )?;
    Ok(())
}

// ── Insert-if-absent primitives ──
//
// Rows are write-once: inserting an existing key is a no-op reported as
// `Ok(false)`, never an error. Real SQLite failures still propagate.

pub fn insert_conference(conn: &Connection, nick: &str, fullname: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO conferences (nick, fullname) VALUES (?1, ?2)",
        rusqlite::params![nick, fullname],
    )?;
    Ok(n > 0)
}

pub fn insert_paper(
    conn: &Connection,
    id: &str,
    conference: &str,
    year: i32,
    title: &str,
) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO papers (id, cid, year, title) VALUES (?1, ?2, ?3, ?4)",
        rusqlite::params![id, conference, year, title],
    )?;
    Ok(n > 0)
}

/// Deterministic keyword identity: SHA-256 of the trimmed, lower-cased tag
/// text, so the same tag on any paper resolves to the same row.
pub fn keyword_id(tag: &str) -> String {
    format!("{:x}", Sha256::digest(tag.trim().to_lowercase().as_bytes()))
}

/// Returns the keyword id along with whether the row was new. Callers must
/// write the association either way.
pub fn insert_keyword(conn: &Connection, tag: &str) -> Result<(String, bool)> {
    let name = tag.trim().to_lowercase();
    let id = keyword_id(tag);
    let n = conn.execute(
        "INSERT OR IGNORE INTO keywords (id, name) VALUES (?1, ?2)",
        rusqlite::params![id, name],
    )?;
    Ok((id, n > 0))
}

pub fn insert_keymap(conn: &Connection, pid: &str, kid: &str) -> Result<bool> {
    let n = conn.execute(
        "INSERT OR IGNORE INTO keymap (pid, kid) VALUES (?1, ?2)",
        rusqlite::params![pid, kid],
    )?;
    Ok(n > 0)
}

// ── Listings ──

pub struct PaperRow {
    pub id: String,
    pub conference: String,
    pub year: Option<i32>,
    pub title: String,
    pub keywords: String,
}

pub fn fetch_papers(
    conn: &Connection,
    conference: Option<&str>,
    year: Option<i32>,
    limit: usize,
) -> Result<Vec<PaperRow>> {
    let mut conditions = Vec::new();
    let mut params: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

    if let Some(c) = conference {
        conditions.push(format!("p.cid = ?{}", params.len() + 1));
        params.push(Box::new(c.to_string()));
    }
    if let Some(y) = year {
        conditions.push(format!("p.year = ?{}", params.len() + 1));
        params.push(Box::new(y));
    }

    let where_clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };

    let sql = format!(
        "SELECT p.id, COALESCE(p.cid, ''), p.year, COALESCE(p.title, ''),
                COALESCE(GROUP_CONCAT(k.name, ', '), '')
         FROM papers p
         LEFT JOIN keymap m ON m.pid = p.id
         LEFT JOIN keywords k ON k.id = m.kid{}
         GROUP BY p.id
         ORDER BY p.year DESC, p.id
         LIMIT {}",
        where_clause, limit
    );

    let mut stmt = conn.prepare(&sql)?;
    let param_refs: Vec<&dyn rusqlite::types::ToSql> = params.iter().map(|p| p.as_ref()).collect();
    let rows = stmt
        .query_map(param_refs.as_slice(), |row| {
            Ok(PaperRow {
                id: row.get(0)?,
                conference: row.get(1)?,
                year: row.get(2)?,
                title: row.get(3)?,
                keywords: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

// ── Stats ──

pub struct Stats {
    pub conferences: usize,
    pub papers: usize,
    pub keywords: usize,
    pub associations: usize,
}

pub fn get_stats(conn: &Connection) -> Result<Stats> {
    let count = |table: &str| -> Result<usize> {
        let sql = format!("SELECT COUNT(*) FROM {}", table);
        Ok(conn.query_row(&sql, [], |r| r.get(0))?)
    };
    Ok(Stats {
        conferences: count("conferences")?,
        papers: count("papers")?,
        keywords: count("keywords")?,
        associations: count("keymap")?,
    })
}

// ── Tests ──

#[cfg(test)]
mod tests {
    use super::*;

    fn memdb() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn schema_is_idempotent() {
        let conn = memdb();
        init_schema(&conn).unwrap();
        assert_eq!(get_stats(&conn).unwrap().papers, 0);
    }

    #[test]
    fn inserts_are_write_once() {
        let conn = memdb();
        assert!(insert_conference(&conn, "sosp", "SOSP").unwrap());
        assert!(!insert_conference(&conn, "sosp", "renamed").unwrap());
        // First write wins, nothing was updated.
        let name: String = conn
            .query_row(
                "SELECT fullname FROM conferences WHERE nick = 'sosp'",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(name, "SOSP");

        assert!(insert_paper(&conn, "10.1145", "sosp", 2006, "A paper").unwrap());
        assert!(!insert_paper(&conn, "10.1145", "sosp", 2006, "A paper").unwrap());
    }

    #[test]
    fn keyword_identity_collapses_on_normalized_text() {
        let conn = memdb();
        let (id_a, fresh_a) = insert_keyword(&conn, "  Debugging ").unwrap();
        let (id_b, fresh_b) = insert_keyword(&conn, "debugging").unwrap();
        assert_eq!(id_a, id_b);
        assert!(fresh_a);
        assert!(!fresh_b);
        assert_eq!(get_stats(&conn).unwrap().keywords, 1);
        assert_eq!(keyword_id("DEBUGGING"), id_a);
        assert_ne!(keyword_id("profiling"), id_a);
    }

    #[test]
    fn association_written_even_when_keyword_was_a_duplicate() {
        let conn = memdb();
        insert_paper(&conn, "10.1145", "sosp", 2006, "First").unwrap();
        insert_paper(&conn, "10.1146", "sosp", 2007, "Second").unwrap();

        for pid in ["10.1145", "10.1146"] {
            for tag in ["debugging", "Debugging", "reliability"] {
                let (kid, _) = insert_keyword(&conn, tag).unwrap();
                insert_keymap(&conn, pid, &kid).unwrap();
            }
        }

        // Three raw tags, two distinct normalized ones, on each paper.
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.keywords, 2);
        assert_eq!(stats.associations, 4);
    }

    #[test]
    fn reruns_leave_the_store_unchanged() {
        let conn = memdb();
        for _ in 0..2 {
            insert_conference(&conn, "sosp", "SOSP").unwrap();
            insert_paper(&conn, "10.1145", "sosp", 2006, "A paper").unwrap();
            let (kid, _) = insert_keyword(&conn, "debugging").unwrap();
            insert_keymap(&conn, "10.1145", &kid).unwrap();
        }
        let stats = get_stats(&conn).unwrap();
        assert_eq!(stats.conferences, 1);
        assert_eq!(stats.papers, 1);
        assert_eq!(stats.keywords, 1);
        assert_eq!(stats.associations, 1);
    }

    #[test]
    fn paper_listing_joins_keywords() {
        let conn = memdb();
        insert_conference(&conn, "sosp", "SOSP").unwrap();
        insert_paper(&conn, "10.1145", "sosp", 2006, "A paper").unwrap();
        let (kid, _) = insert_keyword(&conn, "debugging").unwrap();
        insert_keymap(&conn, "10.1145", &kid).unwrap();

        let rows = fetch_papers(&conn, Some("sosp"), None, 50).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].year, Some(2006));
        assert_eq!(rows[0].keywords, "debugging");

        assert!(fetch_papers(&conn, Some("sigcomm"), None, 50)
            .unwrap()
            .is_empty());
        assert!(fetch_papers(&conn, None, Some(1999), 50).unwrap().is_empty());
    }
}
