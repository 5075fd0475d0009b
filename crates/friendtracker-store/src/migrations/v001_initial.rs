//! v001 -- Initial schema creation.
//!
//! Creates the `contact` table and its archive index.

use rusqlite::Connection;

/// SQL executed when upgrading from version 0 to version 1.
const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS contact (
    id         INTEGER PRIMARY KEY AUTOINCREMENT,
    name       TEXT NOT NULL CHECK (length(trim(name)) > 0),
    email      TEXT,
    phone      TEXT,
    birthday   TEXT,                            -- YYYY-MM-DD, no time component
    archived   INTEGER NOT NULL DEFAULT 0,      -- boolean 0/1
    created_at TEXT NOT NULL                    -- RFC-3339
);

CREATE INDEX IF NOT EXISTS idx_contact_archived ON contact(archived);
"#;

/// Apply the initial migration.
pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
