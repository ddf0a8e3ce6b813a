use rusqlite::Connection;

/// Initialize the local record store.
///
/// Every logical table shares one physical table; `tbl` names the logical
/// table and `data` holds the row as a JSON object.
pub fn init_db(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS records (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            tbl TEXT NOT NULL,
            data TEXT NOT NULL CHECK (json_valid(data))
        );
        CREATE INDEX IF NOT EXISTS idx_records_tbl ON records(tbl);
        "#,
    )
}
