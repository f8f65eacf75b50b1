use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    // Slug and owner_token are indexed but deliberately not UNIQUE:
    // collision avoidance happens at generation time.
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS lockers (
            id          TEXT PRIMARY KEY,
            slug        TEXT NOT NULL,
            owner_name  TEXT NOT NULL,
            owner_token TEXT NOT NULL,
            theme       TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_lockers_slug
            ON lockers(slug);

        CREATE INDEX IF NOT EXISTS idx_lockers_owner_token
            ON lockers(owner_token);

        CREATE TABLE IF NOT EXISTS gifts (
            id          TEXT PRIMARY KEY,
            locker_id   TEXT NOT NULL,
            gift_type   TEXT NOT NULL,
            sender_name TEXT NOT NULL,
            message     TEXT NOT NULL,
            created_at  INTEGER NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_gifts_locker
            ON gifts(locker_id);

        CREATE TABLE IF NOT EXISTS owned_lockers (
            device_id   TEXT NOT NULL,
            slug        TEXT NOT NULL,
            owner_token TEXT NOT NULL,
            PRIMARY KEY (device_id, slug)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
