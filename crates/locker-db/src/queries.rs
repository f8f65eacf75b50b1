use std::sync::Arc;

use anyhow::Result;
use locker_types::{Gift, Locker};
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row};

use crate::Database;
use crate::store::{LockerStore, OwnershipIndex};

const LOCKER_COLUMNS: &str = "id, slug, owner_name, owner_token, theme, created_at";
const GIFT_COLUMNS: &str = "id, locker_id, gift_type, sender_name, message, created_at";

impl LockerStore for Database {
    // -- Lockers --

    fn list_lockers(&self) -> Result<Vec<Locker>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {LOCKER_COLUMNS} FROM lockers ORDER BY rowid");
            query_lockers(conn, &sql, rusqlite::params![])
        })
    }

    fn insert_locker(&self, locker: &Locker) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO lockers (id, slug, owner_name, owner_token, theme, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    locker.id,
                    locker.slug,
                    locker.owner_name,
                    locker.owner_token,
                    locker.theme.as_str(),
                    locker.created_at,
                ],
            )?;
            Ok(())
        })
    }

    fn remove_locker(&self, locker_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM lockers WHERE id = ?1", [locker_id])?;
            Ok(())
        })
    }

    fn find_locker_by_slug(&self, slug: &str) -> Result<Option<Locker>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {LOCKER_COLUMNS} FROM lockers WHERE slug = ?1 ORDER BY rowid LIMIT 1");
            query_one_locker(conn, &sql, slug)
        })
    }

    fn find_locker_by_token(&self, token: &str) -> Result<Option<Locker>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {LOCKER_COLUMNS} FROM lockers WHERE owner_token = ?1 ORDER BY rowid LIMIT 1"
            );
            query_one_locker(conn, &sql, token)
        })
    }

    // -- Gifts --

    fn list_gifts(&self) -> Result<Vec<Gift>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {GIFT_COLUMNS} FROM gifts ORDER BY rowid");
            query_gifts(conn, &sql, rusqlite::params![])
        })
    }

    fn insert_gift(&self, gift: &Gift) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gifts (id, locker_id, gift_type, sender_name, message, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![
                    gift.id,
                    gift.locker_id,
                    gift.gift_type.as_str(),
                    gift.sender_name,
                    gift.message,
                    gift.created_at,
                ],
            )?;
            Ok(())
        })
    }

    fn gifts_for_locker(&self, locker_id: &str) -> Result<Vec<Gift>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {GIFT_COLUMNS} FROM gifts WHERE locker_id = ?1 ORDER BY rowid");
            query_gifts(conn, &sql, [locker_id])
        })
    }
}

/// The ownership index of one client device, stored in `owned_lockers`.
pub struct DeviceIndex {
    db: Arc<Database>,
    device_id: String,
}

impl DeviceIndex {
    pub fn new(db: Arc<Database>, device_id: impl Into<String>) -> Self {
        Self {
            db,
            device_id: device_id.into(),
        }
    }

    pub fn device_id(&self) -> &str {
        &self.device_id
    }
}

impl OwnershipIndex for DeviceIndex {
    fn remember(&self, slug: &str, owner_token: &str) -> Result<()> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT OR REPLACE INTO owned_lockers (device_id, slug, owner_token) VALUES (?1, ?2, ?3)",
                (&self.device_id, slug, owner_token),
            )?;
            Ok(())
        })
    }

    fn token_for_slug(&self, slug: &str) -> Result<Option<String>> {
        self.db.with_conn(|conn| {
            let token = conn
                .query_row(
                    "SELECT owner_token FROM owned_lockers WHERE device_id = ?1 AND slug = ?2",
                    (&self.device_id, slug),
                    |row| row.get(0),
                )
                .optional()?;
            Ok(token)
        })
    }
}

fn query_one_locker(conn: &Connection, sql: &str, key: &str) -> Result<Option<Locker>> {
    let mut stmt = conn.prepare(sql)?;
    let locker = stmt.query_row([key], locker_from_row).optional()?;
    Ok(locker)
}

fn query_lockers<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Locker>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, locker_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn query_gifts<P: rusqlite::Params>(conn: &Connection, sql: &str, params: P) -> Result<Vec<Gift>> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map(params, gift_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(rows)
}

fn locker_from_row(row: &Row<'_>) -> rusqlite::Result<Locker> {
    let theme: String = row.get(4)?;
    Ok(Locker {
        id: row.get(0)?,
        slug: row.get(1)?,
        owner_name: row.get(2)?,
        owner_token: row.get(3)?,
        theme: theme
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, Box::new(e)))?,
        created_at: row.get(5)?,
    })
}

fn gift_from_row(row: &Row<'_>) -> rusqlite::Result<Gift> {
    let gift_type: String = row.get(2)?;
    Ok(Gift {
        id: row.get(0)?,
        locker_id: row.get(1)?,
        gift_type: gift_type
            .parse()
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(2, Type::Text, Box::new(e)))?,
        sender_name: row.get(3)?,
        message: row.get(4)?,
        created_at: row.get(5)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use locker_types::{GiftType, Theme};

    fn locker(id: &str, slug: &str, token: &str) -> Locker {
        Locker {
            id: id.into(),
            slug: slug.into(),
            owner_name: "지민".into(),
            owner_token: token.into(),
            theme: Theme::Mint,
            created_at: 1_700_000_000_000,
        }
    }

    fn gift(id: &str, locker_id: &str) -> Gift {
        Gift {
            id: id.into(),
            locker_id: locker_id.into(),
            gift_type: GiftType::TeddyBear,
            sender_name: "익명".into(),
            message: "생일 축하해!".into(),
            created_at: 1_700_000_000_500,
        }
    }

    #[test]
    fn locker_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let l = locker("l1", "jimin-ab12", "ot_secret");
        db.insert_locker(&l).unwrap();

        assert_eq!(db.find_locker_by_slug("jimin-ab12").unwrap(), Some(l.clone()));
        assert_eq!(db.find_locker_by_token("ot_secret").unwrap(), Some(l));
        assert!(db.find_locker_by_slug("nobody-0000").unwrap().is_none());
        assert!(db.find_locker_by_token("ot_wrong").unwrap().is_none());
    }

    #[test]
    fn duplicate_slug_returns_first_inserted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_locker(&locker("first", "dup-0000", "ot_a")).unwrap();
        db.insert_locker(&locker("second", "dup-0000", "ot_b")).unwrap();

        assert_eq!(db.find_locker_by_slug("dup-0000").unwrap().unwrap().id, "first");
        assert_eq!(db.list_lockers().unwrap().len(), 2);
    }

    #[test]
    fn remove_locker_deletes_only_that_row() {
        let db = Database::open_in_memory().unwrap();
        db.insert_locker(&locker("l1", "jimin-ab12", "ot_a")).unwrap();
        db.insert_locker(&locker("l2", "minsu-cd34", "ot_b")).unwrap();

        db.remove_locker("l1").unwrap();
        db.remove_locker("never-existed").unwrap();

        let ids: Vec<_> = db.list_lockers().unwrap().into_iter().map(|l| l.id).collect();
        assert_eq!(ids, ["l2"]);
        assert!(db.find_locker_by_token("ot_a").unwrap().is_none());
    }

    #[test]
    fn gifts_keep_insertion_order_per_locker() {
        let db = Database::open_in_memory().unwrap();
        // Ids chosen so lexical order differs from insertion order.
        for id in ["z", "a", "m"] {
            db.insert_gift(&gift(id, "l1")).unwrap();
        }
        db.insert_gift(&gift("other", "l2")).unwrap();

        let ids: Vec<_> = db.gifts_for_locker("l1").unwrap().into_iter().map(|g| g.id).collect();
        assert_eq!(ids, ["z", "a", "m"]);
        assert_eq!(db.list_gifts().unwrap().len(), 4);
    }

    #[test]
    fn gift_for_unknown_locker_is_accepted() {
        let db = Database::open_in_memory().unwrap();
        db.insert_gift(&gift("g1", "ghost")).unwrap();
        assert_eq!(db.gifts_for_locker("ghost").unwrap()[0], gift("g1", "ghost"));
    }

    #[test]
    fn corrupt_enum_column_is_an_error() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO gifts (id, locker_id, gift_type, sender_name, message, created_at) VALUES ('g', 'l', 'CANDY', 's', 'm', 0)",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert!(db.list_gifts().is_err());
    }

    #[test]
    fn device_indexes_are_isolated() {
        let db = Arc::new(Database::open_in_memory().unwrap());
        let mine = DeviceIndex::new(db.clone(), "device-a");
        let theirs = DeviceIndex::new(db.clone(), "device-b");

        mine.remember("jimin-ab12", "ot_one").unwrap();
        assert_eq!(mine.token_for_slug("jimin-ab12").unwrap().as_deref(), Some("ot_one"));
        assert!(theirs.token_for_slug("jimin-ab12").unwrap().is_none());

        mine.remember("jimin-ab12", "ot_two").unwrap();
        assert_eq!(mine.token_for_slug("jimin-ab12").unwrap().as_deref(), Some("ot_two"));
    }

    #[test]
    fn reopening_a_file_keeps_rows() {
        let path = std::env::temp_dir().join(format!("locker-db-test-{}.db", std::process::id()));
        {
            let db = Database::open(&path).unwrap();
            db.insert_locker(&locker("l1", "keep-0000", "ot_keep")).unwrap();
        }
        let db = Database::open(&path).unwrap();
        assert!(db.find_locker_by_slug("keep-0000").unwrap().is_some());
        drop(db);
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }
}
