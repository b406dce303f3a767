use crate::event_repo::EventRepo;
use rusqlite::Connection;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    pub fn events(&self) -> EventRepo<'_> {
        EventRepo::new(&self.conn)
    }
}
