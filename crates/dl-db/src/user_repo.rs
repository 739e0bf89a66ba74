use crate::util::{placeholders, query_err};
use dl_core::error::StoreError;
use dl_core::types::{UserAccount, UserId};
use dl_core::users::UserDirectory;
use rusqlite::{Connection, params_from_iter};
use std::collections::HashMap;

pub struct UserRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> UserRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn upsert(&self, account: &UserAccount) -> Result<(), StoreError> {
        self.conn
            .execute(
                "INSERT INTO users (uid, name) VALUES (?1, ?2) ON CONFLICT(uid) DO UPDATE SET name = excluded.name",
                (account.id.get(), account.name.as_str()),
            )
            .map_err(query_err)?;
        Ok(())
    }
}

impl UserDirectory for UserRepo<'_> {
    fn resolve(&self, ids: &[UserId]) -> Result<HashMap<UserId, UserAccount>, StoreError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let sql = format!(
            "SELECT uid, name FROM users WHERE uid IN ({})",
            placeholders(ids.len())
        );
        let mut stmt = self.conn.prepare(&sql).map_err(query_err)?;
        let rows = stmt
            .query_map(params_from_iter(ids.iter().map(|id| id.get())), |row| {
                Ok(UserAccount {
                    id: UserId::new(row.get(0)?),
                    name: row.get(1)?,
                })
            })
            .map_err(query_err)?;
        let mut accounts = HashMap::with_capacity(ids.len());
        for row in rows {
            let account = row.map_err(query_err)?;
            accounts.insert(account.id, account);
        }
        tracing::trace!(requested = ids.len(), found = accounts.len(), "resolved users");
        Ok(accounts)
    }
}
