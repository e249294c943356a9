//! Username/password lookups for the login endpoint. Passwords are
//! stored and compared as plain text, matching the accounts the
//! bundled frontend ships with.

use diesel::prelude::*;

use crate::infrastructure::database::schema::users;
use crate::infrastructure::database::{DatabaseError, DbPool, get_connection_from_pool};

const DEFAULT_ACCOUNTS: [(&str, &str); 2] = [("test", "test123"), ("admin", "admin123")];

pub struct CredentialRepository {
    pool: DbPool,
}

impl CredentialRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Inserts the default accounts, leaving existing rows untouched.
    pub fn seed_defaults(&self) -> Result<(), DatabaseError> {
        let mut conn = get_connection_from_pool(&self.pool)?;

        let rows: Vec<_> = DEFAULT_ACCOUNTS
            .iter()
            .map(|(name, pass)| (users::username.eq(*name), users::password.eq(*pass)))
            .collect();

        diesel::insert_or_ignore_into(users::table)
            .values(&rows)
            .execute(&mut conn)
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(())
    }

    pub fn verify(&self, name: &str, pass: &str) -> Result<bool, DatabaseError> {
        let mut conn = get_connection_from_pool(&self.pool)?;

        let found = users::table
            .filter(users::username.eq(name))
            .filter(users::password.eq(pass))
            .select(users::id)
            .first::<i32>(&mut conn)
            .optional()
            .map_err(|e| DatabaseError::QueryError(e.to_string()))?;

        Ok(found.is_some())
    }
}
