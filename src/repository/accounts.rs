use async_trait::async_trait;
use rusqlite::{params, OptionalExtension, Row};

use super::{classify, AccountStore, RepoResult, RepositoryError, SqliteRepository};
use crate::db::models::{Account, NewAccount};

const ACCOUNT_COLUMNS: &str = "id, username, email, first_name, last_name, password, \
     created_date, is_active, is_admin, is_caretaker";

fn account_from_row(row: &Row) -> rusqlite::Result<Account> {
    Ok(Account {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        first_name: row.get(3)?,
        last_name: row.get(4)?,
        password: row.get(5)?,
        created_date: row.get(6)?,
        is_active: row.get(7)?,
        is_admin: row.get(8)?,
        is_caretaker: row.get(9)?,
    })
}

impl SqliteRepository {
    fn query_account(
        &self,
        column: &str,
        value: &dyn rusqlite::ToSql,
    ) -> RepoResult<Option<Account>> {
        let conn = self.pool.get()?;
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {column} = ?1");
        let account = conn.query_row(&sql, [value], account_from_row).optional()?;
        Ok(account)
    }
}

#[async_trait]
impl AccountStore for SqliteRepository {
    async fn create_account(&self, account: NewAccount) -> RepoResult<Account> {
        let id = {
            let conn = self.pool.get()?;
            conn.execute(
                "INSERT INTO accounts (username, email, first_name, last_name, password, is_admin)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    account.username,
                    account.email,
                    account.first_name,
                    account.last_name,
                    account.password_hash,
                    account.is_admin
                ],
            )
            .map_err(classify)?;
            conn.last_insert_rowid()
        };

        tracing::info!("Created account {} ({})", account.username, id);
        self.get_account(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn get_account(&self, id: i64) -> RepoResult<Option<Account>> {
        self.query_account("id", &id)
    }

    async fn find_account_by_username(&self, username: &str) -> RepoResult<Option<Account>> {
        self.query_account("username", &username)
    }

    async fn find_account_by_email(&self, email: &str) -> RepoResult<Option<Account>> {
        self.query_account("email", &email)
    }
}
