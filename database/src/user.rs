use sqlx::FromRow;

use crate::{Database, DatabaseResult, InsertionResult};

pub type UserDatabase = Database<User>;

#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
#[non_exhaustive]
pub struct User {
    pub id: String,
    pub username: String,
}

impl UserDatabase {
    pub async fn insert_user(
        &self,
        id: &str,
        username: &str,
        password: &str,
    ) -> DatabaseResult<InsertionResult> {
        let mut db = self.get_connection().await?;

        let query_result = sqlx::query(
            r#"INSERT INTO "user" (id, username, password) VALUES ($1, $2, crypt($3, gen_salt('bf'))) ON CONFLICT (username) DO NOTHING"#,
        )
        .bind(id.to_owned())
        .bind(username.to_owned())
        .bind(password.to_owned())
        .execute(&mut db)
        .await?;

        InsertionResult::from_changed_rows(query_result.rows_affected())
    }

    pub async fn validate_user(
        &self,
        username: &str,
        password: &str,
    ) -> DatabaseResult<Option<User>> {
        let mut db = self.get_connection().await?;

        let mut query_result = sqlx::query_as::<_, User>(
            r#"SELECT id, username FROM "user" WHERE username = $1 AND password = crypt($2, password)"#,
        )
        .bind(username.to_owned())
        .bind(password.to_owned())
        .fetch_all(&mut db)
        .await?;

        if query_result.is_empty() {
            Ok(None)
        } else if query_result.len() > 1 {
            error!(r#"more than 1 user with username: "{}""#, username);
            Ok(None)
        } else {
            Ok(Some(query_result.remove(0)))
        }
    }
}
