use sqlx::FromRow;

/// User record in the database.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: i64,               // stable user ID
    pub username: String,      // unique login name
    pub password_hash: String, // Argon2 PHC string
}
