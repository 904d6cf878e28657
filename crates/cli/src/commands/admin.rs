//! Admin user management commands.

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};

use kemet_core::UserRole;

use super::{CommandError, connect};

/// Create an admin user, or promote an existing user to admin.
///
/// The password only applies when the account doesn't exist yet; promoting
/// an existing user never touches their credentials.
///
/// # Errors
///
/// Returns `CommandError` if hashing or the database write fails.
pub async fn create_user(email: &str, name: &str, password: &str) -> Result<(), CommandError> {
    let pool = connect().await?;

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|_| CommandError::PasswordHash)?
        .to_string();

    sqlx::query(
        "INSERT INTO store.users (email, password_hash, name, role)
         VALUES ($1, $2, $3, $4)
         ON CONFLICT (email)
         DO UPDATE SET role = EXCLUDED.role, name = EXCLUDED.name, updated_at = now()",
    )
    .bind(email)
    .bind(&password_hash)
    .bind(name)
    .bind(UserRole::Admin.to_string())
    .execute(&pool)
    .await?;

    tracing::info!(email, "admin user ready");
    Ok(())
}
