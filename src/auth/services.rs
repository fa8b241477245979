use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use lazy_static::lazy_static;
use rand::rngs::OsRng;
use regex::Regex;
use tracing::{error, info, instrument, warn};

use crate::error::AppError;
use crate::session::{Session, SessionUser};
use crate::state::AppState;

const MIN_PASSWORD_LEN: usize = 8;
const INVALID_CREDENTIALS: &str = "invalid username or password";

pub(crate) fn is_valid_username(username: &str) -> bool {
    lazy_static! {
        static ref USERNAME_RE: Regex = Regex::new(r"^[A-Za-z0-9_.-]{3,32}$").unwrap();
    }
    USERNAME_RE.is_match(username)
}

/// Argon2id with default parameters, PHC string output.
pub(crate) fn hash_password(plain: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    match Argon2::default().hash_password(plain.as_bytes(), &salt) {
        Ok(hash) => Ok(hash.to_string()),
        Err(e) => {
            error!(error = %e, "password hashing failed");
            Err(AppError::Credential(e.to_string()))
        }
    }
}

/// `Ok(false)` on mismatch; an unreadable stored hash is an error.
pub(crate) fn verify_password(plain: &str, stored: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(stored).map_err(|e| {
        error!(error = %e, "stored password hash unreadable");
        AppError::Credential(e.to_string())
    })?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}

/// Creates the account and signs the session into it.
#[instrument(skip(state, session, password))]
pub async fn register(
    state: &AppState,
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<SessionUser, AppError> {
    let username = username.trim();

    if !is_valid_username(username) {
        warn!(%username, "invalid username");
        return Err(AppError::Validation(
            "username must be 3-32 letters, digits, '.', '_' or '-'".into(),
        ));
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        warn!("password too short");
        return Err(AppError::Validation(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }

    let hash = hash_password(password)?;

    let Some(user) = state.store.create_user(username, &hash).await? else {
        warn!(%username, "username already registered");
        return Err(AppError::Auth(format!("username '{username}' is already taken")));
    };

    info!(user_id = user.id, username = %user.username, "user registered");
    let user = SessionUser::from(user);
    session.sign_in(user.clone());
    Ok(user)
}

#[instrument(skip(state, session, password))]
pub async fn login(
    state: &AppState,
    session: &mut Session,
    username: &str,
    password: &str,
) -> Result<SessionUser, AppError> {
    let username = username.trim();

    let Some(user) = state.store.find_user_by_username(username).await? else {
        warn!(%username, "login unknown username");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(%username, user_id = user.id, "login invalid password");
        return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
    }

    info!(user_id = user.id, %username, "user logged in");
    let user = SessionUser::from(user);
    session.sign_in(user.clone());
    Ok(user)
}

pub fn logout(session: &mut Session) -> Option<SessionUser> {
    let user = session.sign_out();
    if let Some(u) = &user {
        info!(user_id = u.id, "user logged out");
    }
    user
}

/// Removes the current user and all of their habits, then signs out.
#[instrument(skip(state, session))]
pub async fn delete_account(state: &AppState, session: &mut Session) -> Result<SessionUser, AppError> {
    let user_id = session.require_user()?.id;

    if state.store.delete_user(user_id).await? == 0 {
        return Err(AppError::NotFound("user"));
    }

    info!(user_id, "user deleted");
    session.sign_out().ok_or(AppError::NotLoggedIn)
}
