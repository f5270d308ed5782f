//! Account business logic - Registration, login, and user management.
//!
//! Emails are trimmed and lowercased before they are stored or looked up, so
//! `Ada@Example.com` and `ada@example.com` are the same account. Passwords only
//! ever reach the store as bcrypt hashes.

use crate::{
    auth::password::{hash_password, verify_password},
    config::AppConfig,
    entities::user,
    errors::{Error, Result},
    store::{NewUser, UserChanges, UserRepository},
};
use tracing::{debug, info, instrument};

/// Shortest accepted password
pub const MIN_PASSWORD_LEN: usize = 6;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

/// Registration input with a plain-text password
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Display name
    pub full_name: String,
    /// Login email
    pub email: String,
    /// Plain-text password, hashed before storage
    pub password: String,
}

/// Partial account update; `None` leaves a field unchanged
#[derive(Debug, Clone, Default)]
pub struct AccountChanges {
    /// New display name
    pub full_name: Option<String>,
    /// New login email
    pub email: Option<String>,
    /// New plain-text password
    pub password: Option<String>,
}

fn normalized_email(email: &str) -> Result<String> {
    let email = email.trim().to_lowercase();
    if !email.contains('@') {
        return Err(Error::validation("Invalid email address"));
    }
    Ok(email)
}

fn checked_name(full_name: &str) -> Result<String> {
    let trimmed = full_name.trim();
    if trimmed.is_empty() {
        return Err(Error::validation("Full name cannot be empty"));
    }
    Ok(trimmed.to_string())
}

fn checked_password(password: &str) -> Result<&str> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(Error::validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(password)
}

async fn ensure_email_free<S: UserRepository>(
    store: &S,
    email: &str,
    owner: Option<i64>,
) -> Result<()> {
    match store.find_user_by_email(email).await? {
        Some(existing) if Some(existing.id) != owner => Err(Error::Conflict {
            message: "User with that email already exists".to_string(),
        }),
        _ => Ok(()),
    }
}

/// Creates a new account.
///
/// The account gets the admin role when its email is listed in
/// `config.admin_emails`, and the user role otherwise.
///
/// # Errors
/// Returns an error if:
/// - The name is empty, the email has no `@`, or the password is too short
/// - An account with the same email exists, even a deleted one ([`Error::Conflict`])
/// - Hashing or the database insert fails
#[instrument(skip(store, account, config), fields(email = %account.email))]
pub async fn register<S: UserRepository>(
    store: &S,
    account: NewAccount,
    config: &AppConfig,
) -> Result<user::Model> {
    let full_name = checked_name(&account.full_name)?;
    let email = normalized_email(&account.email)?;
    let password = checked_password(&account.password)?;

    ensure_email_free(store, &email, None).await?;

    let role = if config.is_admin_email(&email) {
        user::ROLE_ADMIN
    } else {
        user::ROLE_USER
    };
    let password_hash = hash_password(password, config.auth.bcrypt_cost)?;
    let user = store
        .insert_user(NewUser {
            full_name,
            email,
            password_hash,
            role: role.to_string(),
        })
        .await?;

    info!("Registered user {} with role '{}'", user.id, user.role);
    Ok(user)
}

/// Checks an email and password pair and returns the matching account.
///
/// # Errors
/// Returns [`Error::Unauthorized`] for an unknown or deleted email and for a wrong
/// password, with the same message in every case.
#[instrument(skip(store, password))]
pub async fn authenticate<S: UserRepository>(
    store: &S,
    email: &str,
    password: &str,
) -> Result<user::Model> {
    let email = email.trim().to_lowercase();
    let user = store
        .find_user_by_email(&email)
        .await?
        .filter(|u| !u.is_deleted)
        .ok_or_else(|| Error::unauthorized(INVALID_CREDENTIALS))?;

    if !verify_password(password, &user.password_hash) {
        debug!(user_id = user.id, "Password mismatch");
        return Err(Error::unauthorized(INVALID_CREDENTIALS));
    }
    Ok(user)
}

/// Retrieves an active account by id.
///
/// # Errors
/// Returns [`Error::UserNotFound`] if the account does not exist or is deleted.
pub async fn get_user<S: UserRepository>(store: &S, user_id: i64) -> Result<user::Model> {
    store
        .find_user(user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })
}

/// Retrieves all active accounts ordered by id.
pub async fn list_users<S: UserRepository>(store: &S) -> Result<Vec<user::Model>> {
    store.list_users().await
}

/// Applies a partial update to an account. A new password is re-hashed.
///
/// # Errors
/// Returns an error if:
/// - A present field fails the same validation as registration
/// - The new email belongs to another account ([`Error::Conflict`])
/// - The account does not exist or is deleted
#[instrument(skip(store, changes))]
pub async fn update_user<S: UserRepository>(
    store: &S,
    user_id: i64,
    changes: AccountChanges,
    bcrypt_cost: u32,
) -> Result<user::Model> {
    let full_name = changes.full_name.as_deref().map(checked_name).transpose()?;
    let email = changes.email.as_deref().map(normalized_email).transpose()?;
    let password_hash = changes
        .password
        .as_deref()
        .map(|p| checked_password(p).and_then(|p| hash_password(p, bcrypt_cost)))
        .transpose()?;

    if let Some(email) = &email {
        ensure_email_free(store, email, Some(user_id)).await?;
    }

    let user = store
        .update_user(
            user_id,
            UserChanges {
                full_name,
                email,
                password_hash,
                role: None,
            },
        )
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;
    info!("Updated user {}", user.id);
    Ok(user)
}

/// Soft deletes an account. Its email stays reserved.
///
/// # Errors
/// Returns [`Error::UserNotFound`] if the account does not exist or is already deleted.
#[instrument(skip(store))]
pub async fn delete_user<S: UserRepository>(store: &S, user_id: i64) -> Result<user::Model> {
    let user = store
        .soft_delete_user(user_id)
        .await?
        .ok_or(Error::UserNotFound { id: user_id })?;
    info!("Soft-deleted user {}", user.id);
    Ok(user)
}

/// Grants the admin role to existing accounts whose email is configured as admin.
///
/// Run at startup so adding an email to the configuration takes effect for an
/// account that registered earlier. Returns the number of promoted accounts.
pub async fn promote_configured_admins<S: UserRepository>(
    store: &S,
    config: &AppConfig,
) -> Result<usize> {
    let mut promoted = 0;
    for email in &config.admin_emails {
        let email = email.trim().to_lowercase();
        let Some(user) = store.find_user_by_email(&email).await? else {
            continue;
        };
        if user.is_deleted || user.is_admin() {
            continue;
        }

        store
            .update_user(
                user.id,
                UserChanges {
                    role: Some(user::ROLE_ADMIN.to_string()),
                    ..UserChanges::default()
                },
            )
            .await?;
        info!("Promoted user {} to admin", user.id);
        promoted += 1;
    }
    Ok(promoted)
}
