use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{AuthInput, Token, UserInput},
        jwt::JwtKeys,
        password::{check_strength, hash_password, verify_password},
        repo_types::{NewUser, User},
    },
    error::{ServiceError, ServiceResult},
    store::Store,
};

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

fn require_text(field: &str, value: &str) -> ServiceResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ServiceError::validation(format!("{field} must not be empty")));
    }
    Ok(value.to_string())
}

#[instrument(skip(store, input), fields(email = %input.email))]
pub async fn register(store: &dyn Store, input: UserInput) -> ServiceResult<User> {
    let email = normalize_email(&input.email);

    if !is_valid_email(&email) {
        warn!("invalid email");
        return Err(ServiceError::validation("invalid email"));
    }
    check_strength(&input.password).inspect_err(|_| warn!("password too short"))?;
    let name = require_text("name", &input.name)?;
    let surname = require_text("surname", &input.surname)?;

    if store.find_user_by_email(&email).await?.is_some() {
        warn!("email already registered");
        return Err(ServiceError::AlreadyExists { entity: "user", email });
    }

    let password_hash = hash_password(&input.password)?;
    let user = store
        .insert_user(NewUser { name, surname, email, password_hash })
        .await?;

    info!(user_id = %user.id, "user registered");
    Ok(user)
}

#[instrument(skip(store, keys, input), fields(email = %input.email))]
pub async fn authenticate(
    store: &dyn Store,
    keys: &JwtKeys,
    input: AuthInput,
) -> ServiceResult<Token> {
    let email = normalize_email(&input.email);

    let Some(user) = store.find_user_by_email(&email).await? else {
        warn!("login unknown email");
        return Err(ServiceError::InvalidCredentials);
    };

    let ok = verify_password(&input.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login invalid password");
        return Err(ServiceError::InvalidCredentials);
    }

    let token = keys.sign(&user).map_err(ServiceError::Internal)?;
    info!(user_id = %user.id, "user logged in");
    Ok(Token { token })
}
