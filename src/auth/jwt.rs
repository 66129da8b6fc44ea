use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::debug;

use crate::{auth::claims::Claims, auth::repo_types::User, config::JwtConfig, state::AppState};

/// Signing and verification keys built once from `JwtConfig`.
#[derive(Clone)]
pub struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    issuer: String,
    audience: String,
    ttl: Duration,
}

impl JwtKeys {
    pub fn from_config(cfg: &JwtConfig) -> Self {
        Self {
            encoding: EncodingKey::from_secret(cfg.secret.as_bytes()),
            decoding: DecodingKey::from_secret(cfg.secret.as_bytes()),
            issuer: cfg.issuer.clone(),
            audience: cfg.audience.clone(),
            ttl: Duration::from_secs((cfg.ttl_minutes.max(0) as u64) * 60),
        }
    }

    pub fn sign(&self, user: &User) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc();
        let exp = now + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: user.id,
            email: user.email.clone(),
            name: user.name.clone(),
            surname: user.surname.clone(),
            iat: now.unix_timestamp() as usize,
            exp: exp.unix_timestamp() as usize,
            iss: self.issuer.clone(),
            aud: self.audience.clone(),
        };
        let token = encode(&Header::default(), &claims, &self.encoding)?;
        debug!(user_id = %user.id, "jwt signed");
        Ok(token)
    }

    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::default();
        validation.set_audience(std::slice::from_ref(&self.audience));
        validation.set_issuer(std::slice::from_ref(&self.issuer));
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(user_id = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        state.jwt.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn make_keys(secret: &str, issuer: &str, audience: &str, ttl_minutes: i64) -> JwtKeys {
        JwtKeys::from_config(&JwtConfig {
            secret: secret.into(),
            issuer: issuer.into(),
            audience: audience.into(),
            ttl_minutes,
        })
    }

    fn seller() -> User {
        User {
            id: Uuid::new_v4(),
            name: "Ana".into(),
            surname: "Ruiz".into(),
            email: "ana@example.com".into(),
            password_hash: String::new(),
            created_at: OffsetDateTime::now_utc(),
        }
    }

    #[test]
    fn sign_and_verify_token() {
        let keys = make_keys("dev-secret", "test-issuer", "test-aud", 5);
        let user = seller();
        let token = keys.sign(&user).expect("sign");
        let claims = keys.verify(&token).expect("verify token");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.email, "ana@example.com");
        assert_eq!(claims.name, "Ana");
        assert_eq!(claims.surname, "Ruiz");
        assert_eq!(claims.iss, "test-issuer");
        assert_eq!(claims.aud, "test-aud");
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn verify_rejects_wrong_issuer_or_audience() {
        let good_keys = make_keys("same-secret", "good-iss", "good-aud", 5);
        let bad_keys = make_keys("same-secret", "bad-iss", "bad-aud", 5);
        let token = good_keys.sign(&seller()).expect("sign");
        assert!(bad_keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_foreign_secret() {
        let ours = make_keys("ours", "iss", "aud", 5);
        let theirs = make_keys("theirs", "iss", "aud", 5);
        let token = theirs.sign(&seller()).expect("sign");
        assert!(ours.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        // Expired well past the default 60s leeway.
        let keys = make_keys("secret", "iss", "aud", 5);
        let user = seller();
        let past = OffsetDateTime::now_utc() - TimeDuration::hours(2);
        let claims = Claims {
            sub: user.id,
            email: user.email,
            name: user.name,
            surname: user.surname,
            iat: past.unix_timestamp() as usize,
            exp: (past + TimeDuration::minutes(1)).unix_timestamp() as usize,
            iss: "iss".into(),
            aud: "aud".into(),
        };
        let token = encode(&Header::default(), &claims, &keys.encoding).unwrap();
        assert!(keys.verify(&token).is_err());
    }
}
