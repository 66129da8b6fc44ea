use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// JWT payload issued on authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,       // user ID
    pub email: String,
    pub name: String,
    pub surname: String,
    pub iat: usize,      // issued at (unix timestamp)
    pub exp: usize,      // expires at (unix timestamp)
    pub iss: String,
    pub aud: String,
}
