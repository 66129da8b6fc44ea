use async_graphql::{InputObject, SimpleObject};

/// Registration payload.
#[derive(Debug, Clone, InputObject)]
pub struct UserInput {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub password: String,
}

/// Login payload.
#[derive(Debug, Clone, InputObject)]
pub struct AuthInput {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, SimpleObject)]
pub struct Token {
    pub token: String,
}
