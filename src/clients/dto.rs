use async_graphql::InputObject;

/// Client fields accepted by create and update; update replaces all of them.
#[derive(Debug, Clone, InputObject)]
pub struct ClientInput {
    pub name: String,
    pub surname: String,
    pub company: String,
    pub email: String,
    pub phone: Option<String>,
}
