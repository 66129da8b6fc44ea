use async_graphql::InputObject;

#[derive(Debug, Clone, InputObject)]
pub struct ProductInput {
    pub name: String,
    pub stock: i32,
    pub price: f64,
}
