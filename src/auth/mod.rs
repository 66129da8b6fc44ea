pub mod claims;
pub mod dto;
pub mod extractors;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod repo_types;
pub mod services;
