pub mod admin;
pub mod auth;
pub mod rating;
pub mod store;
