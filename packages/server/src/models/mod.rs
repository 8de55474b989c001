pub mod admin;
pub mod auth;
pub mod rating;
pub mod shared;
pub mod store;
pub mod user;
