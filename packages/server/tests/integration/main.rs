mod common;

mod auth;
mod rating;
