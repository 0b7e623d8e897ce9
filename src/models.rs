pub mod auth;
pub mod collection;
pub mod dashboard;
pub mod donation;
pub mod profile;
