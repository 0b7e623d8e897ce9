pub mod admin;
pub mod auth;
pub mod collections;
pub mod dashboard;
pub mod donations;
pub mod storage;
