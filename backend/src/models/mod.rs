//! Data models shared across database access and API handlers.

pub mod activity;
pub mod event;
pub mod session;
pub mod user;
