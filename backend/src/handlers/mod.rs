pub mod activity;
pub mod auth;
pub mod events;
pub mod users;
