pub mod user;
pub mod session;
pub mod activity;
pub mod block;
pub mod api;
