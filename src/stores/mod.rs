pub mod user_store;
pub mod session_store;
pub mod activity_store;
pub mod block_store;
