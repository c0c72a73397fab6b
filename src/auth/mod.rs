pub mod password;
pub mod license;
pub mod session;
pub mod guards;
