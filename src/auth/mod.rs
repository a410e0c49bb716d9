pub mod admin;
pub mod middleware;
pub mod rate_limit;
pub mod session;
pub mod validate;
