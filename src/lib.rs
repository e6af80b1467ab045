pub mod api;
pub mod auth;
pub mod cli;
pub mod core;
pub mod dispatch;
pub mod google;
