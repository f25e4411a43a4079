pub mod api;
pub mod config;
pub mod controller;
pub mod http;
pub mod session;
