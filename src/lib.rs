pub mod application;
pub mod commands;
pub mod http;
pub mod packages;
pub mod registry;
pub mod runtime;
