pub mod client;
pub mod config;
pub mod errors;
pub mod kernel;
pub mod pagination;
pub mod response;
