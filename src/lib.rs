pub mod badge;
pub mod cache;
pub mod client;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod logging;
pub mod registry;
pub mod request;
pub mod resource;
pub mod server;
pub mod source;
