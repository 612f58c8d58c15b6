pub mod admin;
pub mod clock;
pub mod config;
pub mod error;
pub mod live;
pub mod logs;
pub mod registry;
pub mod rpc;
pub mod server;
pub mod store;
pub mod types;
