pub mod app_state;
pub mod cache;
pub mod config;
pub mod errors;
pub mod gateway;
pub mod models;
pub mod notify;
pub mod realtime;
pub mod session;
pub mod utils;
pub mod workflow;

pub use errors::{GatePassError, GatePassResult};
