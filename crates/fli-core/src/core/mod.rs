pub mod config;
pub mod gateway;
pub mod runtime;
pub mod tooling;
pub mod volumes;
pub mod workflow;
