//! Bridges a physical lift, reachable through its vendor API, and a fleet coordination bus.
//!
//! The [`state_management::StateSynchronizer`] polls the lift and publishes its state; the
//! [`state_management::RequestCoordinator`] turns bus requests into device commands through the
//! mode-specific [`executors`].

pub mod config;
pub mod controllers;
pub mod errors;
pub mod executors;
pub mod init;
pub mod models;
pub mod services;
pub mod state_management;
pub mod utils;
