/*
 * HashSwap client core
 * Library exports and module declarations
 */

pub mod backend;
pub mod config;
pub mod liquidity;
pub mod models;
pub mod pools;
pub mod quote;
pub mod service;
pub mod session;
pub mod units;
pub mod utils;

pub use config::{Deployment, DeploymentConfig};
pub use models::*;
pub use service::SwapService;
