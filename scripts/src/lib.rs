//! Scripts for deploying new logic behind UUPS proxies and upgrading them.

#![deny(missing_docs)]
#![deny(clippy::missing_docs_in_private_items)]

pub mod calldata;
pub mod cli;
mod commands;
pub mod config;
pub mod constants;
pub mod deploy;
pub mod errors;
pub mod pipeline;
pub mod prompt;
pub mod proxy;
pub mod registry;
pub mod types;
pub mod utils;
pub mod verify;
