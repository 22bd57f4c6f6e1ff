//! Koban - a client for smart-wallet provisioning and signing flows
//!
//! This crate drives a wallet-as-a-service backend through its full signing
//! pipeline: provision a smart wallet, build a transaction, sign the user
//! operation hash locally, submit the signature, and poll the transaction
//! until the backend reports a terminal status. The same operations are
//! exposed individually as function-calling tools.

pub mod agent;
pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod prelude;
pub mod registry;
pub mod signer;
pub mod token;
pub mod tool;
pub mod tools;

pub use error::{Error, Result, SignerError, ToolError};
