//! Client library for the Internet Payment Cashier (IPC) gateway protocol.
//!
//! This crate builds signed payment requests, delivers them either as a direct
//! POST or as an auto-submitting HTML form, and verifies the signed replies and
//! notify callbacks coming back from the gateway.

/// Merchant credentials and endpoint settings
pub mod config;

/// RSA key import, sign, verify and field encryption
pub mod crypto;

/// Protocol constants, output formats and status codes
pub mod defines;

/// Error types
pub mod error;

/// HTML escaping and field format checks
pub mod helper;

/// Payment operations (purchase, refund, authorization, mandates, ...)
pub mod operations;

/// Ordered request parameters
pub mod params;

/// Ordered request builder and signed request
pub mod request;

/// Response parsing and signature verification
pub mod response;

/// Canonical signable string and detached signatures
pub mod signature;

/// Gateway transport (HTTPS POST)
pub mod transport;

#[cfg(test)]
mod test_utils;

pub use config::{Config, ConfigBuilder};
pub use crypto::DigestAlgorithm;
pub use defines::{KeyCase, OutputFormat, Status};
pub use error::{ErrorKind, IpcError, Result};
pub use request::{IpcRequest, SignedRequest};
pub use response::Response;
pub use transport::Transport;
#[cfg(feature = "http")]
pub use transport::{HttpTransport, TransportConfig};
