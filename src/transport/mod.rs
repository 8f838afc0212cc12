use async_trait::async_trait;

use crate::error::Result;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{HttpTransport, TransportConfig};

/// Delivers a URL-encoded request body to the gateway and returns the raw reply.
///
/// Implementations must not retry: a resubmitted payment may be executed twice.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POSTs `body` as `application/x-www-form-urlencoded` to `url`.
    ///
    /// # Returns
    ///
    /// The full response body, trimmed of surrounding whitespace.
    async fn post_form(&self, url: &str, body: String) -> Result<String>;
}
