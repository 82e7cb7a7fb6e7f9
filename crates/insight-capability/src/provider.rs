//! Generative capability trait

use crate::error::CapabilityError;
use crate::request::CapabilityRequest;
use crate::response::CapabilityResponse;
use async_trait::async_trait;

/// A remote generative model.
///
/// One call is one request/response exchange. Implementations do not retry;
/// retrying is the caller's policy.
#[async_trait]
pub trait GenerativeCapability: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Perform one generation call
    async fn generate(&self, request: CapabilityRequest)
        -> Result<CapabilityResponse, CapabilityError>;
}
