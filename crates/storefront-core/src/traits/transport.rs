//! Outbound HTTP transport trait.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{ApiRequest, ApiResponse};

/// Performs one HTTP exchange.
///
/// Every status code, including 401 and 5xx, is a successful exchange and
/// comes back as an [`ApiResponse`]. Only failures to obtain a response at
/// all are errors.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, TransportError>;
}
