//! reqwest-backed transport.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tracing::{debug, instrument, trace};

use storefront_core::error::TransportError;
use storefront_core::{ApiRequest, ApiResponse, BaseUrl, ClientConfig, Method, Result, Transport};

use crate::cookies::CookieJar;
use crate::error::transport_error;

/// Build the HTTP client shared by the transport and the refresh client.
///
/// The client stores cookies in `jar` so the refresh call carries the session
/// cookie set by login, and applies the configured per-call timeout.
pub fn build_http_client(config: &ClientConfig, jar: &CookieJar) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(concat!("storefront/", env!("CARGO_PKG_VERSION")))
        .timeout(config.timeout)
        .cookie_provider(jar.provider())
        .build()
        .map_err(transport_error)?;
    Ok(client)
}

/// Sends [`ApiRequest`]s to the configured backend.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    base: BaseUrl,
}

impl HttpTransport {
    pub fn new(client: reqwest::Client, base: BaseUrl) -> Self {
        Self { client, base }
    }

    pub fn base(&self) -> &BaseUrl {
        &self.base
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Patch => reqwest::Method::PATCH,
        Method::Delete => reqwest::Method::DELETE,
    }
}

/// Read a reqwest response into the transport-neutral form.
pub(crate) async fn read_response(
    response: reqwest::Response,
) -> std::result::Result<ApiResponse, TransportError> {
    let status = response.status().as_u16();
    let headers: BTreeMap<String, String> = response
        .headers()
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    let body = response.bytes().await.map_err(transport_error)?;
    Ok(ApiResponse::new(status, headers, body.to_vec()))
}

#[async_trait]
impl Transport for HttpTransport {
    #[instrument(skip(self, request), fields(method = %request.method(), path = request.path()))]
    async fn execute(&self, request: ApiRequest) -> std::result::Result<ApiResponse, TransportError> {
        let url = self.base.endpoint(request.path());
        debug!(%url, authenticated = request.header_value("authorization").is_some(), "HTTP request");

        let mut builder = self
            .client
            .request(to_reqwest_method(request.method()), &url);

        if !request.query_pairs().is_empty() {
            builder = builder.query(request.query_pairs());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(transport_error)?;
        trace!(status = %response.status(), "HTTP response");

        read_response(response).await
    }
}
