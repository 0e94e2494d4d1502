//! storefront-core - Authenticated request client for the storefront API.
//!
//! All calls to the backend flow through an [`ApiClient`]. It attaches the
//! current bearer [`Credential`], refreshes it once when the backend answers
//! 401, replays the request once, and tears the session down when the
//! credential cannot be recovered.
//!
//! The client talks to its collaborators through traits so each can be
//! swapped: [`Transport`](traits::Transport) for HTTP,
//! [`Refresher`](traits::Refresher) for the refresh endpoint,
//! [`CredentialStore`] for persistence and [`Navigator`](traits::Navigator)
//! for the login redirect.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_core::{ApiClient, ApiRequest, SessionState};
//! # use storefront_core::traits::{Transport, Refresher};
//!
//! # async fn example(transport: Arc<dyn Transport>, refresher: Arc<dyn Refresher>) -> storefront_core::Result<()> {
//! let session = SessionState::new();
//! let mut changes = session.subscribe();
//!
//! let client = ApiClient::builder(transport, refresher)
//!     .session(session)
//!     .navigator(Arc::new(|path: &str| println!("redirect to {path}")))
//!     .build();
//!
//! let orders = client.send(ApiRequest::get("/orders")).await?.error_for_status()?;
//! println!("{}", orders.text());
//! # let _ = changes.changed().await;
//! # Ok(())
//! # }
//! ```

pub mod auth;
pub mod client;
pub mod config;
pub mod credential;
pub mod endpoints;
pub mod error;
pub mod request;
pub mod session;
pub mod store;
pub mod traits;
pub mod types;

pub use auth::AuthApi;
pub use client::{ApiClient, ApiClientBuilder};
pub use config::{ClientConfig, RefreshMode};
pub use credential::Credential;
pub use error::Error;
pub use request::{ApiRequest, ApiResponse, Envelope, Method};
pub use session::{SessionState, SessionStatus};
pub use store::{CredentialStore, MemoryCredentialStore};
pub use traits::{Navigator, RefreshOutcome, Refresher, Transport};
pub use types::BaseUrl;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
