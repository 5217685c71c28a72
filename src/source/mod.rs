//! Retrieval abstraction layer.
//!
//! This module defines the [`Retrieve`] trait that the fetch controller calls
//! to obtain one payload for one URL, the [`FetchError`] failure descriptor,
//! and the [`Gist`] payload type.  The concrete HTTP implementation lives in
//! [`http`].
//!
//! ## For contributors: adding a new source
//!
//! 1. Create a new file in this directory (e.g. `file.rs`).
//! 2. Define a struct and implement [`Retrieve`] for the payload it produces.
//! 3. Add `mod file;` below and re-export your struct in the `pub use` block.
//! 4. Hand an `Arc` of it to the controllers built in `main.rs`.
//!
//! The controller, panels, and UI never look past the trait.

mod gist;
mod http;
#[cfg(test)]
pub mod scripted;

pub use gist::Gist;
#[cfg(test)]
pub use gist::GistOwner;
pub use http::{public_gists_url, user_gists_url, HttpSource};

use async_trait::async_trait;
use thiserror::Error;

/// Why a retrieval failed.
///
/// Transport and application failures are reported the same way: the UI only
/// ever shows the [`Display`](std::fmt::Display) message.  Cancellation is not
/// a failure and has no variant here.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// DNS, connect, TLS, timeout, or body read failure.
    #[error("Network error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("Request failed with status code {0} ({1})")]
    Status(u16, String),

    /// The body arrived but could not be parsed.
    #[error("Invalid response body: {0}")]
    Decode(String),
}

/// Performs one asynchronous retrieval for one identifier.
///
/// Implementations must be [`Send`] + [`Sync`] because the controller moves an
/// `Arc` of them into a spawned task.
///
/// ```ignore
/// struct Canned(Vec<Gist>);
///
/// #[async_trait]
/// impl Retrieve<Vec<Gist>> for Canned {
///     async fn retrieve(&self, _url: &str) -> Result<Vec<Gist>, FetchError> {
///         Ok(self.0.clone())
///     }
/// }
/// ```
#[async_trait]
pub trait Retrieve<T>: Send + Sync {
    /// Fetch the payload stored at `url`.
    async fn retrieve(&self, url: &str) -> Result<T, FetchError>;
}
