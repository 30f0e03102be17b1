//! Typed API client for the production workflow backend.
//!
//! Wraps the REST surface with a persisted bearer-token session, a
//! tag-invalidated response cache, and the transition-aware order calls.

pub mod api;
pub mod cache;
pub mod error;
pub mod session;

pub use api::ApiClient;
pub use cache::{QueryCache, QueryTag};
pub use error::{ClientError, ClientResult};
pub use session::{Session, SessionStore};
