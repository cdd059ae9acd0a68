//! Authentication: session model, identity provider seam, durable storage
//! port, the session gate, and route guarding.
//!
//! SYSTEM CONTEXT
//! ==============
//! `gate` is the only writer of session state. Pages and the API client
//! read through it; `guard` turns its `{user, loading}` projection into
//! render/redirect decisions.

pub mod cognito;
pub mod forms;
pub mod gate;
pub mod guard;
pub mod provider;
pub mod session;
pub mod store;

pub use gate::{AuthPhase, AuthState, SESSION_STORAGE_KEY, SessionGate};
pub use provider::{AuthError, IdentityProvider, SignUpOutcome};
pub use session::Session;
pub use store::{FileStore, KeyValueStore, MemoryStore, StorageError};
