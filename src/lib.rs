//! # cloudchef
//!
//! Client core for the CloudChef meal-planning front end.
//!
//! ARCHITECTURE
//! ============
//! UI surfaces (pages, the `cloudchef` CLI) never talk to the network
//! directly. They go through two components:
//!
//! - [`auth::SessionGate`] owns the identity-provider session: restore on
//!   startup, sign-in/out, token refresh, and change notification.
//! - [`api::ApiClient`] issues JSON calls to the remote API, attaching the
//!   gate's identity token as a bearer credential.
//!
//! Both are handles (`Clone`, `Arc` inside) passed explicitly to whatever
//! needs them.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;

#[cfg(test)]
pub(crate) mod test_helpers;
