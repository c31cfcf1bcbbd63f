//! medport-core: session and authentication core for the medport portal client.
//!
//! The concrete HTTP and storage adapters live in `medport-plugins`; this crate only
//! knows about the [`storage::SecureStore`] and [`auth::AuthApi`] seams.

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod session;
pub mod storage;
