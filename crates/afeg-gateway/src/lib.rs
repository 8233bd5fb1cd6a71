//! AFEG gateway daemon library.
//!
//! Wires the valuation engine, governance gate, and session ledgers into a
//! REST service (`afegd`). All mutable session state lives in an explicit
//! [`session::AuditorSession`] behind the shared [`api::state::AppState`];
//! there is no process-wide singleton.

#![deny(unsafe_code)]

pub mod api;
pub mod config;
pub mod error;
pub mod server;
pub mod session;
