//! Bloom storefront library.
//!
//! The delivery quote API as a library, so the router can be exercised in
//! tests without binding a socket.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
pub mod state;
