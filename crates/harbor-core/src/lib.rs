//! # Harbor Core
//!
//! Core types, traits, and error handling for the Harbor script host.
//!
//! This crate provides the foundational abstractions the routing and
//! validation engine is built on:
//! - Request facade and write-once response facade
//! - Handler trait and per-dispatch context
//! - Collaborator interfaces (database, crypto, mail, money, templates,
//!   static assets)
//! - Error types

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

pub mod collab;
pub mod error;
pub mod handler;
pub mod request;
pub mod response;

pub use collab::Collaborators;
pub use error::{Error, Result};
pub use handler::{handler_fn, Context, Handler, HandlerFn};
pub use request::{FormData, Request};
pub use response::{Body, Response};

// Re-export commonly used HTTP types
pub use bytes::Bytes;
pub use http::{Method, StatusCode};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::collab::Collaborators;
    pub use crate::error::{Error, Result};
    pub use crate::handler::{handler_fn, Context, Handler};
    pub use crate::request::Request;
    pub use crate::response::Response;
}
