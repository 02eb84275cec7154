//! Core types and trait definitions for the Feedline social feed.
//!
//! This crate is deliberately free of HTTP and database dependencies. Storage
//! backends implement the traits in [`store`]; transports drive the
//! [`Service`].

pub mod error;
pub mod page;
pub mod post;
pub mod service;
pub mod store;
pub mod time;
pub mod user;
pub mod view;

pub use error::{Error, ErrorKind, Result};
pub use service::Service;
