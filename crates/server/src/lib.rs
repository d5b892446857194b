//! Velvet server library.
//!
//! This crate provides the REST backend as a library, allowing it to be
//! driven in-process by the integration tests.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod catalog;
pub mod config;
pub mod error;
pub mod middleware;
pub mod payment;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
