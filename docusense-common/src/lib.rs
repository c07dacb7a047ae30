//! # DocuSense Common Library
//!
//! Shared code for the DocuSense services:
//! - Ticket model and database initialization
//! - Bootstrap configuration loading
//! - Common error types

pub mod config;
pub mod db;
pub mod error;

pub use error::{Error, Result};
