//! Core types for the FundSpace content ingestion backend
//!
//! This crate defines the shared data structures used across the workspace:
//! the canonical article record, feed source configuration, and errors.

pub mod article;
pub mod error;
pub mod feed;

pub use article::{Article, ArticlesResponse, ErrorResponse, SUMMARY_MAX_CHARS};
pub use error::{FundspaceError, FundspaceResult};
pub use feed::{FeedCatalog, FeedSource};
