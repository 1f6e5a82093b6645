//! Gallery - blogger picture management
//!
//! This library crate exposes the gallery service and its file store for the
//! `gallery` binary and for integration testing.

pub mod config;
pub mod locks;
pub mod service;
pub mod storage;

pub use service::{Compensation, GalleryService};
pub use storage::{FileStore, LocalFileStore};
