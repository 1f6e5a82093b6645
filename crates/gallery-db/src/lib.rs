//! gallery-db: persistence layer for picture records.
//!
//! This crate provides SQLite-backed storage with connection pooling,
//! embedded migrations, the [`models::Picture`] model, free query functions
//! in [`queries`] and the [`repository::PictureRepository`] seam used by the
//! gallery service.

pub mod migrations;
pub mod models;
pub mod pool;
pub mod queries;
pub mod repository;

pub use repository::{PictureRepository, SqlitePictureRepository};
