//! `edulearn-client` library crate.
//!
//! Typed access to the EduLearn REST API and the learning flow that feeds
//! fetched courses, enrollments and progress into `edulearn-core`. The
//! binary entrypoint lives in `main.rs`.

pub mod api;
pub mod config;
pub mod error;
pub mod learning;
pub mod session;
