//! `edulearn-core` -- pure learning-progress logic.
//!
//! Lesson gating, progress aggregation and certificate layout for the
//! EduLearn client. The crate performs no I/O: callers fetch courses,
//! enrollments and progress records from the REST API and pass them in,
//! re-deriving view state whenever fresh data arrives.

pub mod aggregation;
pub mod certificate;
pub mod error;
pub mod models;
pub mod progress;
pub mod sequencing;
pub mod types;
