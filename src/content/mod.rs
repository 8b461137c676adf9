//! Lesson content.
//!
//! Lessons are authored as JSON and deserialized into typed [`Question`]s.
//! Loading is the only I/O in the crate; everything downstream works on
//! the parsed [`LessonCatalog`].
//!
//! [`Question`]: crate::domain::Question

pub mod lessons;

pub use lessons::{ContentError, Lesson, LessonCatalog, load_catalog};
