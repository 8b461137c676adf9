pub mod config;
pub mod content;
pub mod domain;
pub mod progression;
pub mod session;
pub mod validation;
