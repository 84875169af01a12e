//! HTTP request handlers.

pub mod admin;
pub mod health;
pub mod predict;

pub use admin::*;
pub use health::*;
pub use predict::*;
