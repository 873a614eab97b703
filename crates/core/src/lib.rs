//! Core business logic for scribe.

pub mod pagination;
pub mod services;

pub use pagination::{Page, clamp_page, parse_page, total_pages};
pub use services::*;
