pub mod auth_service;
pub mod import_service;
pub mod score_service;

pub use import_service::{import_scores, ImportReport};
