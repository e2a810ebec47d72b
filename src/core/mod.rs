pub mod analyzer;
pub mod auth;
pub mod browser;
pub mod config;
pub mod errors;
pub mod extractor;
pub mod google_sheets;
pub mod llm;
pub mod models;
pub mod profile_page;
pub mod prompts;
pub mod row_store;
pub mod service;
