pub mod analysis;
pub mod config;
pub mod llm;
pub mod web;
