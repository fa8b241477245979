pub mod display;
mod repo;
pub mod repo_types;
pub mod services;
