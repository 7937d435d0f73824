mod repository;

pub use repository::*;

/// SQL migration for the core back-office schema
pub const MIGRATION_001_INITIAL: &str = include_str!("migrations/001_initial.sql");

/// SQL migration for the content subsystems
pub const MIGRATION_002_CONTENT: &str = include_str!("migrations/002_content.sql");
