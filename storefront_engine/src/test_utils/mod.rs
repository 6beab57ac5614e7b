//! Helpers for integration tests: throwaway SQLite databases and seed data.
pub mod prepare_env;
pub mod seed;
