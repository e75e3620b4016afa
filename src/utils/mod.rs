// src/utils/mod.rs
pub mod keys;
pub mod precision;
