//! Command handlers

pub mod configure;
pub mod export;
