//! HTTP handlers

pub mod audit;
pub mod health;
