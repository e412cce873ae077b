//! API layer - in-process client over the domain service

pub mod native;
