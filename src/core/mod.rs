//! Core translation engine module

pub mod cancel;
pub mod client;
pub mod config;
pub mod errors;
pub mod languages;
pub mod models;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;
