//! cidades-harvest library — municipal demographic indicator collection
//! from the IBGE Cidades portal.
//!
//! The binary in `main.rs` is a thin clap front-end; everything with
//! behavior lives here so integration tests can drive it directly.

pub mod cli;
pub mod error;
pub mod export;
pub mod extract;
pub mod harvest;
pub mod locations;
pub mod navigation;
pub mod session;
