//! Ladderforge - adaptive-bitrate HLS packaging
//!
//! The binary is a thin shell over the `lf-*` crates. This library crate
//! exposes config discovery so integration tests can exercise it.

pub mod config;
