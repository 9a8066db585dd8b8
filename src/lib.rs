#![forbid(unsafe_code)]

//! Public entry point for the reusable TubeDigest Rust crate.
//!
//! The crate collects the building blocks of the playlist builder — config,
//! time windows, the platform client, search, playlist sync, and naming —
//! so binaries can share them and tests can exercise each piece with an
//! in-memory platform fake.

pub mod config;
pub mod naming;
pub mod playlist;
pub mod search;
pub mod window;
pub mod youtube;
