//! realprices: historical price tooling for market simulation tests.
//!
//! Buckets market price history into simulation epochs, emits it as a
//! Solidity literal, and charts simulation log output against it.
//!
//! Hexagonal layout: domain logic in [`domain`], port traits in [`ports`],
//! concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod logging;
pub mod ports;
