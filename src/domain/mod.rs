//! Core domain types and logic.

pub mod chart;
pub mod epoch;
pub mod error;
pub mod price;
pub mod settings;
pub mod solidity;
pub mod token_log;
