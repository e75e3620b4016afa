// src/lib.rs
//! Helpers shared by the trading bot: price formatting, value comparison for log
//! lines, and a sanity check for the exchange API private key.

pub mod config;
pub mod error;
pub mod logging;
pub mod utils;

pub use error::{Error, InvalidKeyError, Result};
pub use utils::keys::{is_valid_ec_private_key, validate_ec_private_key};
pub use utils::precision::{compare, truncate, AsNumber, Number, DEFAULT_PRECISION};
