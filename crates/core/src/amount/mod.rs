//! Amount normalization.
//!
//! Every monetary value entering the engine passes through [`normalize`],
//! which turns numbers, locale-formatted strings, and missing values into one
//! canonical [`MonetaryAmount`](keel_shared::types::MonetaryAmount).

pub mod normalize;

#[cfg(test)]
mod props;

pub use normalize::{RawAmount, normalize, normalize_str};
