//! Derived metrics: percentage change and profit margin.
//!
//! All divisions are guarded; a zero or near-zero base yields a defined zero
//! instead of a fault.

pub mod derived;

#[cfg(test)]
mod props;

pub use derived::{
    PercentageChange, PeriodComparison, ProfitMargin, company_margin, compare_periods,
    percentage_change, profit_margin,
};
