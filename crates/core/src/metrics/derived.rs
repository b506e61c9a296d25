//! Percentage change and profit margin.

use keel_shared::types::{MonetaryAmount, PercentPrecision, round_half_up};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::reconciliation::ReportTotals;

/// Below this magnitude a previous value counts as zero.
const CHANGE_EPSILON: Decimal = Decimal::from_parts(1, 0, 0, false, 5);

/// Direction and rounded magnitude of a change between two values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PercentageChange {
    /// Rounded magnitude of the change, in percent.
    pub value: Decimal,
    /// True when the value went up.
    pub is_increase: bool,
}

impl PercentageChange {
    /// Returned when there is no meaningful base to compare against.
    pub const ZERO: Self = Self {
        value: Decimal::ZERO,
        is_increase: false,
    };
}

/// Percentage change from `previous` to `current`.
///
/// When `|previous| < 0.00001` the result is [`PercentageChange::ZERO`].
#[must_use]
pub fn percentage_change(
    current: Decimal,
    previous: Decimal,
    precision: PercentPrecision,
) -> PercentageChange {
    if previous.abs() < CHANGE_EPSILON {
        return PercentageChange::ZERO;
    }

    let change = current
        .checked_sub(previous)
        .and_then(|delta| delta.checked_div(previous.abs()))
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED));

    match change {
        Some(change) => PercentageChange {
            value: round_half_up(change.abs(), precision.digits()),
            is_increase: change > Decimal::ZERO,
        },
        None => PercentageChange::ZERO,
    }
}

/// Net profit and margin of a period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfitMargin {
    /// Income minus expenses.
    pub net_profit: MonetaryAmount,
    /// Net profit as a percentage of income.
    pub margin_percent: Decimal,
}

/// Net profit and margin, the margin rounded to `precision`.
///
/// The margin is zero when income is exactly zero.
#[must_use]
pub fn profit_margin(
    income: MonetaryAmount,
    expenses: MonetaryAmount,
    precision: PercentPrecision,
) -> ProfitMargin {
    ProfitMargin {
        net_profit: income - expenses,
        margin_percent: round_half_up(raw_margin(income, expenses), precision.digits()),
    }
}

/// Company margin as shown in reports (two digits).
#[must_use]
pub fn company_margin(revenue: MonetaryAmount, costs: MonetaryAmount) -> ProfitMargin {
    profit_margin(revenue, costs, PercentPrecision::Report)
}

/// Unrounded margin percentage.
pub(crate) fn raw_margin(income: MonetaryAmount, expenses: MonetaryAmount) -> Decimal {
    if income.is_zero() {
        return Decimal::ZERO;
    }
    let net = (income - expenses).as_decimal();
    net.checked_div(income.as_decimal())
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or_default()
}

/// Period-over-period changes of the headline figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodComparison {
    /// Revenue change.
    pub revenue: PercentageChange,
    /// Cost change.
    pub costs: PercentageChange,
    /// Net profit change.
    pub net_profit: PercentageChange,
    /// Outstanding balance change.
    pub outstanding: PercentageChange,
}

/// Compares the totals of two reconciliations.
#[must_use]
pub fn compare_periods(
    current: &ReportTotals,
    previous: &ReportTotals,
    precision: PercentPrecision,
) -> PeriodComparison {
    let change = |now: MonetaryAmount, before: MonetaryAmount| {
        percentage_change(now.as_decimal(), before.as_decimal(), precision)
    };
    PeriodComparison {
        revenue: change(current.revenue, previous.revenue),
        costs: change(current.costs, previous.costs),
        net_profit: change(current.net_profit(), previous.net_profit()),
        outstanding: change(current.outstanding, previous.outstanding),
    }
}
