//! Reconciliation report types.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use keel_shared::types::{
    BookingId, CurrencyCode, ExpenseId, MonetaryAmount, OrderId, PaymentId, PercentPrecision,
};
use rust_decimal::Decimal;
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};

use crate::extraction::PaymentItem;
use crate::metrics::{PeriodComparison, compare_periods};
use crate::metrics::derived::raw_margin;
use crate::records::{OwnerSlotKind, PaymentStatus};

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Reporting window used for daily averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    /// Window start.
    pub start: DateTime<Utc>,
    /// Window end.
    pub end: DateTime<Utc>,
}

impl DateRange {
    /// Creates a window between two instants.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Creates a window between two calendar dates, at midnight UTC.
    #[must_use]
    pub fn from_dates(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start: start.and_time(chrono::NaiveTime::MIN).and_utc(),
            end: end.and_time(chrono::NaiveTime::MIN).and_utc(),
        }
    }

    /// Whole days covered, rounded up, never less than one.
    #[must_use]
    pub fn days(&self) -> i64 {
        let millis = (self.end - self.start).num_milliseconds();
        if millis <= 0 {
            return 1;
        }
        ((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY).max(1)
    }
}

/// Headline totals.
///
/// Net profit and margin are derived from revenue and costs whenever they are
/// read; they are never stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReportTotals {
    /// Booking, order, and other revenue.
    pub revenue: MonetaryAmount,
    /// Paid expenses and signed owner payments.
    pub costs: MonetaryAmount,
    /// Booking and order balances still due.
    pub outstanding: MonetaryAmount,
}

impl ReportTotals {
    /// Revenue minus costs; may be negative.
    #[must_use]
    pub fn net_profit(&self) -> MonetaryAmount {
        self.revenue - self.costs
    }

    /// Net profit as a percentage of revenue, zero without revenue.
    #[must_use]
    pub fn profit_margin(&self) -> Decimal {
        raw_margin(self.revenue, self.costs)
    }
}

impl Serialize for ReportTotals {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("ReportTotals", 5)?;
        state.serialize_field("revenue", &self.revenue)?;
        state.serialize_field("costs", &self.costs)?;
        state.serialize_field("outstanding", &self.outstanding)?;
        state.serialize_field("netProfit", &self.net_profit())?;
        state.serialize_field("profitMargin", &self.profit_margin())?;
        state.end()
    }
}

/// Revenue by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueBreakdown {
    /// Received on bookings, linked orders excluded.
    pub bookings: MonetaryAmount,
    /// Received on orders linked to bookings.
    pub linked_orders: MonetaryAmount,
    /// Received on standalone orders not linked to any booking.
    pub standalone_orders: MonetaryAmount,
    /// Standalone payments tied to neither a booking nor an order.
    pub other: MonetaryAmount,
}

impl RevenueBreakdown {
    /// All order revenue, linked and standalone.
    #[must_use]
    pub fn orders(&self) -> MonetaryAmount {
        self.linked_orders + self.standalone_orders
    }

    /// Sum of every source.
    #[must_use]
    pub fn total(&self) -> MonetaryAmount {
        self.bookings + self.orders() + self.other
    }
}

/// Outstanding balances by source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OutstandingBreakdown {
    /// Still due on bookings, linked orders included.
    pub bookings: MonetaryAmount,
    /// Still due on standalone orders.
    pub orders: MonetaryAmount,
}

/// Costs by source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CostBreakdown {
    /// Paid expenses.
    pub expenses: MonetaryAmount,
    /// Signed owner payments.
    pub owner_payments: MonetaryAmount,
    /// Paid expenses per category.
    pub by_category: BTreeMap<String, MonetaryAmount>,
}

/// Per-day averages over the reporting window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyAverages {
    /// Days in the window; zero when no window was given.
    pub days: i64,
    /// Revenue per day.
    pub revenue: MonetaryAmount,
    /// Costs per day.
    pub expense: MonetaryAmount,
}

/// Plain-number mirrors of the canonical figures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundedTotals {
    /// Revenue, 2 digits.
    pub revenue: f64,
    /// Costs, 2 digits.
    pub costs: f64,
    /// Net profit, 2 digits.
    pub net_profit: f64,
    /// Outstanding, 2 digits.
    pub outstanding: f64,
    /// Margin percentage, up to 8 digits.
    pub profit_margin: f64,
    /// Daily average revenue, 2 digits.
    pub daily_avg_revenue: f64,
    /// Daily average costs, 2 digits.
    pub daily_avg_expense: f64,
}

/// Locale-formatted display strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayTotals {
    /// Revenue.
    pub revenue: String,
    /// Costs.
    pub costs: String,
    /// Net profit.
    pub net_profit: String,
    /// Outstanding.
    pub outstanding: String,
    /// Margin percentage.
    pub profit_margin: String,
    /// Daily average revenue.
    pub daily_avg_revenue: String,
    /// Daily average costs.
    pub daily_avg_expense: String,
}

/// One booking's contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingLine {
    /// Booking id.
    pub booking_id: Option<BookingId>,
    /// Client display name.
    pub client_name: Option<String>,
    /// Price agreed with the client.
    pub agreed_price: MonetaryAmount,
    /// Everything received, linked orders included.
    pub total_paid: MonetaryAmount,
    /// Received on the booking alone.
    pub booking_revenue: MonetaryAmount,
    /// Received through linked orders.
    pub linked_order_revenue: MonetaryAmount,
    /// Still due.
    pub outstanding: MonetaryAmount,
    /// Received items.
    pub received_payments: Vec<PaymentItem>,
    /// Pending items.
    pub pending_payments: Vec<PaymentItem>,
}

/// One standalone order's contribution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    /// Order id.
    pub order_id: Option<OrderId>,
    /// Order status as read.
    pub payment_status: PaymentStatus,
    /// Order amount.
    pub total_amount: MonetaryAmount,
    /// Received.
    pub amount_paid: MonetaryAmount,
    /// Still due.
    pub amount_due: MonetaryAmount,
}

/// One paid expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseLine {
    /// Expense id.
    pub expense_id: Option<ExpenseId>,
    /// Category, `uncategorized` when missing.
    pub category: String,
    /// Amount.
    pub amount: MonetaryAmount,
}

/// One signed owner payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerPaymentLine {
    /// Booking the payment belongs to.
    pub booking_id: Option<BookingId>,
    /// Client of that booking.
    pub client_name: Option<String>,
    /// Slot the amount came from.
    pub slot: OwnerSlotKind,
    /// Amount paid to the owner.
    pub amount: MonetaryAmount,
    /// Disbursement date.
    pub date: DateTime<Utc>,
    /// True when the reconciliation time was substituted for a missing date.
    pub date_is_fallback: bool,
}

/// One standalone payment counted as other revenue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OtherPaymentLine {
    /// Payment id.
    pub payment_id: Option<PaymentId>,
    /// Amount.
    pub amount: MonetaryAmount,
    /// Payment date.
    pub date: DateTime<Utc>,
    /// True when the reconciliation time was substituted for a missing date.
    pub date_is_fallback: bool,
}

/// Result of one reconciliation call.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconciliationReport {
    /// Display currency.
    pub currency: CurrencyCode,
    /// Display locale tag.
    pub locale: String,
    /// Reporting window, when one was given.
    pub period: Option<DateRange>,
    /// Canonical totals.
    pub totals: ReportTotals,
    /// Revenue by source.
    pub revenue_breakdown: RevenueBreakdown,
    /// Outstanding by source.
    pub outstanding_breakdown: OutstandingBreakdown,
    /// Costs by source.
    pub cost_breakdown: CostBreakdown,
    /// Per-day averages.
    pub daily_averages: DailyAverages,
    /// Plain-number mirrors.
    pub rounded: RoundedTotals,
    /// Display strings.
    pub display: DisplayTotals,
    /// Per-booking lines.
    pub bookings: Vec<BookingLine>,
    /// Per-order lines, deduplicated orders excluded.
    pub orders: Vec<OrderLine>,
    /// Paid expenses.
    pub expenses: Vec<ExpenseLine>,
    /// Signed owner payments.
    pub owner_payments: Vec<OwnerPaymentLine>,
    /// Standalone payments counted as other revenue.
    pub other_payments: Vec<OtherPaymentLine>,
    /// Standalone orders skipped because a booking already counted them.
    pub skipped_order_ids: Vec<OrderId>,
    /// Standalone payments left out because they reference a booking or order.
    pub excluded_payment_ids: Vec<PaymentId>,
}

impl ReconciliationReport {
    /// Changes of this report's totals against an earlier one.
    #[must_use]
    pub fn compare_with(
        &self,
        previous: &Self,
        precision: PercentPrecision,
    ) -> PeriodComparison {
        compare_periods(&self.totals, &previous.totals, precision)
    }
}
