//! Reconciliation engine.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use keel_shared::ReconciliationSettings;
use keel_shared::types::{
    CurrencyCode, DisplayLocale, MonetaryAmount, PercentPrecision, RoundingPreset, round_half_up,
};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use tracing::{debug, info, info_span};

use super::accumulator::{Accumulator, Contribution};
use super::dedup::LinkedOrderIndex;
use super::error::ReconcileError;
use super::types::{
    BookingLine, DailyAverages, DateRange, DisplayTotals, ExpenseLine, OrderLine,
    OtherPaymentLine, OwnerPaymentLine, ReconciliationReport, ReportTotals, RoundedTotals,
};
use crate::extraction::{
    FixedRatio, HalfSplit, PartialPaymentPolicy, extract_booking_payments, extract_order_payments,
};
use crate::records::{
    BookingRecord, ExpenseRecord, OrderRecord, PaymentStatus, ReconciliationInput,
    StandalonePaymentRecord,
};

const UNCATEGORIZED: &str = "uncategorized";

/// Folds a snapshot into a [`ReconciliationReport`].
///
/// The engine holds only display settings and the partial-payment policy, so
/// one instance can serve any number of concurrent calls.
#[derive(Debug, Clone)]
pub struct ReconciliationEngine {
    currency: CurrencyCode,
    locale: DisplayLocale,
    percent_precision: PercentPrecision,
    parallel: bool,
    policy: Arc<dyn PartialPaymentPolicy>,
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self {
            currency: CurrencyCode::default(),
            locale: DisplayLocale::default(),
            percent_precision: PercentPrecision::default(),
            parallel: true,
            policy: Arc::new(HalfSplit),
        }
    }
}

impl ReconciliationEngine {
    /// Creates an engine with explicit display settings and the default policy.
    #[must_use]
    pub fn new(currency: CurrencyCode, locale: DisplayLocale) -> Self {
        Self {
            currency,
            locale,
            ..Self::default()
        }
    }

    /// Builds an engine from loaded settings.
    ///
    /// # Errors
    ///
    /// Returns an error when the currency, locale or partial payment ratio
    /// is invalid.
    pub fn from_settings(settings: &ReconciliationSettings) -> Result<Self, ReconcileError> {
        let ratio = settings.partial_payment_ratio;
        let policy: Arc<dyn PartialPaymentPolicy> = if ratio == Decimal::new(5, 1) {
            Arc::new(HalfSplit)
        } else {
            Arc::new(FixedRatio::new(ratio).ok_or(ReconcileError::InvalidPartialRatio(ratio))?)
        };

        Ok(Self {
            currency: settings.currency_code()?,
            locale: settings.display_locale()?,
            percent_precision: settings.percent_precision,
            parallel: settings.parallel,
            policy,
        })
    }

    /// Replaces the partial-payment policy.
    #[must_use]
    pub fn with_policy(mut self, policy: Arc<dyn PartialPaymentPolicy>) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the digits used for display percentages.
    #[must_use]
    pub fn with_percent_precision(mut self, precision: PercentPrecision) -> Self {
        self.percent_precision = precision;
        self
    }

    /// Enables or disables folding on the rayon pool.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Display currency.
    #[must_use]
    pub const fn currency(&self) -> CurrencyCode {
        self.currency
    }

    /// Display locale.
    #[must_use]
    pub const fn locale(&self) -> &DisplayLocale {
        &self.locale
    }

    /// Digits used for display percentages.
    #[must_use]
    pub const fn percent_precision(&self) -> PercentPrecision {
        self.percent_precision
    }

    /// Reconciles a snapshot, using the current time for missing payment dates.
    #[must_use]
    pub fn reconcile(
        &self,
        input: &ReconciliationInput,
        range: Option<DateRange>,
    ) -> ReconciliationReport {
        self.reconcile_at(input, range, Utc::now())
    }

    /// Reads a loosely-shaped snapshot, then reconciles it.
    ///
    /// # Errors
    ///
    /// Returns an error when the snapshot is not an object of arrays.
    pub fn reconcile_value(
        &self,
        snapshot: Value,
        range: Option<DateRange>,
    ) -> Result<ReconciliationReport, ReconcileError> {
        let input = ReconciliationInput::from_value(snapshot)?;
        Ok(self.reconcile(&input, range))
    }

    /// Reconciles a snapshot with `now` standing in for missing payment dates.
    ///
    /// Totals never depend on `now`.
    #[must_use]
    pub fn reconcile_at(
        &self,
        input: &ReconciliationInput,
        range: Option<DateRange>,
        now: DateTime<Utc>,
    ) -> ReconciliationReport {
        let span = info_span!("reconcile", records = input.record_count());
        let _guard = span.enter();

        let index = LinkedOrderIndex::from_bookings(&input.bookings);

        let acc = Accumulator::fold(&input.bookings, self.parallel, |booking| {
            self.booking_contribution(booking, now)
        })
        .merge(Accumulator::fold(&input.orders, self.parallel, |order| {
            self.order_contribution(order, &index)
        }))
        .merge(Accumulator::fold(&input.expenses, false, expense_contribution))
        .merge(Accumulator::fold(&input.payments, false, |payment| {
            payment_contribution(payment, now)
        }));

        let report = self.build_report(acc, range);

        info!(
            bookings = input.bookings.len(),
            orders = report.orders.len(),
            skipped_orders = report.skipped_order_ids.len(),
            expenses = report.expenses.len(),
            other_payments = report.other_payments.len(),
            revenue = %report.totals.revenue,
            costs = %report.totals.costs,
            outstanding = %report.totals.outstanding,
            "reconciliation complete"
        );

        report
    }

    fn booking_contribution(&self, booking: &BookingRecord, now: DateTime<Utc>) -> Contribution {
        let payments = extract_booking_payments(booking, self.policy.as_ref(), now);
        let linked_order_revenue = payments.linked_order_received();

        let owner_payments = booking
            .owner_payments
            .slots()
            .filter(|(_, slot)| slot.is_signed())
            .map(|(kind, slot)| {
                let (date, date_is_fallback) = slot.date.resolve(now);
                OwnerPaymentLine {
                    booking_id: booking.id.clone(),
                    client_name: booking.client_name.clone(),
                    slot: kind,
                    amount: slot.amount.normalize(),
                    date,
                    date_is_fallback,
                }
            })
            .collect();

        Contribution::Booking {
            line: BookingLine {
                booking_id: booking.id.clone(),
                client_name: booking.client_name.clone(),
                agreed_price: payments.agreed_price,
                total_paid: payments.total_paid,
                booking_revenue: payments.total_paid - linked_order_revenue,
                linked_order_revenue,
                outstanding: payments.total_outstanding,
                received_payments: payments.received_payments,
                pending_payments: payments.pending_payments,
            },
            owner_payments,
        }
    }

    fn order_contribution(&self, order: &OrderRecord, index: &LinkedOrderIndex) -> Contribution {
        if let Some(id) = order.id.as_ref().filter(|id| index.contains(id)) {
            debug!(order_id = %id, "order already counted through a booking");
            return Contribution::SkippedOrder(id.clone());
        }

        let payments = extract_order_payments(order, self.policy.as_ref());
        Contribution::Order(OrderLine {
            order_id: order.id.clone(),
            payment_status: order.payment_status,
            total_amount: payments.total_amount,
            amount_paid: payments.amount_paid,
            amount_due: payments.amount_due,
        })
    }

    fn build_report(&self, acc: Accumulator, range: Option<DateRange>) -> ReconciliationReport {
        let totals = ReportTotals {
            revenue: acc.revenue.total(),
            costs: acc.costs.expenses + acc.costs.owner_payments,
            outstanding: acc.outstanding.bookings + acc.outstanding.orders,
        };
        let daily_averages = daily_averages(&totals, range);
        let margin = totals.profit_margin();

        let currency = RoundingPreset::Currency;
        let rounded = RoundedTotals {
            revenue: totals.revenue.to_rounded_f64(currency),
            costs: totals.costs.to_rounded_f64(currency),
            net_profit: totals.net_profit().to_rounded_f64(currency),
            outstanding: totals.outstanding.to_rounded_f64(currency),
            profit_margin: round_half_up(margin, RoundingPreset::Ratio.decimal_places())
                .to_f64()
                .unwrap_or_default(),
            daily_avg_revenue: daily_averages.revenue.to_rounded_f64(currency),
            daily_avg_expense: daily_averages.expense.to_rounded_f64(currency),
        };

        let money = |amount: MonetaryAmount| self.locale.format_currency(amount, self.currency);
        let display = DisplayTotals {
            revenue: money(totals.revenue),
            costs: money(totals.costs),
            net_profit: money(totals.net_profit()),
            outstanding: money(totals.outstanding),
            profit_margin: self
                .locale
                .format_percent(margin, self.percent_precision.digits()),
            daily_avg_revenue: money(daily_averages.revenue),
            daily_avg_expense: money(daily_averages.expense),
        };

        ReconciliationReport {
            currency: self.currency,
            locale: self.locale.tag().to_string(),
            period: range,
            totals,
            revenue_breakdown: acc.revenue,
            outstanding_breakdown: acc.outstanding,
            cost_breakdown: acc.costs,
            daily_averages,
            rounded,
            display,
            bookings: acc.bookings,
            orders: acc.orders,
            expenses: acc.expenses,
            owner_payments: acc.owner_payments,
            other_payments: acc.other_payments,
            skipped_order_ids: acc.skipped_order_ids,
            excluded_payment_ids: acc.excluded_payment_ids,
        }
    }
}

fn expense_contribution(expense: &ExpenseRecord) -> Contribution {
    if expense.payment_status != PaymentStatus::Paid {
        return Contribution::Nothing;
    }
    Contribution::Expense(ExpenseLine {
        expense_id: expense.id.clone(),
        category: expense
            .category
            .as_deref()
            .map(str::trim)
            .filter(|category| !category.is_empty())
            .unwrap_or(UNCATEGORIZED)
            .to_string(),
        amount: expense.amount.normalize(),
    })
}

fn payment_contribution(payment: &StandalonePaymentRecord, now: DateTime<Utc>) -> Contribution {
    if payment.is_attributed() {
        return Contribution::ExcludedPayment(payment.id.clone());
    }
    let (date, date_is_fallback) = payment.date.resolve(now);
    Contribution::OtherPayment(OtherPaymentLine {
        payment_id: payment.id.clone(),
        amount: payment.amount.normalize(),
        date,
        date_is_fallback,
    })
}

fn daily_averages(totals: &ReportTotals, range: Option<DateRange>) -> DailyAverages {
    let Some(range) = range else {
        return DailyAverages::default();
    };
    let days = range.days();
    let per_day = |amount: MonetaryAmount| {
        amount
            .checked_div_scaled(Decimal::from(days), RoundingPreset::Ratio.decimal_places())
            .unwrap_or_default()
    };
    DailyAverages {
        days,
        revenue: per_day(totals.revenue),
        expense: per_day(totals.costs),
    }
}
