//! Immutable fold state of one reconciliation.

use std::collections::BTreeMap;

use keel_shared::types::{MonetaryAmount, OrderId, PaymentId};
use rayon::prelude::*;

use super::types::{
    BookingLine, CostBreakdown, ExpenseLine, OrderLine, OtherPaymentLine, OutstandingBreakdown,
    OwnerPaymentLine, RevenueBreakdown,
};

/// What a single source record adds to the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Contribution {
    /// A booking with its signed owner payments.
    Booking {
        /// Revenue and balance of the booking.
        line: BookingLine,
        /// Signed owner payment slots.
        owner_payments: Vec<OwnerPaymentLine>,
    },
    /// A standalone order not linked to any booking.
    Order(OrderLine),
    /// A standalone order already counted through a booking.
    SkippedOrder(OrderId),
    /// A paid expense.
    Expense(ExpenseLine),
    /// A standalone payment tied to nothing.
    OtherPayment(OtherPaymentLine),
    /// A standalone payment referencing a booking or order.
    ExcludedPayment(Option<PaymentId>),
    /// A record that contributes nothing, such as an unpaid expense.
    Nothing,
}

/// Running totals and itemized lines.
///
/// Absorbing and merging consume `self`; no accumulator is ever mutated
/// behind a reference.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Accumulator {
    /// Revenue by source.
    pub revenue: RevenueBreakdown,
    /// Outstanding balances by source.
    pub outstanding: OutstandingBreakdown,
    /// Costs by source.
    pub costs: CostBreakdown,
    /// Per-booking lines.
    pub bookings: Vec<BookingLine>,
    /// Counted standalone orders.
    pub orders: Vec<OrderLine>,
    /// Paid expenses.
    pub expenses: Vec<ExpenseLine>,
    /// Signed owner payments.
    pub owner_payments: Vec<OwnerPaymentLine>,
    /// Unattributed standalone payments.
    pub other_payments: Vec<OtherPaymentLine>,
    /// Orders skipped by linked-order dedup.
    pub skipped_order_ids: Vec<OrderId>,
    /// Payments excluded for referencing a booking or order.
    pub excluded_payment_ids: Vec<PaymentId>,
}

impl Accumulator {
    /// Adds one contribution.
    #[must_use]
    pub fn absorb(mut self, contribution: Contribution) -> Self {
        match contribution {
            Contribution::Booking {
                line,
                owner_payments,
            } => {
                self.revenue.bookings = self.revenue.bookings + line.booking_revenue;
                self.revenue.linked_orders = self.revenue.linked_orders + line.linked_order_revenue;
                self.outstanding.bookings = self.outstanding.bookings + line.outstanding;
                let owner_total: MonetaryAmount = owner_payments.iter().map(|p| p.amount).sum();
                self.costs.owner_payments = self.costs.owner_payments + owner_total;
                self.bookings.push(line);
                self.owner_payments.extend(owner_payments);
            }
            Contribution::Order(line) => {
                self.revenue.standalone_orders = self.revenue.standalone_orders + line.amount_paid;
                self.outstanding.orders = self.outstanding.orders + line.amount_due;
                self.orders.push(line);
            }
            Contribution::SkippedOrder(id) => self.skipped_order_ids.push(id),
            Contribution::Expense(line) => {
                self.costs.expenses = self.costs.expenses + line.amount;
                add_to_category(&mut self.costs.by_category, &line.category, line.amount);
                self.expenses.push(line);
            }
            Contribution::OtherPayment(line) => {
                self.revenue.other = self.revenue.other + line.amount;
                self.other_payments.push(line);
            }
            Contribution::ExcludedPayment(id) => self.excluded_payment_ids.extend(id),
            Contribution::Nothing => {}
        }
        self
    }

    /// Combines two partial results; `other` comes after `self` in input order.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.revenue = RevenueBreakdown {
            bookings: self.revenue.bookings + other.revenue.bookings,
            linked_orders: self.revenue.linked_orders + other.revenue.linked_orders,
            standalone_orders: self.revenue.standalone_orders + other.revenue.standalone_orders,
            other: self.revenue.other + other.revenue.other,
        };
        self.outstanding = OutstandingBreakdown {
            bookings: self.outstanding.bookings + other.outstanding.bookings,
            orders: self.outstanding.orders + other.outstanding.orders,
        };
        self.costs.expenses = self.costs.expenses + other.costs.expenses;
        self.costs.owner_payments = self.costs.owner_payments + other.costs.owner_payments;
        for (category, amount) in other.costs.by_category {
            add_to_category(&mut self.costs.by_category, &category, amount);
        }

        self.bookings.extend(other.bookings);
        self.orders.extend(other.orders);
        self.expenses.extend(other.expenses);
        self.owner_payments.extend(other.owner_payments);
        self.other_payments.extend(other.other_payments);
        self.skipped_order_ids.extend(other.skipped_order_ids);
        self.excluded_payment_ids.extend(other.excluded_payment_ids);
        self
    }

    /// Folds a collection, on the rayon pool when `parallel` is set.
    ///
    /// Both paths keep input order in the itemized lines.
    pub fn fold<T, F>(records: &[T], parallel: bool, contribute: F) -> Self
    where
        T: Sync,
        F: Fn(&T) -> Contribution + Send + Sync,
    {
        if parallel {
            records
                .par_iter()
                .map(&contribute)
                .fold(Self::default, Self::absorb)
                .reduce(Self::default, Self::merge)
        } else {
            records
                .iter()
                .map(contribute)
                .fold(Self::default(), Self::absorb)
        }
    }
}

fn add_to_category(
    categories: &mut BTreeMap<String, MonetaryAmount>,
    category: &str,
    amount: MonetaryAmount,
) {
    let entry = categories.entry(category.to_string()).or_default();
    *entry = *entry + amount;
}
