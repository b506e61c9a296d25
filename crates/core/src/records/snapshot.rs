//! Snapshot intake: the four record collections of one reconciliation call.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use super::error::RecordsError;
use super::lenient::json_type;
use super::types::{BookingRecord, ExpenseRecord, OrderRecord, StandalonePaymentRecord};

/// Full snapshot handed to the engine by the persistence layer.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationInput {
    /// Bookings, with their payments, linked orders, and owner payments.
    pub bookings: Vec<BookingRecord>,
    /// Standalone orders.
    pub orders: Vec<OrderRecord>,
    /// Expenses.
    pub expenses: Vec<ExpenseRecord>,
    /// Payments recorded outside bookings and orders.
    pub payments: Vec<StandalonePaymentRecord>,
}

impl ReconciliationInput {
    /// Reads a loosely-shaped snapshot with keys `bookings`, `orders`,
    /// `expenses` and `payments`.
    ///
    /// A missing or null key is an empty collection. Elements that are not
    /// readable records are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns `RecordsError` when the snapshot is not an object or a key
    /// holds something other than an array.
    pub fn from_value(value: Value) -> Result<Self, RecordsError> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(RecordsError::NotASnapshot {
                    found: json_type(&other),
                });
            }
        };

        Ok(Self {
            bookings: take_collection(&mut map, "bookings")?,
            orders: take_collection(&mut map, "orders")?,
            expenses: take_collection(&mut map, "expenses")?,
            payments: take_collection(&mut map, "payments")?,
        })
    }

    /// Total number of top-level records.
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.bookings.len() + self.orders.len() + self.expenses.len() + self.payments.len()
    }
}

fn take_collection<T: DeserializeOwned>(
    map: &mut Map<String, Value>,
    field: &'static str,
) -> Result<Vec<T>, RecordsError> {
    match map.remove(field) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => Ok(items
            .into_iter()
            .enumerate()
            .filter_map(|(index, item)| {
                let found = json_type(&item);
                match serde_json::from_value(item) {
                    Ok(record) => Some(record),
                    Err(err) => {
                        tracing::warn!(field, index, found, error = %err, "skipping unreadable record");
                        None
                    }
                }
            })
            .collect()),
        Some(other) => Err(RecordsError::NotACollection {
            field,
            found: json_type(&other),
        }),
    }
}
