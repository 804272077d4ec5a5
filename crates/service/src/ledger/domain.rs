use std::collections::BTreeMap;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};

use crate::errors::ServiceError;

/// Per-client booking sequence number, serialized as a string key on disk.
pub type BookingId = u64;

/// Stored driver. Attributes beyond the two names are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Driver {
    pub first_name: String,
    pub last_name: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Driver {
    pub fn new(first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        Self { first_name: first_name.into(), last_name: last_name.into(), extra: Map::new() }
    }

    /// `"first last"` in lowercase, the form every name comparison uses.
    pub fn search_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name).to_lowercase()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub driver_name: String,
    pub payment: Number,
    pub payment_date: String,
    pub payment_status: String,
    pub currency: String,
}

/// Bookings of one client, ascending by id.
pub type ClientBookings = BTreeMap<BookingId, Booking>;

/// Whole `clients.json` document: client name -> bookings, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientLedger(pub IndexMap<String, ClientBookings>);

impl ClientLedger {
    pub fn get(&self, client_name: &str) -> Option<&ClientBookings> {
        self.0.get(client_name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Store `booking` under the next free id of `client_name`, creating the client if needed.
    ///
    /// The next id is one past the highest existing id, so ids start at 1 and
    /// never collide with a surviving booking even if earlier ones went missing.
    pub fn insert_booking(&mut self, client_name: &str, booking: Booking) -> BookingId {
        let bookings = self.0.entry(client_name.to_string()).or_default();
        let id = bookings.keys().next_back().map_or(1, |last| last + 1);
        bookings.insert(id, booking);
        id
    }

    /// Overwrite payment and status of one booking, leaving the other fields alone.
    pub fn update_payment(
        &mut self,
        client_name: &str,
        booking_id: BookingId,
        payment: Number,
        payment_status: String,
    ) -> Result<Booking, ServiceError> {
        let booking = self
            .0
            .get_mut(client_name)
            .and_then(|bookings| bookings.get_mut(&booking_id))
            .ok_or_else(|| ServiceError::not_found(RECORD_NOT_FOUND))?;
        booking.payment = payment;
        booking.payment_status = payment_status;
        Ok(booking.clone())
    }

    /// Every booking whose driver name equals (ignoring case) one of `search_names`,
    /// tagged with its client. `search_names` must already be lowercase.
    pub fn bookings_for_drivers(&self, search_names: &[String]) -> Vec<DriverBooking> {
        self.0
            .iter()
            .flat_map(move |(client_name, bookings)| {
                bookings
                    .values()
                    .filter(move |b| {
                        let name = b.driver_name.to_lowercase();
                        search_names.iter().any(|n| *n == name)
                    })
                    .map(move |b| DriverBooking { booking: b.clone(), client_name: client_name.clone() })
            })
            .collect()
    }
}

pub const ALL_FIELDS_REQUIRED: &str = "All fields are required.";
pub const MISSING_FIELDS: &str = "Missing required fields";
pub const DRIVER_NAME_REQUIRED: &str = "Driver name is required";
pub const NO_DRIVER_MATCH: &str = "No drivers found matching the search query.";
pub const RECORD_NOT_FOUND: &str = "Record not found";

/// Body of `POST /clients`. Every field is optional here so that absence
/// surfaces as a validation error rather than a decode error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewBooking {
    pub client_name: Option<String>,
    pub driver_name: Option<String>,
    pub payment: Option<Number>,
    pub payment_date: Option<String>,
    pub payment_status: Option<String>,
    pub currency: Option<String>,
}

impl NewBooking {
    /// Split into the client key and the stored booking. Empty strings and a
    /// zero payment count as missing.
    pub fn validate(self) -> Result<(String, Booking), ServiceError> {
        let missing = || ServiceError::validation(ALL_FIELDS_REQUIRED);
        let client_name = present(self.client_name).ok_or_else(missing)?;
        let booking = Booking {
            driver_name: present(self.driver_name).ok_or_else(missing)?,
            payment: self.payment.filter(|n| !is_zero(n)).ok_or_else(missing)?,
            payment_date: present(self.payment_date).ok_or_else(missing)?,
            payment_status: present(self.payment_status).ok_or_else(missing)?,
            currency: present(self.currency).ok_or_else(missing)?,
        };
        Ok((client_name, booking))
    }
}

/// Body of `POST /update-payment`.
///
/// `bookingId` is accepted as a number or a numeric string since it is an
/// object key on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentUpdate {
    pub client_name: Option<String>,
    pub booking_id: Option<Value>,
    pub payment: Option<Number>,
    pub payment_status: Option<String>,
}

/// A validated payment update. `booking_id` is `None` when the caller sent
/// something that can never name a booking (it will not be found).
#[derive(Debug, Clone, PartialEq)]
pub struct ValidPaymentUpdate {
    pub client_name: String,
    pub booking_id: Option<BookingId>,
    pub payment: Number,
    pub payment_status: String,
}

impl PaymentUpdate {
    /// A zero payment is allowed; an empty name, status or a zero/empty id is not.
    pub fn validate(self) -> Result<ValidPaymentUpdate, ServiceError> {
        let missing = || ServiceError::validation(MISSING_FIELDS);
        let client_name = present(self.client_name).ok_or_else(missing)?;
        let booking_id = match self.booking_id {
            None | Some(Value::Null) | Some(Value::Bool(false)) => return Err(missing()),
            Some(Value::Number(n)) if is_zero(&n) => return Err(missing()),
            Some(Value::String(s)) if s.is_empty() => return Err(missing()),
            Some(Value::Number(n)) => n.as_u64().or_else(|| integral_id(n.as_f64()?)),
            Some(Value::String(s)) => s.parse::<BookingId>().ok().filter(|id| id.to_string() == s),
            Some(_) => None,
        };
        let payment = self.payment.ok_or_else(missing)?;
        let payment_status = present(self.payment_status).ok_or_else(missing)?;
        Ok(ValidPaymentUpdate { client_name, booking_id, payment, payment_status })
    }
}

/// One row of a driver search: the booking's fields plus its owning client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverBooking {
    #[serde(flatten)]
    pub booking: Booking,
    pub client_name: String,
}

fn present(s: Option<String>) -> Option<String> {
    s.filter(|s| !s.is_empty())
}

/// `1.0` names booking `1`; fractions and negatives name nothing.
fn integral_id(f: f64) -> Option<BookingId> {
    (f.fract() == 0.0 && f >= 1.0 && f <= u64::MAX as f64).then_some(f as BookingId)
}

fn is_zero(n: &Number) -> bool {
    n.as_f64() == Some(0.0)
}
