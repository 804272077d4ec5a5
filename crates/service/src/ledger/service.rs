use std::sync::Arc;

use tracing::{debug, info, instrument};

use super::domain::{
    Booking, BookingId, ClientLedger, Driver, DriverBooking, NewBooking, PaymentUpdate,
    DRIVER_NAME_REQUIRED, NO_DRIVER_MATCH, RECORD_NOT_FOUND,
};
use super::repository::{ClientRepository, DriverRepository};
use crate::errors::ServiceError;

/// Ledger business service independent of web framework
#[derive(Clone)]
pub struct LedgerService {
    drivers: Arc<dyn DriverRepository>,
    clients: Arc<dyn ClientRepository>,
}

impl LedgerService {
    pub fn new(drivers: Arc<dyn DriverRepository>, clients: Arc<dyn ClientRepository>) -> Self {
        Self { drivers, clients }
    }

    pub async fn list_drivers(&self) -> Result<Vec<Driver>, ServiceError> {
        self.drivers.list_drivers().await
    }

    /// Append a driver as submitted. Duplicates are allowed.
    #[instrument(skip(self, driver), fields(first_name = %driver.first_name, last_name = %driver.last_name))]
    pub async fn add_driver(&self, driver: Driver) -> Result<(), ServiceError> {
        self.drivers.add_driver(driver).await?;
        info!("driver_added");
        Ok(())
    }

    pub async fn list_clients(&self) -> Result<ClientLedger, ServiceError> {
        self.clients.list_clients().await
    }

    /// Validate and store a new booking, creating the client on first use.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    /// use service::ledger::{LedgerService, domain::NewBooking};
    /// use service::ledger::repository::memory::{MemoryClientRepository, MemoryDriverRepository};
    /// let svc = LedgerService::new(
    ///     Arc::new(MemoryDriverRepository::default()),
    ///     Arc::new(MemoryClientRepository::default()),
    /// );
    /// let input = NewBooking {
    ///     client_name: Some("Acme".into()),
    ///     driver_name: Some("Jane Doe".into()),
    ///     payment: Some(120u32.into()),
    ///     payment_date: Some("2024-03-01".into()),
    ///     payment_status: Some("pending".into()),
    ///     currency: Some("USD".into()),
    /// };
    /// let rt = tokio::runtime::Builder::new_current_thread().build().unwrap();
    /// assert_eq!(rt.block_on(svc.upsert_booking(input)).unwrap(), 1);
    /// ```
    #[instrument(skip(self, input))]
    pub async fn upsert_booking(&self, input: NewBooking) -> Result<BookingId, ServiceError> {
        let (client_name, booking) = input.validate()?;
        let id = self.clients.insert_booking(&client_name, booking).await?;
        info!(client = %client_name, booking_id = id, "booking_stored");
        Ok(id)
    }

    #[instrument(skip(self, input))]
    pub async fn update_payment(&self, input: PaymentUpdate) -> Result<Booking, ServiceError> {
        let update = input.validate()?;
        let booking_id = update
            .booking_id
            .ok_or_else(|| ServiceError::not_found(RECORD_NOT_FOUND))?;
        let booking = self
            .clients
            .update_payment(&update.client_name, booking_id, update.payment, update.payment_status)
            .await?;
        info!(client = %update.client_name, booking_id, status = %booking.payment_status, "payment_updated");
        Ok(booking)
    }

    /// Bookings of every driver whose full name contains `query`.
    ///
    /// Drivers are found by case-insensitive substring; bookings are then
    /// matched against those drivers' full names exactly (ignoring case).
    #[instrument(skip(self))]
    pub async fn find_bookings_by_driver(&self, query: &str) -> Result<Vec<DriverBooking>, ServiceError> {
        if query.is_empty() {
            return Err(ServiceError::validation(DRIVER_NAME_REQUIRED));
        }
        let query = query.to_lowercase();

        let matched: Vec<String> = self
            .drivers
            .list_drivers()
            .await?
            .iter()
            .map(Driver::search_name)
            .filter(|name| name.contains(&query))
            .collect();
        if matched.is_empty() {
            return Err(ServiceError::not_found(NO_DRIVER_MATCH));
        }
        debug!(drivers = matched.len(), "drivers matched");

        let ledger = self.clients.list_clients().await?;
        Ok(ledger.bookings_for_drivers(&matched))
    }
}
