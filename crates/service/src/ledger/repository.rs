use async_trait::async_trait;
use serde_json::Number;

use super::domain::{Booking, BookingId, ClientLedger, Driver};
use crate::errors::ServiceError;

/// Persistence of the driver list.
#[async_trait]
pub trait DriverRepository: Send + Sync {
    async fn list_drivers(&self) -> Result<Vec<Driver>, ServiceError>;
    async fn add_driver(&self, driver: Driver) -> Result<(), ServiceError>;
}

/// Persistence of clients and their bookings.
///
/// Implementations must make `insert_booking` and `update_payment` atomic with
/// respect to each other, otherwise two inserts can hand out the same id.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn list_clients(&self) -> Result<ClientLedger, ServiceError>;
    async fn insert_booking(&self, client_name: &str, booking: Booking) -> Result<BookingId, ServiceError>;
    async fn update_payment(
        &self,
        client_name: &str,
        booking_id: BookingId,
        payment: Number,
        payment_status: String,
    ) -> Result<Booking, ServiceError>;
}

/// In-memory repositories for tests and embedding
pub mod memory {
    use super::*;
    use tokio::sync::Mutex;

    #[derive(Default)]
    pub struct MemoryDriverRepository {
        drivers: Mutex<Vec<Driver>>,
    }

    #[async_trait]
    impl DriverRepository for MemoryDriverRepository {
        async fn list_drivers(&self) -> Result<Vec<Driver>, ServiceError> {
            Ok(self.drivers.lock().await.clone())
        }

        async fn add_driver(&self, driver: Driver) -> Result<(), ServiceError> {
            self.drivers.lock().await.push(driver);
            Ok(())
        }
    }

    #[derive(Default)]
    pub struct MemoryClientRepository {
        ledger: Mutex<ClientLedger>,
    }

    #[async_trait]
    impl ClientRepository for MemoryClientRepository {
        async fn list_clients(&self) -> Result<ClientLedger, ServiceError> {
            Ok(self.ledger.lock().await.clone())
        }

        async fn insert_booking(&self, client_name: &str, booking: Booking) -> Result<BookingId, ServiceError> {
            Ok(self.ledger.lock().await.insert_booking(client_name, booking))
        }

        async fn update_payment(
            &self,
            client_name: &str,
            booking_id: BookingId,
            payment: Number,
            payment_status: String,
        ) -> Result<Booking, ServiceError> {
            self.ledger
                .lock()
                .await
                .update_payment(client_name, booking_id, payment, payment_status)
        }
    }
}
