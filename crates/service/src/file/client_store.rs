use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use serde_json::Number;
use tracing::debug;

use crate::errors::ServiceError;
use crate::ledger::domain::{Booking, BookingId, ClientLedger};
use crate::ledger::repository::ClientRepository;
use crate::storage::json_file_store::JsonFileStore;

/// Clients and their bookings persisted as one JSON object.
#[derive(Clone)]
pub struct FileClientStore {
    store: Arc<JsonFileStore<ClientLedger>>,
}

impl FileClientStore {
    /// Initialize the store from the given file path. Creates `{}` if missing.
    pub async fn new<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, ServiceError> {
        let store = JsonFileStore::<ClientLedger>::new(path).await?;
        Ok(Arc::new(Self { store }))
    }
}

#[async_trait]
impl ClientRepository for FileClientStore {
    async fn list_clients(&self) -> Result<ClientLedger, ServiceError> {
        self.store.read().await
    }

    async fn insert_booking(&self, client_name: &str, booking: Booking) -> Result<BookingId, ServiceError> {
        let id = self
            .store
            .update(move |ledger| Ok(ledger.insert_booking(client_name, booking)))
            .await?;
        debug!(path = %self.store.path().display(), client = client_name, booking_id = id, "clients written");
        Ok(id)
    }

    async fn update_payment(
        &self,
        client_name: &str,
        booking_id: BookingId,
        payment: Number,
        payment_status: String,
    ) -> Result<Booking, ServiceError> {
        self.store
            .update(move |ledger| ledger.update_payment(client_name, booking_id, payment, payment_status))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn booking(driver: &str) -> Booking {
        Booking {
            driver_name: driver.into(),
            payment: Number::from(40),
            payment_date: "2024-06-01".into(),
            payment_status: "pending".into(),
            currency: "GBP".into(),
        }
    }

    #[tokio::test]
    async fn client_store_assigns_ids_and_persists() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("svc_clients_{}.json", Uuid::new_v4()));
        let store = FileClientStore::new(&tmp).await?;
        assert_eq!(tokio::fs::read_to_string(&tmp).await?, "{}");

        assert_eq!(store.insert_booking("Acme", booking("Jane Doe")).await?, 1);
        assert_eq!(store.insert_booking("Acme", booking("John Roe")).await?, 2);
        assert_eq!(store.insert_booking("Globex", booking("Jane Doe")).await?, 1);

        let updated = store.update_payment("Acme", 2, Number::from(0), "waived".into()).await?;
        assert_eq!(updated.driver_name, "John Roe");

        let store2 = FileClientStore::new(&tmp).await?;
        let ledger = store2.list_clients().await?;
        let acme = ledger.get("Acme").expect("acme present");
        assert_eq!(acme[&2].payment_status, "waived");
        assert_eq!(acme[&1].payment_status, "pending");

        let raw: serde_json::Value = serde_json::from_str(&tokio::fs::read_to_string(&tmp).await?)?;
        assert_eq!(raw["Acme"]["2"]["payment"], 0);
        assert!(raw["Acme"]["1"].get("clientName").is_none());

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn missing_record_leaves_file_unchanged() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("svc_clients_nf_{}.json", Uuid::new_v4()));
        let store = FileClientStore::new(&tmp).await?;
        store.insert_booking("Acme", booking("Jane Doe")).await?;
        let before = tokio::fs::read(&tmp).await?;

        let res = store.update_payment("Acme", 7, Number::from(1), "paid".into()).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        let res = store.update_payment("Initech", 1, Number::from(1), "paid".into()).await;
        assert!(matches!(res, Err(ServiceError::NotFound(_))));
        assert_eq!(tokio::fs::read(&tmp).await?, before);

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }

    #[tokio::test]
    async fn concurrent_inserts_get_distinct_ids() -> Result<(), anyhow::Error> {
        let tmp = std::env::temp_dir().join(format!("svc_clients_race_{}.json", Uuid::new_v4()));
        let store = FileClientStore::new(&tmp).await?;

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move { store.insert_booking("Acme", booking("Jane Doe")).await }));
        }
        let mut ids = Vec::new();
        for h in handles {
            ids.push(h.await??);
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=20).collect::<Vec<BookingId>>());
        assert_eq!(store.list_clients().await?.get("Acme").map(|b| b.len()), Some(20));

        let _ = tokio::fs::remove_file(&tmp).await;
        Ok(())
    }
}
