use std::sync::Arc;

use models::{Address, PhoneNumber};
use tracing::{error, info, instrument};

use crate::address::store::{AddressStore, StoreError};
use crate::errors::ServiceError;

pub const KEY_PREFIX: &str = "phone:";

/// Store key for a phone number, e.g. `phone:+79161234567`.
pub fn phone_key(phone: &PhoneNumber) -> String {
    format!("{KEY_PREFIX}{phone}")
}

/// Application service for phone → address records.
/// Addresses are validated before the store is touched; the store's conditional
/// writes decide create/update outcomes, so no locking happens here.
#[derive(Clone)]
pub struct AddressService {
    store: Arc<dyn AddressStore>,
}

impl AddressService {
    pub fn new(store: Arc<dyn AddressStore>) -> Self { Self { store } }

    #[instrument(skip(self), fields(phone = %phone))]
    pub async fn get(&self, phone: &PhoneNumber) -> Result<Address, ServiceError> {
        let key = phone_key(phone);
        let blob = self
            .store
            .get(&key)
            .await?
            .ok_or_else(|| ServiceError::not_found("address"))?;
        serde_json::from_slice::<Address>(&blob).map_err(|e| {
            error!(%key, error = %e, "stored address does not parse");
            ServiceError::CorruptRecord { key, reason: e.to_string() }
        })
    }

    #[instrument(skip(self, address), fields(phone = %phone))]
    pub async fn create(&self, phone: &PhoneNumber, address: &Address) -> Result<(), ServiceError> {
        address.validate()?;
        let key = phone_key(phone);
        if !self.store.set_if_absent(&key, encode(address)?).await? {
            return Err(ServiceError::conflict("address"));
        }
        info!(%key, "address created");
        Ok(())
    }

    /// Replaces the whole address; optional fields missing from `address` are cleared.
    #[instrument(skip(self, address), fields(phone = %phone))]
    pub async fn update(&self, phone: &PhoneNumber, address: &Address) -> Result<(), ServiceError> {
        address.validate()?;
        let key = phone_key(phone);
        if !self.store.set_if_present(&key, encode(address)?).await? {
            return Err(ServiceError::not_found("address"));
        }
        info!(%key, "address updated");
        Ok(())
    }

    #[instrument(skip(self), fields(phone = %phone))]
    pub async fn delete(&self, phone: &PhoneNumber) -> Result<(), ServiceError> {
        let key = phone_key(phone);
        if self.store.delete(&key).await? < 1 {
            return Err(ServiceError::not_found("address"));
        }
        info!(%key, "address deleted");
        Ok(())
    }

    pub async fn ping(&self) -> Result<(), StoreError> {
        self.store.ping().await
    }
}

fn encode(address: &Address) -> Result<Vec<u8>, ServiceError> {
    Ok(serde_json::to_vec(address)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address::store::mock::InMemoryAddressStore;
    use models::ModelError;

    fn setup() -> (Arc<InMemoryAddressStore>, AddressService) {
        let store = Arc::new(InMemoryAddressStore::new());
        let svc = AddressService::new(store.clone());
        (store, svc)
    }

    fn phone() -> PhoneNumber {
        PhoneNumber::parse("+79161234567").unwrap()
    }

    fn moscow() -> Address {
        let mut a = Address::new("Московская область", "Москва", "ул. Тверская", "д. 7");
        a.flat = Some("кв. 15".into());
        a
    }

    fn san_francisco() -> Address {
        let mut a = Address::new("Калифорния", "Сан-Франциско", "Market Street", "1");
        a.postal_code = Some("94105".into());
        a
    }

    #[test]
    fn key_uses_phone_prefix() {
        assert_eq!(phone_key(&phone()), "phone:+79161234567");
    }

    #[tokio::test]
    async fn create_then_get_round_trips() -> Result<(), anyhow::Error> {
        let (store, svc) = setup();
        svc.create(&phone(), &moscow()).await?;
        assert_eq!(svc.get(&phone()).await?, moscow());
        assert!(store.raw("phone:+79161234567").await.is_some());
        Ok(())
    }

    #[tokio::test]
    async fn second_create_conflicts_and_keeps_first() -> Result<(), anyhow::Error> {
        let (_store, svc) = setup();
        svc.create(&phone(), &moscow()).await?;
        let err = svc.create(&phone(), &san_francisco()).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(svc.get(&phone()).await?, moscow());
        Ok(())
    }

    #[tokio::test]
    async fn update_of_missing_record_creates_nothing() {
        let (store, svc) = setup();
        let err = svc.update(&phone(), &moscow()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn update_replaces_whole_address() -> Result<(), anyhow::Error> {
        let (_store, svc) = setup();
        svc.create(&phone(), &moscow()).await?;
        svc.update(&phone(), &san_francisco()).await?;
        let got = svc.get(&phone()).await?;
        assert_eq!(got, san_francisco());
        assert!(got.flat.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn delete_twice_reports_not_found() -> Result<(), anyhow::Error> {
        let (_store, svc) = setup();
        svc.create(&phone(), &moscow()).await?;
        svc.delete(&phone()).await?;
        assert!(matches!(svc.get(&phone()).await, Err(ServiceError::NotFound(_))));
        assert!(matches!(svc.delete(&phone()).await, Err(ServiceError::NotFound(_))));
        Ok(())
    }

    #[tokio::test]
    async fn invalid_address_never_reaches_store() {
        let (store, svc) = setup();
        let mut a = moscow();
        a.street = " ".into();
        let err = svc.create(&phone(), &a).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation(ModelError::MissingField("street"))));
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn corrupt_blob_is_reported() {
        let (store, svc) = setup();
        store.insert_raw("phone:+79161234567", b"{not json".to_vec()).await;
        let err = svc.get(&phone()).await.unwrap_err();
        match err {
            ServiceError::CorruptRecord { key, .. } => assert_eq!(key, "phone:+79161234567"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn store_outage_is_not_absence() {
        let (store, svc) = setup();
        store.set_unavailable(true);
        assert!(matches!(svc.get(&phone()).await, Err(ServiceError::Store(_))));
        assert!(matches!(svc.delete(&phone()).await, Err(ServiceError::Store(_))));
    }

    #[tokio::test]
    async fn concurrent_creates_have_one_winner() -> Result<(), anyhow::Error> {
        let (_store, svc) = setup();
        let mut handles = Vec::new();
        for i in 0..20 {
            let svc = svc.clone();
            handles.push(tokio::spawn(async move {
                let mut a = moscow();
                a.flat = Some(format!("кв. {i}"));
                svc.create(&phone(), &a).await
            }));
        }
        let (mut created, mut conflicts) = (0, 0);
        for h in handles {
            match h.await? {
                Ok(()) => created += 1,
                Err(ServiceError::Conflict(_)) => conflicts += 1,
                Err(e) => return Err(e.into()),
            }
        }
        assert_eq!((created, conflicts), (1, 19));
        Ok(())
    }
}
