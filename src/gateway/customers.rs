//! Customer operations.

use chrono::Utc;

use crate::error::{SyncError, SyncResult};
use crate::gateway::{
    decode_all, require_id, to_document, Gateway, Stamped, CUSTOMERS, CUSTOMER_PAGE_LIMIT,
};
use crate::ledger::{Customer, CustomerUpdate, NewCustomer};
use crate::store::{Direction, DocumentStore, Query};

impl<S: DocumentStore + ?Sized> Gateway<S> {
    pub async fn add_customer(&self, customer: NewCustomer) -> SyncResult<Customer> {
        customer.validate().map_err(SyncError::Validation)?;

        let now = Utc::now();
        let doc = to_document(&Stamped::created(&customer, now))?;
        let store = &self.store;
        let id = self
            .execute("add_customer", move || store.add(CUSTOMERS, doc.clone()))
            .await?;

        tracing::info!(customer_id = %id, user_id = %customer.user_id, name = %customer.name, "Customer added");
        self.ctx.signals().customer_mutated();

        Ok(Customer::from_new(id, customer, now))
    }

    /// The most recently updated customers of a user, one page.
    pub async fn get_customers(&self, user_id: &str) -> SyncResult<Vec<Customer>> {
        require_id("user_id", user_id)?;
        let query = Query::new(CUSTOMERS)
            .where_eq("user_id", user_id)
            .order_by("updated_at", Direction::Descending)
            .limit(CUSTOMER_PAGE_LIMIT);
        let store = &self.store;
        let query = &query;
        let snapshots = self.execute("get_customers", move || store.query(query)).await?;
        Ok(decode_all(CUSTOMERS, snapshots))
    }

    pub async fn update_customer(&self, customer_id: &str, update: CustomerUpdate) -> SyncResult<()> {
        require_id("customer_id", customer_id)?;
        update.validate().map_err(SyncError::Validation)?;

        let doc = to_document(&Stamped::updated(&update, Utc::now()))?;
        let store = &self.store;
        self.execute("update_customer", move || {
            store.update(CUSTOMERS, customer_id, doc.clone())
        })
        .await?;

        tracing::info!(customer_id, "Customer updated");
        self.ctx.signals().customer_mutated();
        Ok(())
    }

    pub async fn delete_customer(&self, customer_id: &str) -> SyncResult<()> {
        require_id("customer_id", customer_id)?;

        let store = &self.store;
        self.execute("delete_customer", move || store.delete(CUSTOMERS, customer_id))
            .await?;

        tracing::info!(customer_id, "Customer deleted");
        self.ctx.signals().customer_mutated();
        Ok(())
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SyncContext;
    use crate::store::MemoryStore;
    use std::sync::Arc;

    fn gateway() -> Gateway<MemoryStore> {
        Gateway::new(Arc::new(MemoryStore::new(None)), SyncContext::default())
    }

    fn customer(name: &str) -> NewCustomer {
        NewCustomer {
            user_id: "u1".into(),
            name: name.into(),
            phone: None,
            metadata: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_add_update_delete() {
        let gw = gateway();
        let added = gw.add_customer(customer("Gopal")).await.unwrap();
        assert!(gw.context().signals().customer_cache_invalidated().is_some());
        assert!(gw.context().signals().last_transaction_activity().is_none());

        let update = CustomerUpdate {
            phone: Some("9841000000".into()),
            ..Default::default()
        };
        gw.update_customer(&added.id, update).await.unwrap();

        let customers = gw.get_customers("u1").await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Gopal");
        assert_eq!(customers[0].phone.as_deref(), Some("9841000000"));

        gw.delete_customer(&added.id).await.unwrap();
        assert!(gw.get_customers("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_customer_page_is_limited() {
        let gw = gateway();
        for i in 0..(CUSTOMER_PAGE_LIMIT + 5) {
            gw.add_customer(customer(&format!("Customer {}", i))).await.unwrap();
        }

        assert_eq!(gw.get_customers("u1").await.unwrap().len(), CUSTOMER_PAGE_LIMIT);
        assert_eq!(gw.store().count_in(CUSTOMERS), CUSTOMER_PAGE_LIMIT + 5);
    }

    #[tokio::test]
    async fn test_most_recently_updated_first() {
        let gw = gateway();
        let old = gw.add_customer(customer("Old")).await.unwrap();
        gw.add_customer(customer("New")).await.unwrap();

        gw.update_customer(
            &old.id,
            CustomerUpdate {
                name: Some("Old but touched".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        let customers = gw.get_customers("u1").await.unwrap();
        assert_eq!(customers[0].name, "Old but touched");
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let gw = gateway();
        assert!(matches!(
            gw.add_customer(customer(" ")).await,
            Err(SyncError::Validation(_))
        ));
    }
}
