//! Transaction entry operations.

use chrono::Utc;

use crate::error::{SyncError, SyncResult};
use crate::gateway::{decode_all, require_id, to_document, Gateway, Stamped, TRANSACTION_ENTRIES};
use crate::ledger::{NewTransactionEntry, TransactionEntry, TransactionUpdate};
use crate::store::{DocumentStore, Query};

impl<S: DocumentStore + ?Sized> Gateway<S> {
    /// Add a ledger line and raise the transaction signals.
    pub async fn add_transaction_entry(
        &self,
        entry: NewTransactionEntry,
    ) -> SyncResult<TransactionEntry> {
        entry.validate().map_err(SyncError::Validation)?;

        let now = Utc::now();
        let doc = to_document(&Stamped::created(&entry, now))?;
        let store = &self.store;
        let id = self
            .execute("add_transaction_entry", move || {
                store.add(TRANSACTION_ENTRIES, doc.clone())
            })
            .await?;

        tracing::info!(
            entry_id = %id,
            user_id = %entry.user_id,
            customer = %entry.customer_name,
            amount = %entry.amount,
            kind = %entry.transaction_type,
            "Transaction entry added"
        );
        self.ctx.signals().transaction_mutated();

        Ok(TransactionEntry::from_new(id, entry, now))
    }

    /// All entries of a user, newest first by creation time.
    pub async fn get_transaction_entries(&self, user_id: &str) -> SyncResult<Vec<TransactionEntry>> {
        require_id("user_id", user_id)?;

        let query = Query::new(TRANSACTION_ENTRIES).where_eq("user_id", user_id);
        let store = &self.store;
        let query = &query;
        let snapshots = self
            .execute("get_transaction_entries", move || store.query(query))
            .await?;

        let mut entries: Vec<TransactionEntry> = decode_all(TRANSACTION_ENTRIES, snapshots);
        entries.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        tracing::debug!(user_id, count = entries.len(), "Fetched transaction entries");
        Ok(entries)
    }

    /// Entries of a user for one customer, matched on the exact name.
    pub async fn get_transaction_entries_by_customer_name(
        &self,
        user_id: &str,
        customer_name: &str,
    ) -> SyncResult<Vec<TransactionEntry>> {
        require_id("user_id", user_id)?;
        require_id("customer_name", customer_name)?;

        let query = Query::new(TRANSACTION_ENTRIES)
            .where_eq("user_id", user_id)
            .where_eq("customer_name", customer_name);
        let store = &self.store;
        let query = &query;
        let snapshots = self
            .execute("get_transaction_entries_by_customer_name", move || {
                store.query(query)
            })
            .await?;

        let entries: Vec<TransactionEntry> = decode_all(TRANSACTION_ENTRIES, snapshots);
        tracing::debug!(user_id, customer_name, count = entries.len(), "Fetched customer entries");
        Ok(entries)
    }

    /// Apply field-level changes to an entry and raise the transaction signals.
    pub async fn update_transaction_entry(
        &self,
        entry_id: &str,
        update: TransactionUpdate,
    ) -> SyncResult<()> {
        require_id("entry_id", entry_id)?;
        update.validate().map_err(SyncError::Validation)?;

        let doc = to_document(&Stamped::updated(&update, Utc::now()))?;
        let store = &self.store;
        self.execute("update_transaction_entry", move || {
            store.update(TRANSACTION_ENTRIES, entry_id, doc.clone())
        })
        .await?;

        tracing::info!(entry_id, "Transaction entry updated");
        self.ctx.signals().transaction_mutated();
        Ok(())
    }

    /// Delete an entry and raise the transaction signals.
    pub async fn delete_transaction_entry(&self, entry_id: &str) -> SyncResult<()> {
        require_id("entry_id", entry_id)?;

        let store = &self.store;
        self.execute("delete_transaction_entry", move || {
            store.delete(TRANSACTION_ENTRIES, entry_id)
        })
        .await?;

        tracing::info!(entry_id, "Transaction entry deleted");
        self.ctx.signals().transaction_mutated();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SyncContext;
    use crate::ledger::{BsDate, TransactionType};
    use crate::store::MemoryStore;
    use rust_decimal::Decimal;
    use std::sync::Arc;

    fn gateway() -> Gateway<MemoryStore> {
        Gateway::new(Arc::new(MemoryStore::new(None)), SyncContext::default())
    }

    fn entry(customer: &str, amount: i64) -> NewTransactionEntry {
        NewTransactionEntry {
            user_id: "u1".into(),
            customer_id: None,
            customer_name: customer.into(),
            amount: Decimal::new(amount, 0),
            transaction_type: TransactionType::Given,
            description: None,
            transaction_date: BsDate { year: 2081, month: 5, day: 1 },
            balance_after: Decimal::ZERO,
        }
    }

    #[tokio::test]
    async fn test_add_and_list_newest_first() {
        let gw = gateway();
        let first = gw.add_transaction_entry(entry("Ram", 100)).await.unwrap();
        let second = gw.add_transaction_entry(entry("Sita", 200)).await.unwrap();

        let entries = gw.get_transaction_entries("u1").await.unwrap();
        assert_eq!(entries.len(), 2);
        assert!(entries[0].created_at >= entries[1].created_at);
        let ids: Vec<_> = entries.iter().map(|e| e.id.clone()).collect();
        assert!(ids.contains(&first.id) && ids.contains(&second.id));

        assert!(gw.get_transaction_entries("someone-else").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_rejects_non_positive_amount_without_calling_store() {
        let gw = gateway();
        let err = gw.add_transaction_entry(entry("Ram", 0)).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(gw.store().count(), 0);
        assert_eq!(gw.context().health().consecutive_failures(), 0);
        assert!(gw.context().signals().last_transaction_activity().is_none());
    }

    #[tokio::test]
    async fn test_filter_by_customer_name() {
        let gw = gateway();
        gw.add_transaction_entry(entry("Ram", 100)).await.unwrap();
        gw.add_transaction_entry(entry("Ram", 50)).await.unwrap();
        gw.add_transaction_entry(entry("Hari", 10)).await.unwrap();

        let ram = gw
            .get_transaction_entries_by_customer_name("u1", "Ram")
            .await
            .unwrap();
        assert_eq!(ram.len(), 2);
        assert!(ram.iter().all(|e| e.customer_name == "Ram"));
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let gw = gateway();
        let added = gw.add_transaction_entry(entry("Ram", 100)).await.unwrap();
        gw.context().signals().clear_needs_data_refresh();

        let update = TransactionUpdate {
            amount: Some(Decimal::new(175, 0)),
            transaction_type: Some(TransactionType::Received),
            ..Default::default()
        };
        gw.update_transaction_entry(&added.id, update).await.unwrap();
        assert!(gw.context().signals().take_needs_data_refresh());

        let entries = gw.get_transaction_entries("u1").await.unwrap();
        assert_eq!(entries[0].amount, Decimal::new(175, 0));
        assert_eq!(entries[0].transaction_type, TransactionType::Received);
        assert_eq!(entries[0].customer_name, "Ram");
        assert!(entries[0].updated_at >= entries[0].created_at);

        gw.delete_transaction_entry(&added.id).await.unwrap();
        assert!(gw.context().signals().needs_data_refresh());
        assert!(gw.get_transaction_entries("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_missing_entry_is_permanent() {
        let gw = gateway();
        let err = gw
            .update_transaction_entry("missing", TransactionUpdate::default())
            .await
            .unwrap_err();
        assert_eq!(err.class(), crate::resilience::FailureClass::Permanent);
        assert_eq!(gw.context().health().consecutive_failures(), 1);
        assert!(!gw.context().signals().needs_data_refresh());
    }
}
