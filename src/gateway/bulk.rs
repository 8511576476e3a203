//! Account-wide operations: bulk deletion and the connection check.
//!
//! Bulk deletion is best effort. Phases run one after another (customers,
//! transaction entries, profile) and a failing phase is recorded in the
//! report instead of aborting the rest.

use crate::error::SyncResult;
use crate::gateway::{require_id, Gateway, CUSTOMERS, PROFILES, TRANSACTION_ENTRIES};
use crate::ledger::{ConnectionReport, DeletionReport};
use crate::resilience::timeouts::with_timeout;
use crate::store::{DocumentStore, Query};

impl<S: DocumentStore + ?Sized> Gateway<S> {
    /// Delete every customer, transaction entry and the profile of a user.
    ///
    /// Always returns a report once the user id is valid. Counts are the
    /// documents found in each phase; a phase stops at its first failed
    /// delete and the failure is listed as `"<Phase>: <message>"`.
    pub async fn delete_all_user_data(&self, user_id: &str) -> SyncResult<DeletionReport> {
        require_id("user_id", user_id)?;
        tracing::warn!(user_id, "Deleting all user data");

        let mut report = DeletionReport::default();
        let mut customers = PhaseProgress::default();
        let mut transactions = PhaseProgress::default();

        if let Err(e) = self.delete_collection(CUSTOMERS, user_id, &mut customers).await {
            report.errors.push(format!("Customers: {}", e));
        }
        report.customers = customers.found;

        if let Err(e) = self
            .delete_collection(TRANSACTION_ENTRIES, user_id, &mut transactions)
            .await
        {
            report.errors.push(format!("Transactions: {}", e));
        }
        report.transactions = transactions.found;

        // Signals follow what was actually removed, not what was found.
        if transactions.deleted > 0 {
            self.ctx.signals().transaction_mutated();
        } else if customers.deleted > 0 {
            self.ctx.signals().customer_mutated();
        }

        let store = &self.store;
        match self
            .execute("delete_user_profile", move || store.delete(PROFILES, user_id))
            .await
        {
            Ok(()) => report.profile = true,
            Err(e) => report.errors.push(format!("Profile: {}", e)),
        }

        if report.is_complete() {
            tracing::info!(
                user_id,
                customers = report.customers,
                transactions = report.transactions,
                "All user data deleted"
            );
        } else {
            tracing::warn!(
                user_id,
                customers = report.customers,
                transactions = report.transactions,
                profile = report.profile,
                errors = ?report.errors,
                "User data deletion finished with errors"
            );
        }

        Ok(report)
    }

    /// Probe the store once. Never retried and never counted by the health monitor.
    pub async fn check_connection(&self) -> ConnectionReport {
        let settings = &self.ctx.config().store;
        let missing = settings.missing_settings();
        if !missing.is_empty() {
            let error = format!("Missing settings: {}", missing.join(", "));
            tracing::warn!(%error, "Store is not configured");
            return ConnectionReport {
                success: false,
                error: Some(error),
            };
        }

        match with_timeout(settings.probe_timeout(), self.store.ping()).await {
            Ok(()) => {
                tracing::info!(project_id = %settings.project_id, "Store connection ok");
                ConnectionReport {
                    success: true,
                    error: None,
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Store connection check failed");
                ConnectionReport {
                    success: false,
                    error: Some(e.user_message()),
                }
            }
        }
    }

    /// List the user's documents in `collection` and delete them one by one.
    async fn delete_collection(
        &self,
        collection: &'static str,
        user_id: &str,
        progress: &mut PhaseProgress,
    ) -> SyncResult<()> {
        let store = &self.store;
        let query = Query::new(collection).where_eq("user_id", user_id);
        let query = &query;
        let snapshots = self
            .execute("list_for_deletion", move || store.query(query))
            .await?;

        progress.found = snapshots.len();
        tracing::debug!(collection, user_id, found = progress.found, "Deleting documents");

        for snapshot in &snapshots {
            let id = snapshot.id.as_str();
            self.execute("delete_document", move || store.delete(collection, id))
                .await?;
            progress.deleted += 1;
        }
        Ok(())
    }
}

/// Per-phase counts: documents listed and documents confirmed deleted.
#[derive(Debug, Default)]
struct PhaseProgress {
    found: usize,
    deleted: usize,
}
