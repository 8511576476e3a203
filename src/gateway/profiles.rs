//! User profile operations.

use chrono::Utc;
use serde_json::{Map, Value};

use crate::error::SyncResult;
use crate::gateway::{decode, require_id, to_document, Gateway, Stamped, PROFILES};
use crate::ledger::UserProfile;
use crate::store::DocumentStore;

impl<S: DocumentStore + ?Sized> Gateway<S> {
    pub async fn get_user_profile(&self, user_id: &str) -> SyncResult<Option<UserProfile>> {
        require_id("user_id", user_id)?;

        let store = &self.store;
        let doc = self
            .execute("get_user_profile", move || store.get(PROFILES, user_id))
            .await?;

        doc.map(|data| decode(user_id.to_string(), data)).transpose()
    }

    /// Create the profile or replace the given fields of an existing one.
    pub async fn upsert_user_profile(
        &self,
        user_id: &str,
        mut fields: Map<String, Value>,
    ) -> SyncResult<UserProfile> {
        require_id("user_id", user_id)?;
        fields.remove("id");
        fields.remove("updated_at");

        let now = Utc::now();
        let doc = to_document(&Stamped::updated(&fields, now))?;
        let store = &self.store;
        self.execute("upsert_user_profile", move || {
            store.set(PROFILES, user_id, doc.clone(), true)
        })
        .await?;

        tracing::info!(user_id, fields = fields.len(), "User profile upserted");
        Ok(UserProfile {
            id: user_id.to_string(),
            updated_at: Some(now),
            fields,
        })
    }

    pub async fn delete_user_profile(&self, user_id: &str) -> SyncResult<()> {
        require_id("user_id", user_id)?;

        let store = &self.store;
        self.execute("delete_user_profile", move || store.delete(PROFILES, user_id))
            .await?;

        tracing::info!(user_id, "User profile deleted");
        Ok(())
    }
}
