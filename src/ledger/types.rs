//! Ledger documents and the payloads used to create or change them.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::ledger::date::BsDate;

/// Direction of money in a ledger line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money handed to the customer; they owe it back.
    Given,
    /// Money collected from the customer.
    Received,
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TransactionType::Given => "given",
            TransactionType::Received => "received",
        })
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "given" => Ok(TransactionType::Given),
            "received" => Ok(TransactionType::Received),
            other => Err(format!("unknown transaction type '{}'", other)),
        }
    }
}

/// A single ledger line owned by one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionEntry {
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub description: Option<String>,
    pub transaction_date: BsDate,
    #[serde(default)]
    pub balance_after: Decimal,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TransactionEntry {
    /// Materialize a freshly added entry.
    pub fn from_new(id: String, new: NewTransactionEntry, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            customer_id: new.customer_id,
            customer_name: new.customer_name,
            amount: new.amount,
            transaction_type: new.transaction_type,
            description: new.description,
            transaction_date: new.transaction_date,
            balance_after: new.balance_after,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for a new ledger line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewTransactionEntry {
    pub user_id: String,
    #[serde(default)]
    pub customer_id: Option<String>,
    pub customer_name: String,
    pub amount: Decimal,
    pub transaction_type: TransactionType,
    #[serde(default)]
    pub description: Option<String>,
    pub transaction_date: BsDate,
    #[serde(default)]
    pub balance_after: Decimal,
}

impl NewTransactionEntry {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("customer_name", &self.customer_name)?;
        require_positive(self.amount)?;
        self.transaction_date.validate()
    }
}

/// Field-level changes to an existing ledger line. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TransactionUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_date: Option<BsDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance_after: Option<Decimal>,
}

impl TransactionUpdate {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(name) = &self.customer_name {
            require_non_empty("customer_name", name)?;
        }
        if let Some(amount) = self.amount {
            require_positive(amount)?;
        }
        if let Some(date) = &self.transaction_date {
            date.validate()?;
        }
        Ok(())
    }
}

/// A customer in a user's ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Customer {
    pub id: String,
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Customer {
    pub fn from_new(id: String, new: NewCustomer, now: DateTime<Utc>) -> Self {
        Self {
            id,
            user_id: new.user_id,
            name: new.name,
            phone: new.phone,
            metadata: new.metadata,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Input for a new customer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewCustomer {
    pub user_id: String,
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub metadata: Map<String, Value>,
}

impl NewCustomer {
    pub fn validate(&self) -> Result<(), String> {
        require_non_empty("user_id", &self.user_id)?;
        require_non_empty("name", &self.name)
    }
}

/// Field-level changes to a customer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Map<String, Value>>,
}

impl CustomerUpdate {
    pub fn validate(&self) -> Result<(), String> {
        match &self.name {
            Some(name) => require_non_empty("name", name),
            None => Ok(()),
        }
    }
}

/// Profile document; its id is the owning user id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

/// Summary of a best-effort bulk deletion.
///
/// Counts are items found and attempted per phase, not items confirmed
/// deleted; a failure part-way through a phase shows up in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionReport {
    pub customers: usize,
    pub transactions: usize,
    pub profile: bool,
    pub errors: Vec<String>,
}

impl DeletionReport {
    pub fn is_complete(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Outcome of the store connection check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionReport {
    pub success: bool,
    pub error: Option<String>,
}

fn require_non_empty(field: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{} must not be empty", field))
    } else {
        Ok(())
    }
}

fn require_positive(amount: Decimal) -> Result<(), String> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(format!("amount must be positive, got {}", amount))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn new_entry() -> NewTransactionEntry {
        NewTransactionEntry {
            user_id: "u1".into(),
            customer_id: None,
            customer_name: "Ram Bahadur".into(),
            amount: Decimal::new(150050, 2),
            transaction_type: TransactionType::Given,
            description: Some("rice".into()),
            transaction_date: BsDate { year: 2081, month: 4, day: 15 },
            balance_after: Decimal::ZERO,
        }
    }

    #[test]
    fn test_new_entry_validation() {
        assert!(new_entry().validate().is_ok());

        let mut entry = new_entry();
        entry.amount = Decimal::ZERO;
        assert!(entry.validate().unwrap_err().contains("positive"));

        let mut entry = new_entry();
        entry.customer_name = "  ".into();
        assert!(entry.validate().is_err());

        let mut entry = new_entry();
        entry.transaction_date.month = 13;
        assert!(entry.validate().is_err());
    }

    #[test]
    fn test_update_validation() {
        assert!(TransactionUpdate::default().validate().is_ok());
        let update = TransactionUpdate {
            amount: Some(Decimal::new(-5, 0)),
            ..Default::default()
        };
        assert!(update.validate().is_err());
    }

    #[test]
    fn test_update_serializes_only_set_fields() {
        let update = TransactionUpdate {
            amount: Some(Decimal::new(200, 0)),
            ..Default::default()
        };
        let value = serde_json::to_value(&update).unwrap();
        assert_eq!(value.as_object().unwrap().len(), 1);
        assert!(value.get("amount").is_some());
    }

    #[test]
    fn test_transaction_type_wire_format() {
        assert_eq!(serde_json::to_value(TransactionType::Received).unwrap(), json!("received"));
        assert_eq!("GIVEN".parse::<TransactionType>().unwrap(), TransactionType::Given);
    }

    #[test]
    fn test_profile_flattens_fields() {
        let profile: UserProfile = serde_json::from_value(json!({
            "id": "u1",
            "business_name": "Sharma Kirana",
            "updated_at": "2024-07-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(profile.id, "u1");
        assert!(profile.updated_at.is_some());
        assert_eq!(profile.fields["business_name"], "Sharma Kirana");
        assert!(!profile.fields.contains_key("id"));
    }

    #[test]
    fn test_entry_defaults_when_missing() {
        let entry: TransactionEntry = serde_json::from_value(json!({
            "id": "t1",
            "user_id": "u1",
            "customer_name": "Sita",
            "amount": "500",
            "transaction_type": "received",
            "transaction_date": {"year": 2081, "month": 1, "day": 2},
            "created_at": "2024-07-01T10:00:00Z",
            "updated_at": "2024-07-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(entry.balance_after, Decimal::ZERO);
        assert!(entry.customer_id.is_none());
        assert_eq!(entry.amount, Decimal::new(500, 0));
    }
}
