//! Typed IDs for type-safe entity references.
//!
//! Using typed IDs prevents accidentally passing a `PeriodId` where a
//! `CompanyId` is expected.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Macro to generate typed ID wrappers.
macro_rules! typed_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Creates a new random ID using UUID v7 (time-ordered).
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }

            /// Creates an ID from an existing UUID.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner UUID.
            #[must_use]
            pub const fn into_inner(self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

typed_id!(CompanyId, "Unique identifier for a company (tenant).");
typed_id!(
    AccountId,
    "Unique identifier for a chart of accounts entry."
);
typed_id!(PeriodId, "Unique identifier for an accounting period.");
typed_id!(
    ChecklistItemId,
    "Unique identifier for a period close checklist item."
);
typed_id!(JournalEntryId, "Unique identifier for a journal entry.");
typed_id!(JournalLineId, "Unique identifier for a journal line.");
typed_id!(CloseRunId, "Unique identifier for a close run.");
typed_id!(
    RecurringTemplateId,
    "Unique identifier for a recurring journal template."
);
typed_id!(BankAccountId, "Unique identifier for a bank account.");
typed_id!(
    BankTransactionId,
    "Unique identifier for a bank transaction."
);
typed_id!(PaymentId, "Unique identifier for a payment record.");
typed_id!(
    ReconciliationMatchId,
    "Unique identifier for a reconciliation match."
);

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_typed_id_new_is_unique() {
        let a = PeriodId::new();
        let b = PeriodId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn test_typed_id_roundtrip() {
        let id = CompanyId::new();
        let parsed = CompanyId::from_str(&id.to_string()).unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn test_typed_id_from_uuid() {
        let uuid = Uuid::now_v7();
        let id = BankTransactionId::from_uuid(uuid);
        assert_eq!(id.into_inner(), uuid);
    }
}
