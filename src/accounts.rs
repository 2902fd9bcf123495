//! Account index
//!
//! Phone-to-account lookup used to reject usage from numbers that were never
//! provisioned. The index is loaded in bulk once per run through an
//! [`AccountSource`] and is read-only afterwards.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::models::AccountId;
use crate::normalizers::normalize_phone;

/// Where the billing system's phone/account pairs come from.
pub trait AccountSource {
    fn load_accounts(&self) -> Result<AccountIndex>;
}

#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    by_phone: HashMap<String, AccountId>,
}

impl AccountIndex {
    /// Build an index from raw phone/account pairs. Phones are normalized;
    /// pairs with an invalid phone are skipped and the first account wins for
    /// duplicate phones.
    pub fn from_entries<I, P>(entries: I) -> Self
    where
        I: IntoIterator<Item = (P, AccountId)>,
        P: AsRef<str>,
    {
        let mut by_phone = HashMap::new();
        for (phone, account) in entries {
            let raw = phone.as_ref();
            let Some(phone) = normalize_phone(raw) else {
                warn!(phone = raw, account = %account, "Skipping account with invalid phone");
                continue;
            };
            if by_phone.contains_key(&phone) {
                debug!(phone = %phone, account = %account, "Duplicate phone in account list");
                continue;
            }
            by_phone.insert(phone, account);
        }
        Self { by_phone }
    }

    /// Look up the account of a normalized 10-digit phone.
    pub fn lookup_account_for_phone(&self, phone: &str) -> Option<&AccountId> {
        self.by_phone.get(phone)
    }

    pub fn len(&self) -> usize {
        self.by_phone.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_phone.is_empty()
    }
}

#[derive(Debug, Deserialize)]
struct AccountRow {
    phone: String,
    account_id: AccountId,
}

/// JSON file holding `[{"phone": "...", "account_id": "..."}, ...]`.
#[derive(Debug, Clone)]
pub struct JsonAccountFile {
    path: PathBuf,
}

impl JsonAccountFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl AccountSource for JsonAccountFile {
    fn load_accounts(&self) -> Result<AccountIndex> {
        let content = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read account file: {}", self.path.display()))?;
        let rows: Vec<AccountRow> = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse account file: {}", self.path.display()))?;

        Ok(AccountIndex::from_entries(
            rows.into_iter().map(|row| (row.phone, row.account_id)),
        ))
    }
}
