//! Contacts, phone number normalization and per-user plugin data
//!
//! Phone numbers are kept without their leading `+` and handed to providers with it
//! re-added, so `+15551234567` and `15551234567` describe the same contact.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::{AlertError, Result};
use crate::types::UserId;

const MAX_PHONE_NUMBER_LEN: usize = 30;

/// Formatting characters people type between digit groups
const SEPARATORS: [char; 5] = [' ', '-', '.', '(', ')'];

/// A normalized phone number, stored without the leading `+`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize a raw number for storage.
    ///
    /// Returns `Ok(None)` for a blank number: such a contact exists but cannot be
    /// reached. Spaces, dashes, dots and parentheses are dropped; anything else
    /// that is not a digit is rejected.
    pub fn parse(raw: &str) -> Result<Option<Self>> {
        let trimmed = raw.trim();
        let unprefixed = trimmed.strip_prefix('+').unwrap_or(trimmed);
        let digits: String = unprefixed.chars().filter(|c| !SEPARATORS.contains(c)).collect();

        if digits.is_empty() {
            return Ok(None);
        }
        if digits.len() > MAX_PHONE_NUMBER_LEN {
            return Err(AlertError::InvalidPhoneNumber(format!(
                "{} is longer than {} digits",
                raw, MAX_PHONE_NUMBER_LEN
            )));
        }
        if !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(AlertError::InvalidPhoneNumber(format!(
                "{} contains characters other than digits",
                raw
            )));
        }

        Ok(Some(Self(digits)))
    }

    /// Stored representation, without `+`
    pub fn stored(&self) -> &str {
        &self.0
    }

    /// Dialable representation, with `+`
    pub fn prefixed(&self) -> String {
        format!("+{}", self.0)
    }
}

impl fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "+{}", self.0)
    }
}

/// A person who may be texted or called about a service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contact {
    pub user: UserId,
    pub phone_number: Option<PhoneNumber>,
}

impl Contact {
    pub fn new(user: UserId, phone_number: Option<PhoneNumber>) -> Self {
        Self { user, phone_number }
    }

    /// Number to dial, `None` when the contact cannot be reached
    pub fn prefixed_phone_number(&self) -> Option<String> {
        self.phone_number.as_ref().map(PhoneNumber::prefixed)
    }
}

/// Plugin settings a user filled in on their profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserData {
    pub user: UserId,
    pub phone_number: Option<PhoneNumber>,
}

impl UserData {
    pub fn to_contact(&self) -> Contact {
        Contact::new(self.user.clone(), self.phone_number.clone())
    }
}

/// In-memory lookup of plugin user data, keyed by user
#[derive(Debug, Default)]
pub struct UserDataStore {
    entries: RwLock<HashMap<UserId, UserData>>,
}

impl UserDataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a user's phone number, normalizing it first.
    ///
    /// Replaces any previous record for the same user.
    pub fn save(&self, user: UserId, phone_number: Option<&str>) -> Result<UserData> {
        let phone_number = match phone_number {
            Some(raw) => PhoneNumber::parse(raw)?,
            None => None,
        };
        let data = UserData {
            user: user.clone(),
            phone_number,
        };
        self.entries.write().insert(user, data.clone());
        Ok(data)
    }

    pub fn get(&self, user: &UserId) -> Option<UserData> {
        self.entries.read().get(user).cloned()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    /// Resolve users to contacts in the order given.
    ///
    /// Users without plugin data are left out; repeated users appear repeatedly.
    pub fn contacts_for(&self, users: &[UserId]) -> Vec<Contact> {
        let entries = self.entries.read();
        users
            .iter()
            .filter_map(|user| entries.get(user).map(UserData::to_contact))
            .collect()
    }
}
