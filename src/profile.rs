// profile.rs — Decoded provisioning profile payload
//
// The payload handed over by the verifier is a property list. Decoding is
// delegated to the plist crate; this module only cares that the mapping
// carries a non-empty UUID, plus a few display fields surfaced in logs.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::time::SystemTime;

use crate::error::{Error, Result};

#[derive(Debug, Deserialize)]
pub struct ProfilePayload {
    #[serde(rename = "UUID")]
    uuid: Option<String>,

    #[serde(rename = "Name")]
    pub name: Option<String>,

    #[serde(rename = "TeamName")]
    pub team_name: Option<String>,

    #[serde(rename = "ExpirationDate")]
    expiration_date: Option<plist::Date>,
}

impl ProfilePayload {
    pub fn decode(payload: &[u8]) -> Result<Self> {
        Ok(plist::from_bytes(payload)?)
    }

    /// The profile's unique identifier. Missing or empty is fatal.
    pub fn identifier(&self) -> Result<&str> {
        match self.uuid.as_deref() {
            Some(uuid) if !uuid.is_empty() => Ok(uuid),
            _ => Err(Error::IdentifierMissing),
        }
    }

    pub fn expiration(&self) -> Option<DateTime<Utc>> {
        self.expiration_date
            .clone()
            .map(|date| DateTime::<Utc>::from(SystemTime::from(date)))
    }

    pub fn is_expired(&self) -> bool {
        self.expiration().is_some_and(|when| when < Utc::now())
    }
}
