use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::company::ContactUpdate;

/// Everything the scraper could pull out of a single page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInfo {
    pub emails: BTreeSet<String>,
    pub phones: BTreeSet<String>,
    pub addresses: BTreeSet<String>,
    pub contact_person: Option<String>,
}

impl ContactInfo {
    pub fn is_empty(&self) -> bool {
        self.emails.is_empty()
            && self.phones.is_empty()
            && self.addresses.is_empty()
            && self.contact_person.is_none()
    }

    /// Picks the first value of each kind for storing on a company row.
    pub fn to_contact_update(&self) -> ContactUpdate {
        ContactUpdate {
            email: self.emails.iter().next().cloned(),
            phone: self.phones.iter().next().cloned(),
            address: self.addresses.iter().next().cloned(),
            contact_person: self.contact_person.clone(),
        }
    }
}

/// Outcome for one site of a batch scrape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeResult {
    pub url: String,
    pub contacts: ContactInfo,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScrapeRequest {
    pub url: String,
    /// When set, the first contact of each kind is stored on this company.
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchScrapeRequest {
    pub urls: Vec<String>,
    pub delay_ms: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}
