//! Harvested intelligence, bucketed by category.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Fixed set of intelligence buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum IntelCategory {
    BankAccounts,
    UpiIds,
    PhishingLinks,
    PhoneNumbers,
    SuspiciousKeywords,
}

impl IntelCategory {
    /// All categories in report order.
    pub const ALL: [IntelCategory; 5] = [
        IntelCategory::BankAccounts,
        IntelCategory::UpiIds,
        IntelCategory::PhishingLinks,
        IntelCategory::PhoneNumbers,
        IntelCategory::SuspiciousKeywords,
    ];

    /// Categories that count towards "enough intelligence".
    pub const HIGH_VALUE: [IntelCategory; 4] = [
        IntelCategory::BankAccounts,
        IntelCategory::UpiIds,
        IntelCategory::PhishingLinks,
        IntelCategory::PhoneNumbers,
    ];

    /// Wire name of the category.
    pub fn as_str(&self) -> &'static str {
        match self {
            IntelCategory::BankAccounts => "bankAccounts",
            IntelCategory::UpiIds => "upiIds",
            IntelCategory::PhishingLinks => "phishingLinks",
            IntelCategory::PhoneNumbers => "phoneNumbers",
            IntelCategory::SuspiciousKeywords => "suspiciousKeywords",
        }
    }
}

impl fmt::Display for IntelCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deduplicated, insertion-ordered values per category.
///
/// # Invariants
///
/// - no value is empty or whitespace-only
/// - a value appears at most once per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedIntelligence {
    bank_accounts: Vec<String>,
    upi_ids: Vec<String>,
    phishing_links: Vec<String>,
    phone_numbers: Vec<String>,
    suspicious_keywords: Vec<String>,
}

impl ExtractedIntelligence {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a value, returning true if it was new.
    ///
    /// Values are trimmed; empty values and duplicates are ignored.
    pub fn insert(&mut self, category: IntelCategory, value: &str) -> bool {
        let value = value.trim();
        if value.is_empty() {
            return false;
        }

        let bucket = self.bucket_mut(category);
        if bucket.iter().any(|existing| existing == value) {
            return false;
        }
        bucket.push(value.to_string());
        true
    }

    /// Values captured for a category, in discovery order.
    pub fn get(&self, category: IntelCategory) -> &[String] {
        match category {
            IntelCategory::BankAccounts => &self.bank_accounts,
            IntelCategory::UpiIds => &self.upi_ids,
            IntelCategory::PhishingLinks => &self.phishing_links,
            IntelCategory::PhoneNumbers => &self.phone_numbers,
            IntelCategory::SuspiciousKeywords => &self.suspicious_keywords,
        }
    }

    /// Number of high-value categories holding at least one value.
    pub fn high_value_coverage(&self) -> usize {
        IntelCategory::HIGH_VALUE
            .iter()
            .filter(|category| !self.get(**category).is_empty())
            .count()
    }

    /// Total values across all categories.
    pub fn total_values(&self) -> usize {
        IntelCategory::ALL
            .iter()
            .map(|category| self.get(*category).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.total_values() == 0
    }

    fn bucket_mut(&mut self, category: IntelCategory) -> &mut Vec<String> {
        match category {
            IntelCategory::BankAccounts => &mut self.bank_accounts,
            IntelCategory::UpiIds => &mut self.upi_ids,
            IntelCategory::PhishingLinks => &mut self.phishing_links,
            IntelCategory::PhoneNumbers => &mut self.phone_numbers,
            IntelCategory::SuspiciousKeywords => &mut self.suspicious_keywords,
        }
    }
}
