//! Pattern-based intelligence extraction from counterparty messages.

use regex::Regex;
use thiserror::Error;

use crate::domain::foundation::DomainError;
use crate::domain::session::{ExtractedIntelligence, IntelCategory};

/// Maximum message length scanned (bytes).
pub const MAX_SCAN_LENGTH: usize = 20_000;

/// Payment-handle providers recognised in UPI ids.
const UPI_PROVIDERS: &[&str] = &[
    "paytm",
    "phonepe",
    "googlepay",
    "ybl",
    "axl",
    "okhdfcbank",
    "okicici",
    "okaxis",
    "oksbi",
];

const SHORT_LINK_HOSTS: &[&str] = &["bit.ly", "tinyurl.com", "goo.gl"];

const BANK_NAMES: &[&str] = &["sbi", "hdfc", "icici", "axis", "pnb", "bob", "canara"];

/// Phrases worth recording whenever a scammer uses them.
pub const DEFAULT_WATCH_LIST: &[&str] = &[
    "urgent",
    "immediately",
    "verify",
    "blocked",
    "suspended",
    "locked",
    "otp",
    "kyc",
    "pin",
    "cvv",
    "password",
    "refund",
    "cashback",
    "prize",
    "lottery",
    "reward",
    "arrest",
    "legal action",
    "penalty",
    "click",
    "link",
    "transfer",
    "upi",
];

const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')', ']', '}', '"', '\''];

/// Errors from extraction.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("Message too long to scan: {actual} bytes exceeds maximum of {max} bytes")]
    TooLong { max: usize, actual: usize },
}

/// Compiled extraction patterns.
#[derive(Debug)]
pub struct IntelligenceExtractor {
    phone: Regex,
    formatted_phone: Regex,
    account: Regex,
    ifsc: Regex,
    url: Regex,
    short_link: Regex,
    upi: Regex,
    keywords: Vec<(String, Regex)>,
    bank_names: Vec<(String, Regex)>,
}

impl IntelligenceExtractor {
    /// Builds an extractor with the default keyword watch-list.
    pub fn new() -> Result<Self, DomainError> {
        let watch_list: Vec<String> = DEFAULT_WATCH_LIST.iter().map(|s| s.to_string()).collect();
        Self::with_watch_list(&watch_list)
    }

    /// Builds an extractor with a custom keyword watch-list.
    pub fn with_watch_list(watch_list: &[String]) -> Result<Self, DomainError> {
        let short_hosts = SHORT_LINK_HOSTS
            .iter()
            .map(|h| regex::escape(h))
            .collect::<Vec<_>>()
            .join("|");

        Ok(Self {
            phone: compile("phone", r"(?:\+91[\s-]?|\b91|\b0?)[6-9]\d{9}\b")?,
            formatted_phone: compile("phone", r"\b\d{3}[-.\s]\d{3}[-.\s]\d{4}\b")?,
            account: compile("bank_account", r"\b\d{11,18}\b")?,
            ifsc: compile("ifsc", r"\b[A-Z]{4}0[A-Z0-9]{6}\b")?,
            url: compile("url", r"https?://[^\s]+")?,
            short_link: compile("short_link", &format!(r"\b(?:{})/\S+", short_hosts))?,
            upi: compile("upi", &format!(r"[\w.-]+@(?:{})", UPI_PROVIDERS.join("|")))?,
            keywords: compile_words("watch_list", watch_list, |w| w.to_string())?,
            bank_names: compile_words(
                "bank_names",
                &BANK_NAMES.iter().map(|s| s.to_string()).collect::<Vec<_>>(),
                |w| w.to_uppercase(),
            )?,
        })
    }

    /// Extracts every category from a message.
    ///
    /// Values are deduplicated per category in discovery order.
    pub fn extract(&self, text: &str) -> Result<ExtractedIntelligence, ExtractionError> {
        if text.len() > MAX_SCAN_LENGTH {
            return Err(ExtractionError::TooLong {
                max: MAX_SCAN_LENGTH,
                actual: text.len(),
            });
        }

        let mut found = ExtractedIntelligence::new();
        for phone in self.phone_numbers(text) {
            found.insert(IntelCategory::PhoneNumbers, &phone);
        }
        for account in self.bank_accounts(text) {
            found.insert(IntelCategory::BankAccounts, &account);
        }
        for link in self.links(text) {
            found.insert(IntelCategory::PhishingLinks, &link);
        }
        for upi in self.upi_ids(text) {
            found.insert(IntelCategory::UpiIds, &upi);
        }
        for keyword in self.keywords(text) {
            found.insert(IntelCategory::SuspiciousKeywords, &keyword);
        }
        Ok(found)
    }

    pub fn phone_numbers(&self, text: &str) -> Vec<String> {
        self.phone
            .find_iter(text)
            .chain(self.formatted_phone.find_iter(text))
            .map(|m| m.as_str().to_string())
            .collect()
    }

    /// Account numbers (phone-shaped digit runs excluded) and IFSC codes.
    pub fn bank_accounts(&self, text: &str) -> Vec<String> {
        self.account
            .find_iter(text)
            .map(|m| m.as_str())
            .filter(|digits| !is_phone_shaped(digits))
            .chain(self.ifsc.find_iter(text).map(|m| m.as_str()))
            .map(str::to_string)
            .collect()
    }

    pub fn links(&self, text: &str) -> Vec<String> {
        let urls: Vec<String> = self
            .url
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
            .filter(|u| !u.is_empty())
            .collect();

        let short: Vec<String> = self
            .short_link
            .find_iter(text)
            .map(|m| m.as_str().trim_end_matches(TRAILING_PUNCTUATION).to_string())
            .filter(|s| !urls.iter().any(|u| u.contains(s.as_str())))
            .collect();

        urls.into_iter().chain(short).collect()
    }

    /// UPI handles, lowercased. Email addresses on the same domains are skipped.
    pub fn upi_ids(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.upi
            .find_iter(&lower)
            .filter(|m| !continues_as_domain(&lower[m.end()..]))
            .map(|m| m.as_str().trim_start_matches(['.', '-']).to_string())
            .collect()
    }

    /// Watch-list phrases and bank names present in the message.
    pub fn keywords(&self, text: &str) -> Vec<String> {
        let lower = text.to_lowercase();
        self.keywords
            .iter()
            .chain(self.bank_names.iter())
            .filter(|(_, re)| re.is_match(&lower))
            .map(|(value, _)| value.clone())
            .collect()
    }
}

/// 11-digit `0[6-9]...` or 12-digit `91[6-9]...` runs are phone numbers.
fn is_phone_shaped(digits: &str) -> bool {
    let bytes = digits.as_bytes();
    match bytes.len() {
        11 => bytes[0] == b'0' && (b'6'..=b'9').contains(&bytes[1]),
        12 => digits.starts_with("91") && (b'6'..=b'9').contains(&bytes[2]),
        _ => false,
    }
}

/// True if the text right after a handle continues it (`x@paytm.com`, `x@ybl2`).
fn continues_as_domain(rest: &str) -> bool {
    let mut chars = rest.chars();
    match chars.next() {
        Some(c) if c.is_alphanumeric() || c == '_' => true,
        Some('.') => chars.next().map_or(false, |c| c.is_alphabetic()),
        _ => false,
    }
}

fn compile(table: &str, pattern: &str) -> Result<Regex, DomainError> {
    Regex::new(pattern).map_err(|e| DomainError::invalid_pattern(table, pattern, e))
}

fn compile_words(
    table: &str,
    words: &[String],
    label: impl Fn(&str) -> String,
) -> Result<Vec<(String, Regex)>, DomainError> {
    words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .map(|w| {
            let pattern = format!(r"\b{}\b", regex::escape(&w));
            compile(table, &pattern).map(|re| (label(&w), re))
        })
        .collect()
}
