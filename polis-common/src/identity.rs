//! Report identity: the (url, language) pair that names one loaded report
//!
//! The identity is the result cache key, so two requests that differ only in
//! language must never compare equal.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Identity construction errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("Report URL is empty")]
    EmptyUrl,

    #[error("Language code must be exactly two letters, got {0:?}")]
    InvalidLanguage(String),
}

/// A report URL plus optional 2-letter translation language
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReportIdentity {
    url: String,
    language: Option<String>,
}

impl ReportIdentity {
    /// Build an identity from raw user input
    ///
    /// Both fields are trimmed. A blank language means "no translation".
    /// Language codes are lower-cased.
    pub fn new(url: &str, language: Option<&str>) -> Result<Self, IdentityError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(IdentityError::EmptyUrl);
        }

        let language = match language.map(str::trim).filter(|l| !l.is_empty()) {
            None => None,
            Some(lang) => {
                if lang.len() != 2 || !lang.chars().all(|c| c.is_ascii_alphabetic()) {
                    return Err(IdentityError::InvalidLanguage(lang.to_string()));
                }
                Some(lang.to_ascii_lowercase())
            }
        };

        Ok(Self {
            url: url.to_string(),
            language,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }
}

impl fmt::Display for ReportIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.language {
            Some(lang) => write!(f, "{} [{}]", self.url, lang),
            None => write!(f, "{}", self.url),
        }
    }
}
