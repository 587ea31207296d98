use std::env;
use std::time::Duration;

use crate::error::{BookError, Result};

pub const DEFAULT_TABLE: &str = "books";
pub const DEFAULT_SEARCH_INDEX: &str = "books-author-index";
pub const DEFAULT_BUCKET: &str = "book-tracker-attachments";
pub const DEFAULT_URL_EXPIRATION_SECS: u64 = 300;
/// S3 rejects pre-signed URLs valid for longer than a week.
pub const MAX_URL_EXPIRATION_SECS: u64 = 604_800;

/// Runtime configuration, read once at cold start.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub table_name: String,
    pub search_index: String,
    pub bucket_name: String,
    pub url_expiration: Duration,
    pub dynamodb_endpoint: Option<String>,
    pub s3_endpoint: Option<String>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as `from_env` but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let table_name = lookup("BOOKS_TABLE")
            .or_else(|| lookup("TABLE"))
            .unwrap_or_else(|| DEFAULT_TABLE.to_string());
        let search_index =
            lookup("SEARCH_INDEX").unwrap_or_else(|| DEFAULT_SEARCH_INDEX.to_string());
        let bucket_name =
            lookup("ATTACHMENT_S3_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string());

        let url_expiration = match lookup("SIGNED_URL_EXPIRATION") {
            Some(raw) => parse_expiration(&raw)?,
            None => Duration::from_secs(DEFAULT_URL_EXPIRATION_SECS),
        };

        Ok(Self {
            table_name,
            search_index,
            bucket_name,
            url_expiration,
            dynamodb_endpoint: lookup("DYNAMODB_ENDPOINT").filter(|s| !s.is_empty()),
            s3_endpoint: lookup("S3_ENDPOINT").filter(|s| !s.is_empty()),
        })
    }
}

fn parse_expiration(raw: &str) -> Result<Duration> {
    let secs: u64 = raw.trim().parse().map_err(|e| {
        BookError::Config(format!("SIGNED_URL_EXPIRATION must be seconds, got {:?}: {}", raw, e))
    })?;
    if secs == 0 {
        return Err(BookError::Config(
            "SIGNED_URL_EXPIRATION must be greater than zero".to_string(),
        ));
    }
    if secs > MAX_URL_EXPIRATION_SECS {
        return Err(BookError::Config(format!(
            "SIGNED_URL_EXPIRATION must be at most {} seconds, got {}",
            MAX_URL_EXPIRATION_SECS, secs
        )));
    }
    Ok(Duration::from_secs(secs))
}
