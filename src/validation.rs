use regex::Regex;
use std::net::{IpAddr, SocketAddr};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("zone name is empty")]
    EmptyName,
    #[error("domain name '{0}' is too long (max 253 characters)")]
    NameTooLong(String),
    #[error("domain name '{0}' contains an empty label")]
    EmptyLabel(String),
    #[error("label '{0}' is too long (max 63 characters)")]
    LabelTooLong(String),
    #[error("label '{0}' contains invalid characters (only a-z, A-Z, 0-9, '-' and '_' allowed)")]
    InvalidCharacters(String),
    #[error("label '{0}' must not start or end with '-'")]
    LeadingOrTrailingHyphen(String),
    #[error("'{0}' is not an IPv4 or IPv6 address")]
    InvalidMasterAddress(String),
    #[error("masters are only meaningful for Slave zones (kind is {0})")]
    MastersRequireSlave(String),
    #[error("nameservers are not used for Slave zones")]
    NameserversOnSlave,
    #[error("properties require a zone kind")]
    MissingKind,
    #[error("unknown zone kind '{0}' (expected Native, Master or Slave)")]
    UnknownKind(String),
    #[error("unrecognized metadata key '{0}'")]
    UnknownMetadataKey(String),
    #[error("metadata key '{0}' is read-only")]
    ReadOnlyMetadataKey(String),
    #[error("metadata key '{key}' expects {expected}")]
    InvalidMetadataValue { key: String, expected: &'static str },
    #[error("'{value}' is not a valid value for {key} (expected one of: {choices})")]
    InvalidChoice {
        key: String,
        value: String,
        choices: String,
    },
}

lazy_static::lazy_static! {
    /// Letters, digits, '-' and '_' (the latter shows up in service-style labels)
    static ref LABEL_RE: Regex = Regex::new(r"^[A-Za-z0-9_-]+$").unwrap();
}

pub fn validate_label(label: &str) -> Result<(), ValidationError> {
    if label.len() > 63 {
        return Err(ValidationError::LabelTooLong(label.to_string()));
    }
    if !LABEL_RE.is_match(label) {
        return Err(ValidationError::InvalidCharacters(label.to_string()));
    }
    if label.starts_with('-') || label.ends_with('-') {
        return Err(ValidationError::LeadingOrTrailingHyphen(label.to_string()));
    }
    Ok(())
}

/// Validate a domain name and return it in canonical dot-terminated form.
pub fn normalize_fqdn(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    let d = trimmed.strip_suffix('.').unwrap_or(trimmed);
    if d.is_empty() {
        return Err(ValidationError::EmptyName);
    }
    if d.len() > 253 {
        return Err(ValidationError::NameTooLong(trimmed.to_string()));
    }
    for label in d.split('.') {
        if label.is_empty() {
            return Err(ValidationError::EmptyLabel(trimmed.to_string()));
        }
        validate_label(label)?;
    }
    Ok(format!("{d}."))
}

/// Masters are plain addresses, optionally with a port (`192.0.2.1:5300`, `[2001:db8::1]:5300`).
pub fn validate_master_address(addr: &str) -> Result<(), ValidationError> {
    if addr.parse::<IpAddr>().is_ok() || addr.parse::<SocketAddr>().is_ok() {
        Ok(())
    } else {
        Err(ValidationError::InvalidMasterAddress(addr.to_string()))
    }
}

pub fn validate_choice(
    key: &str,
    value: &str,
    choices: &[&str],
) -> Result<(), ValidationError> {
    if choices.contains(&value) {
        return Ok(());
    }
    Err(ValidationError::InvalidChoice {
        key: key.to_string(),
        value: value.to_string(),
        choices: choices.join(", "),
    })
}
