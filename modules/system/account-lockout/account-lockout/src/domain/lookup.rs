//! Caller input parsing for account and token identifiers.

use account_lockout_sdk::AccountId;

const EMAIL_MIN_LEN: usize = 3;
const EMAIL_MAX_LEN: usize = 254;
const EMAIL_LOCAL_MAX_LEN: usize = 64;
const TOKEN_ID_MAX_LEN: usize = 128;

/// How the caller identified the account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccountLookup {
    Id(AccountId),
    /// Trimmed and lowercased.
    Email(String),
}

impl AccountLookup {
    /// Anything containing `@` is treated as an email, everything else as a
    /// UUID. Returns `None` when the input fails the format checks.
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let input = raw.trim();
        if input.contains('@') {
            normalize_email(input).map(Self::Email)
        } else {
            AccountId::try_parse(input).ok().map(Self::Id)
        }
    }

    #[must_use]
    pub fn is_email(&self) -> bool {
        matches!(self, Self::Email(_))
    }
}

/// Basic shape check: `local@domain.tld`, no whitespace, bounded lengths.
fn normalize_email(input: &str) -> Option<String> {
    if !(EMAIL_MIN_LEN..=EMAIL_MAX_LEN).contains(&input.len()) {
        return None;
    }
    if input.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return None;
    }

    let (local, domain) = input.split_once('@')?;
    if local.is_empty() || local.len() > EMAIL_LOCAL_MAX_LEN || domain.contains('@') {
        return None;
    }
    let (host, tld) = domain.rsplit_once('.')?;
    if host.is_empty() || tld.is_empty() || domain.starts_with('.') || domain.contains("..") {
        return None;
    }

    Some(input.to_ascii_lowercase())
}

/// Token ids are 1-128 chars of `[A-Za-z0-9._:-]`.
#[must_use]
pub fn is_valid_token_id(token_id: &str) -> bool {
    !token_id.is_empty()
        && token_id.len() <= TOKEN_ID_MAX_LEN
        && token_id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b':' | b'-'))
}
