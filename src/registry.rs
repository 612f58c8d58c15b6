use crate::error::{ConsoleError, ConsoleResult};
use crate::types::{DEFAULT_MASTER_LABEL, FollowerAccount, MasterAccount, RegistrySnapshot};

/// Risk multiplier applied when the operator leaves the field blank.
pub const DEFAULT_RISK_MULTIPLIER: f64 = 1.0;

/// Tokens accepted as `true` for the `active` flag (compared lower-cased).
const TRUTHY_TOKENS: [&str; 4] = ["1", "true", "yes", "on"];

/// Raw follower fields as they arrive from a form or query string.
#[derive(Debug, Clone, Copy, Default)]
pub struct FollowerForm<'a> {
    pub name: &'a str,
    pub domain: &'a str,
    pub credential: &'a str,
    pub risk_multiplier: &'a str,
    pub active: &'a str,
}

/// Master record plus the follower set.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    master: MasterAccount,
    /// Insertion order; at most one entry per lower-cased name.
    followers: Vec<FollowerAccount>,
}

impl AccountRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the master record. On error the previous record is kept.
    pub fn save_master(
        &mut self,
        label: &str,
        domain: &str,
        credential: &str,
    ) -> ConsoleResult<MasterAccount> {
        let domain = required(domain, "Missing domain")?;
        let credential = required(credential, "Missing credential")?;
        let label = match label.trim() {
            "" => DEFAULT_MASTER_LABEL,
            label => label,
        };

        self.master = MasterAccount {
            label: label.to_string(),
            domain: domain.to_string(),
            credential: credential.to_string(),
        };
        Ok(self.master.clone())
    }

    /// Create a follower, or overwrite every field but the name of the one
    /// whose name matches case-insensitively.
    pub fn upsert_follower(&mut self, form: FollowerForm<'_>) -> ConsoleResult<FollowerAccount> {
        let name = required(form.name, "Missing follower name")?;
        let domain = required(form.domain, "Missing follower domain")?;
        let credential = required(form.credential, "Missing follower credential")?;
        let risk_multiplier = parse_risk_multiplier(form.risk_multiplier)?;
        let active = parse_active(form.active);

        match self.position(name) {
            Some(idx) => {
                let existing = &mut self.followers[idx];
                existing.domain = domain.to_string();
                existing.credential = credential.to_string();
                existing.risk_multiplier = risk_multiplier;
                existing.active = active;
                Ok(existing.clone())
            }
            None => {
                let follower = FollowerAccount {
                    name: name.to_string(),
                    domain: domain.to_string(),
                    credential: credential.to_string(),
                    risk_multiplier,
                    active,
                };
                self.followers.push(follower.clone());
                Ok(follower)
            }
        }
    }

    /// Remove the follower matching `name` case-insensitively.
    pub fn delete_follower(&mut self, name: &str) -> ConsoleResult<FollowerAccount> {
        let name = required(name, "Missing follower name")?;
        match self.position(name) {
            Some(idx) => Ok(self.followers.remove(idx)),
            None => Err(ConsoleError::not_found("Follower not found")),
        }
    }

    pub fn follower(&self, name: &str) -> Option<&FollowerAccount> {
        self.position(name.trim()).map(|idx| &self.followers[idx])
    }

    pub fn master(&self) -> &MasterAccount {
        &self.master
    }

    pub fn followers(&self) -> &[FollowerAccount] {
        &self.followers
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            master: self.master.clone(),
            followers: self.followers.clone(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let key = name.to_lowercase();
        self.followers
            .iter()
            .position(|f| f.name.to_lowercase() == key)
    }
}

fn required<'a>(value: &'a str, message: &str) -> ConsoleResult<&'a str> {
    match value.trim() {
        "" => Err(ConsoleError::validation(message)),
        trimmed => Ok(trimmed),
    }
}

/// Parse a risk multiplier from loosely-typed input. Blank means the
/// default; non-finite or non-numeric input is rejected. No range clamp.
pub fn parse_risk_multiplier(raw: &str) -> ConsoleResult<f64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(DEFAULT_RISK_MULTIPLIER);
    }
    match raw.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(ConsoleError::validation(format!(
            "Invalid risk multiplier: {raw}"
        ))),
    }
}

/// `true` only for one of the recognized truthy tokens, case-insensitive.
pub fn parse_active(raw: &str) -> bool {
    let token = raw.trim().to_lowercase();
    TRUTHY_TOKENS.contains(&token.as_str())
}
