//! Admin settings and capability checks.
//!
//! Holds platform configuration (fee, KYC flag, supply ceiling,
//! blacklist) together with its audit trail. Every mutation is gated by
//! a [`Capability`] held by the current [`Role`] and, once applied,
//! appends an audit entry. Clearing the audit log is the one action
//! that does not audit itself.

use std::collections::BTreeSet;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::audit::AuditLog;
use super::units::is_valid_address;

/// Upper bound for the platform fee, in percent.
pub const MAX_PLATFORM_FEE: Decimal = dec!(10);

/// Default platform fee, in percent.
pub const DEFAULT_PLATFORM_FEE: Decimal = dec!(0.5);

/// Default token supply ceiling.
pub const DEFAULT_MAX_TOKEN_SUPPLY: u64 = 10_000_000;

/// Session role.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = AdminError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "admin" => Ok(Self::Admin),
            other => Err(AdminError::Validation(format!("unknown role '{other}'"))),
        }
    }
}

/// Permission required by an admin action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    ManageSettings,
    ManageBlacklist,
    ClearAudit,
}

impl Role {
    /// Whether this role holds `capability`.
    pub const fn grants(self, capability: Capability) -> bool {
        match self {
            Self::Admin => true,
            Self::User => match capability {
                Capability::ManageSettings
                | Capability::ManageBlacklist
                | Capability::ClearAudit => false,
            },
        }
    }

    /// Label written to the audit trail for actions taken in this role.
    pub const fn actor_label(self) -> &'static str {
        match self {
            Self::Admin => "Admin",
            Self::User => "System",
        }
    }
}

/// Admin action failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AdminError {
    #[error("Role '{role}' is not allowed to {capability:?}")]
    Unauthorized { role: Role, capability: Capability },

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Platform configuration plus its audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminSettings {
    role: Role,
    /// Platform fee in percent (0..=10).
    platform_fee: Decimal,
    kyc_enabled: bool,
    max_token_supply: u64,
    /// Lower-cased addresses, unique, in insertion order.
    blacklist: Vec<String>,
    audit_log: AuditLog,
}

impl Default for AdminSettings {
    fn default() -> Self {
        Self {
            role: Role::User,
            platform_fee: DEFAULT_PLATFORM_FEE,
            kyc_enabled: false,
            max_token_supply: DEFAULT_MAX_TOKEN_SUPPLY,
            blacklist: Vec::new(),
            audit_log: AuditLog::default(),
        }
    }
}

impl AdminSettings {
    pub const fn role(&self) -> Role {
        self.role
    }

    pub const fn platform_fee(&self) -> Decimal {
        self.platform_fee
    }

    pub const fn kyc_enabled(&self) -> bool {
        self.kyc_enabled
    }

    pub const fn max_token_supply(&self) -> u64 {
        self.max_token_supply
    }

    pub fn blacklist(&self) -> &[String] {
        &self.blacklist
    }

    pub const fn audit_log(&self) -> &AuditLog {
        &self.audit_log
    }

    /// Whether `address` (any case) is blacklisted.
    pub fn is_blacklisted(&self, address: &str) -> bool {
        let normalized = address.trim().to_lowercase();
        self.blacklist.iter().any(|a| *a == normalized)
    }

    /// Switches the session role. Always permitted; audited as `System`.
    pub fn set_role(&mut self, role: Role) {
        self.role = role;
        self.audit_log
            .record("Role Changed", format!("Role switched to {role}"), "System");
    }

    /// Overwrites the platform fee.
    ///
    /// # Errors
    /// Unauthorized without [`Capability::ManageSettings`]; validation error
    /// when the fee is outside 0..=10.
    pub fn set_fee(&mut self, fee: Decimal) -> Result<(), AdminError> {
        self.authorize(Capability::ManageSettings)?;
        if fee < Decimal::ZERO || fee > MAX_PLATFORM_FEE {
            return Err(AdminError::Validation(format!(
                "platform fee must be between 0 and {MAX_PLATFORM_FEE}%, got {fee}%"
            )));
        }

        let old = self.platform_fee;
        self.platform_fee = fee;
        self.audit(
            "Fee Updated",
            format!(
                "Platform fee changed from {}% to {}%",
                old.normalize(),
                fee.normalize()
            ),
        );
        Ok(())
    }

    /// Overwrites the KYC requirement flag.
    ///
    /// # Errors
    /// Unauthorized without [`Capability::ManageSettings`].
    pub fn set_kyc_enabled(&mut self, enabled: bool) -> Result<(), AdminError> {
        self.authorize(Capability::ManageSettings)?;
        self.kyc_enabled = enabled;
        let details = if enabled { "KYC enabled" } else { "KYC disabled" };
        self.audit("KYC Setting Changed", details.to_string());
        Ok(())
    }

    /// Overwrites the maximum token supply ceiling.
    ///
    /// # Errors
    /// Unauthorized without [`Capability::ManageSettings`]; validation error
    /// for a zero ceiling.
    pub fn set_max_supply(&mut self, supply: u64) -> Result<(), AdminError> {
        self.authorize(Capability::ManageSettings)?;
        if supply == 0 {
            return Err(AdminError::Validation(
                "max token supply must be positive".to_string(),
            ));
        }

        let old = self.max_token_supply;
        self.max_token_supply = supply;
        self.audit(
            "Supply Limit Updated",
            format!(
                "Max token supply changed from {} to {}",
                group_thousands(old),
                group_thousands(supply)
            ),
        );
        Ok(())
    }

    /// Adds `address` to the blacklist. Returns `false` (and records
    /// nothing) when it was already present.
    ///
    /// # Errors
    /// Unauthorized without [`Capability::ManageBlacklist`]; validation error
    /// for a malformed address.
    pub fn blacklist_add(&mut self, address: &str) -> Result<bool, AdminError> {
        self.authorize(Capability::ManageBlacklist)?;
        let address = address.trim();
        if !is_valid_address(address) {
            return Err(AdminError::Validation(format!(
                "'{address}' is not a valid address"
            )));
        }

        let normalized = address.to_lowercase();
        if self.blacklist.contains(&normalized) {
            return Ok(false);
        }
        self.blacklist.push(normalized);
        self.audit(
            "Address Blacklisted",
            format!("Address {address} added to blacklist"),
        );
        Ok(true)
    }

    /// Removes `address` (any case) from the blacklist. Returns whether it
    /// was present. The removal is audited either way.
    ///
    /// # Errors
    /// Unauthorized without [`Capability::ManageBlacklist`].
    pub fn blacklist_remove(&mut self, address: &str) -> Result<bool, AdminError> {
        self.authorize(Capability::ManageBlacklist)?;
        let address = address.trim();
        let normalized = address.to_lowercase();
        let before = self.blacklist.len();
        self.blacklist.retain(|a| *a != normalized);
        self.audit(
            "Address Removed from Blacklist",
            format!("Address {address} removed from blacklist"),
        );
        Ok(self.blacklist.len() != before)
    }

    /// Clears the audit log without recording the clear.
    ///
    /// # Errors
    /// Unauthorized without [`Capability::ClearAudit`].
    pub fn clear_audit_log(&mut self) -> Result<(), AdminError> {
        self.authorize(Capability::ClearAudit)?;
        self.audit_log.clear();
        Ok(())
    }

    fn authorize(&self, capability: Capability) -> Result<(), AdminError> {
        if self.role.grants(capability) {
            Ok(())
        } else {
            Err(AdminError::Unauthorized {
                role: self.role,
                capability,
            })
        }
    }

    fn audit(&mut self, action: &str, details: String) {
        let actor = self.role.actor_label();
        self.audit_log.record(action, details, actor);
    }

    /// Repairs a deserialized blacklist: lower-cases and drops duplicates.
    pub(crate) fn normalize_blacklist(&mut self) {
        let mut seen = BTreeSet::new();
        self.blacklist = std::mem::take(&mut self.blacklist)
            .into_iter()
            .map(|a| a.trim().to_lowercase())
            .filter(|a| seen.insert(a.clone()))
            .collect();
    }
}

/// Formats `n` with comma thousands separators (`10000000` -> `10,000,000`).
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADDR: &str = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";

    fn admin() -> AdminSettings {
        let mut s = AdminSettings::default();
        s.set_role(Role::Admin);
        s
    }

    #[test]
    fn test_defaults() {
        let s = AdminSettings::default();
        assert_eq!(s.role(), Role::User);
        assert_eq!(s.platform_fee(), dec!(0.5));
        assert!(!s.kyc_enabled());
        assert_eq!(s.max_token_supply(), 10_000_000);
        assert!(s.blacklist().is_empty());
        assert!(s.audit_log().is_empty());
    }

    #[test]
    fn test_user_cannot_mutate_settings() {
        let mut s = AdminSettings::default();
        let before = s.clone();

        let err = s.set_fee(dec!(1)).unwrap_err();
        assert!(matches!(err, AdminError::Unauthorized { role: Role::User, .. }));
        assert!(s.blacklist_add(ADDR).is_err());
        assert!(s.clear_audit_log().is_err());
        assert_eq!(s, before);
    }

    #[test]
    fn test_set_role_audited_as_system() {
        let s = admin();
        let entry = s.audit_log().latest().unwrap();
        assert_eq!(entry.action, "Role Changed");
        assert_eq!(entry.details, "Role switched to admin");
        assert_eq!(entry.actor, "System");
    }

    #[test]
    fn test_fee_update_records_old_and_new() {
        let mut s = admin();
        s.set_fee(dec!(1.25)).unwrap();
        let entry = s.audit_log().latest().unwrap();
        assert_eq!(entry.action, "Fee Updated");
        assert_eq!(entry.details, "Platform fee changed from 0.5% to 1.25%");
        assert_eq!(entry.actor, "Admin");
        assert_eq!(s.platform_fee(), dec!(1.25));
    }

    #[test]
    fn test_fee_out_of_range_rejected() {
        let mut s = admin();
        assert!(matches!(s.set_fee(dec!(10.5)), Err(AdminError::Validation(_))));
        assert!(matches!(s.set_fee(dec!(-0.1)), Err(AdminError::Validation(_))));
        assert!(s.set_fee(dec!(10)).is_ok());
    }

    #[test]
    fn test_kyc_and_supply_details() {
        let mut s = admin();
        s.set_kyc_enabled(true).unwrap();
        assert_eq!(s.audit_log().latest().unwrap().details, "KYC enabled");

        s.set_max_supply(25_000_000).unwrap();
        assert_eq!(
            s.audit_log().latest().unwrap().details,
            "Max token supply changed from 10,000,000 to 25,000,000"
        );
    }

    #[test]
    fn test_blacklist_add_idempotent_lowercased() {
        let mut s = admin();
        assert!(s.blacklist_add(ADDR).unwrap());
        let audited = s.audit_log().len();
        assert!(!s.blacklist_add(&ADDR.to_uppercase().replace("0X", "0x")).unwrap());

        assert_eq!(s.blacklist(), &[ADDR.to_lowercase()]);
        assert_eq!(s.audit_log().len(), audited);
        assert!(s.is_blacklisted(ADDR));
    }

    #[test]
    fn test_blacklist_remove_any_case() {
        let mut s = admin();
        s.blacklist_add(ADDR).unwrap();
        assert!(s.blacklist_remove(&ADDR.to_lowercase()).unwrap());
        assert!(s.blacklist().is_empty());
        assert_eq!(
            s.audit_log().latest().unwrap().action,
            "Address Removed from Blacklist"
        );
    }

    #[test]
    fn test_blacklist_rejects_malformed() {
        let mut s = admin();
        assert!(matches!(
            s.blacklist_add("0x1234"),
            Err(AdminError::Validation(_))
        ));
    }

    #[test]
    fn test_clear_audit_not_self_recorded() {
        let mut s = admin();
        s.set_kyc_enabled(true).unwrap();
        s.clear_audit_log().unwrap();
        assert!(s.audit_log().is_empty());
    }

    #[test]
    fn test_normalize_blacklist() {
        let mut s = admin();
        s.blacklist = vec![ADDR.to_string(), ADDR.to_lowercase()];
        s.normalize_blacklist();
        assert_eq!(s.blacklist(), &[ADDR.to_lowercase()]);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(10_000_000), "10,000,000");
    }

    #[test]
    fn test_role_parse() {
        assert_eq!("Admin".parse::<Role>().unwrap(), Role::Admin);
        assert!("root".parse::<Role>().is_err());
    }
}
