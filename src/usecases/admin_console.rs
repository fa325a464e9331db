//! Admin Console - Capability-gated Platform Settings
//!
//! Wraps [`AdminSettings`] with persistence. Every action is applied to
//! a copy, saved to the `admin-store` record, and only then made live.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{info, instrument, warn};

use super::DeskError;
use crate::domain::admin::{AdminError, AdminSettings, Role};
use crate::ports::repository::{ADMIN_RECORD, StateRepository, load_record, save_record};

/// Persisted admin store.
pub struct AdminConsole<R: StateRepository + ?Sized> {
  /// Persistence port.
  repo: Arc<R>,
  /// Live settings and audit log.
  settings: AdminSettings,
}

impl<R: StateRepository + ?Sized> AdminConsole<R> {
  /// Restore the persisted admin store, or start from defaults.
  ///
  /// # Errors
  /// Repository read failure or a corrupt record.
  #[instrument(skip(repo))]
  pub async fn open(repo: Arc<R>) -> Result<Self, DeskError> {
    let restored: Option<AdminSettings> = load_record(repo.as_ref(), ADMIN_RECORD).await?;
    let settings = match restored {
      Some(mut settings) => {
        settings.normalize_blacklist();
        info!(
          role = %settings.role(),
          audit_entries = settings.audit_log().len(),
          "Admin store restored"
        );
        settings
      }
      None => AdminSettings::default(),
    };

    Ok(Self { repo, settings })
  }

  pub const fn settings(&self) -> &AdminSettings {
    &self.settings
  }

  /// Switch the session role.
  ///
  /// # Errors
  /// Persistence failure.
  pub async fn set_role(&mut self, role: Role) -> Result<(), DeskError> {
    self
      .apply(|s| {
        s.set_role(role);
        Ok(())
      })
      .await
  }

  /// # Errors
  /// Unauthorized, out-of-range fee, or persistence failure.
  pub async fn set_fee(&mut self, fee: Decimal) -> Result<(), DeskError> {
    self.apply(|s| s.set_fee(fee)).await
  }

  /// # Errors
  /// Unauthorized or persistence failure.
  pub async fn set_kyc_enabled(&mut self, enabled: bool) -> Result<(), DeskError> {
    self.apply(|s| s.set_kyc_enabled(enabled)).await
  }

  /// # Errors
  /// Unauthorized, zero supply, or persistence failure.
  pub async fn set_max_supply(&mut self, supply: u64) -> Result<(), DeskError> {
    self.apply(|s| s.set_max_supply(supply)).await
  }

  /// Returns `false` when the address was already listed.
  ///
  /// # Errors
  /// Unauthorized, malformed address, or persistence failure.
  pub async fn blacklist_add(&mut self, address: &str) -> Result<bool, DeskError> {
    self.apply(|s| s.blacklist_add(address)).await
  }

  /// Returns whether the address was listed.
  ///
  /// # Errors
  /// Unauthorized or persistence failure.
  pub async fn blacklist_remove(&mut self, address: &str) -> Result<bool, DeskError> {
    self.apply(|s| s.blacklist_remove(address)).await
  }

  /// # Errors
  /// Unauthorized or persistence failure.
  pub async fn clear_audit_log(&mut self) -> Result<(), DeskError> {
    self.apply(AdminSettings::clear_audit_log).await
  }

  async fn apply<T, F>(&mut self, action: F) -> Result<T, DeskError>
  where
    F: FnOnce(&mut AdminSettings) -> Result<T, AdminError>,
  {
    let mut next = self.settings.clone();
    let out = action(&mut next)
      .inspect_err(|e| warn!(role = %self.settings.role(), error = %e, "Admin action rejected"))?;

    save_record(self.repo.as_ref(), ADMIN_RECORD, &next).await?;
    if let Some(entry) = next.audit_log().latest() {
      if self.settings.audit_log().latest().map(|e| e.id) != Some(entry.id) {
        info!(action = %entry.action, actor = %entry.actor, details = %entry.details, "Audit entry recorded");
      }
    }
    self.settings = next;
    Ok(out)
  }
}
