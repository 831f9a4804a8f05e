//! Configuration for the access-policy module.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::guard::GuardConfig;
use crate::domain::policy::PolicyParams;

/// Module configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AccessPolicyConfig {
    /// Length of the free trial granted at signup.
    pub trial_days: u32,

    /// A trial with this many days left (or fewer) gets a WARN verdict.
    pub warn_within_days: u32,

    /// Inactivity after which the guard sends the user back to login.
    #[serde(with = "modkit_utils::humantime_serde")]
    pub idle_timeout: Duration,

    /// Redirect target for unauthenticated or idle sessions.
    pub login_path: String,

    /// Redirect target for blocked users.
    pub subscription_path: String,
}

impl Default for AccessPolicyConfig {
    fn default() -> Self {
        Self {
            trial_days: 14,
            warn_within_days: 3,
            idle_timeout: Duration::from_mins(5),
            login_path: "/login".to_owned(),
            subscription_path: "/subscription".to_owned(),
        }
    }
}

impl AccessPolicyConfig {
    #[must_use]
    pub fn policy_params(&self) -> PolicyParams {
        PolicyParams {
            trial_length: time::Duration::days(i64::from(self.trial_days)),
            warn_within_days: self.warn_within_days,
        }
    }

    #[must_use]
    pub fn guard_config(&self) -> GuardConfig {
        GuardConfig {
            idle_timeout: self.idle_timeout,
            login_path: self.login_path.clone(),
            subscription_path: self.subscription_path.clone(),
        }
    }

    /// Reject values that would make the policy meaningless.
    ///
    /// # Errors
    /// Returns a description of the first invalid field.
    pub fn validate(&self) -> Result<(), String> {
        if self.trial_days == 0 {
            return Err("trial_days must be greater than zero".to_owned());
        }
        if self.warn_within_days >= self.trial_days {
            return Err(format!(
                "warn_within_days ({}) must be smaller than trial_days ({})",
                self.warn_within_days, self.trial_days
            ));
        }
        if !self.login_path.starts_with('/') || !self.subscription_path.starts_with('/') {
            return Err("login_path and subscription_path must be absolute paths".to_owned());
        }
        Ok(())
    }
}
