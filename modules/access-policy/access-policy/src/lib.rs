//! Access Policy Module
//!
//! Decides, on every navigation inside the CRM shell, whether a user may
//! proceed, should see a trial countdown, or must be sent to the
//! subscription page. Trials and subscriptions are stored per tenant.
//!
//! ## Public API
//!
//! The public API is defined in the `access-policy-sdk` crate and re-exported here:
//! - `AccessPolicyClientV1` - trait for inter-module communication
//! - `AccessEvaluation`, `AccessDecision`, `TrialRecord`, `SubscriptionRecord` - data models
//! - `AccessPolicyError` - error types
//!
//! Other modules should use `AccessPolicyModule::client()` to obtain the client.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
// === PUBLIC API (from SDK) ===
pub use access_policy_sdk::{
    AccessDecision, AccessEvaluation, AccessPolicyClientV1, AccessPolicyError, AccessVerdict,
    Identity, NewSubscription, SubscriptionRecord, SubscriptionStatus, TrialRecord,
};

// === MODULE DEFINITION ===
pub mod module;
pub use module::AccessPolicyModule;

// === LOCAL CLIENT ===
pub mod local_client;

// === INTERNAL MODULES ===
// WARNING: These modules are internal implementation details!
// They are exposed only for comprehensive testing and should NOT be used by external consumers.
#[doc(hidden)]
pub mod api;
#[doc(hidden)]
pub mod config;
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

pub use config::AccessPolicyConfig;
