//! Access Policy SDK
//!
//! This crate provides the public API for the `access_policy` module:
//! - `AccessPolicyClientV1` trait
//! - Model types for trials, subscriptions and access decisions
//! - Error type (`AccessPolicyError`)
//!
//! ## Usage
//!
//! ```ignore
//! use access_policy_sdk::{AccessPolicyClientV1, AccessVerdict};
//!
//! let evaluation = client.evaluate_access(&identity).await?;
//! if evaluation.decision.verdict == AccessVerdict::Block {
//!     // send the user to the subscription page
//! }
//! ```

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

pub mod client;
pub mod errors;
pub mod models;

pub use client::AccessPolicyClientV1;
pub use errors::AccessPolicyError;
pub use models::{
    AccessDecision, AccessEvaluation, AccessVerdict, Fallback, Identity, NewSubscription,
    SubscriptionRecord, SubscriptionStatus, TrialRecord,
};
