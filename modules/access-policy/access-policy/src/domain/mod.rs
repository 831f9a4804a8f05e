pub mod clock;
pub mod error;
pub mod guard;
pub mod policy;
pub mod repo;
pub mod service;

#[cfg(test)]
mod service_test;
