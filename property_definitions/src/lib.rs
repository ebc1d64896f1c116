#![deny(missing_docs)]
//! This crate defines the property definitions listing api following the
//! hexagonal architecture pattern.
//!
//! The domain composes a parameterized read query from the optional filters a
//! caller supplies, the outbound adapters execute it and the inbound adapters
//! expose it over http.

pub mod domain;
#[cfg(feature = "inbound")]
pub mod inbound;
#[cfg(feature = "postgres")]
pub mod outbound;
