//! This module defines all members of the domain.
//! Models, ports and services live here, free of any transport or storage concerns.

pub mod hidden;
pub mod models;
pub mod ports;
pub mod query;
pub mod service;
