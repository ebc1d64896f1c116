//! This module defines the inbound adapters which drive the property definitions domain

pub mod axum_router;
