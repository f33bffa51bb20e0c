//! Feedmix Common Types
//!
//! This crate provides the shared protocol types for the feedmix content
//! mixing service: the content item schema, provider identities, the mix
//! configuration (the repeating rotation of provider slots), the provider
//! client capability, and the shared error type.
//!
//! # Overview
//!
//! Feedmix assembles an ordered feed of content items by querying multiple
//! upstream providers. Which provider serves which feed position is decided
//! by a fixed rotation ([`ContentMix`]); each rotation slot names a primary
//! provider and an optional fallback ([`MixEntry`]). Providers are reached
//! through the [`ContentClient`] capability, one instance per provider
//! identity.
//!
//! # Components
//!
//! - [`types`] - Content item, provider identity, and mix configuration
//! - [`client`] - The provider client capability trait
//! - [`error`] - Shared error type and `Result` alias

pub mod client;
pub mod error;
pub mod types;

pub use client::ContentClient;
pub use error::{FeedError, Result};
pub use types::{ContentItem, ContentMix, MixEntry, ProviderId};
