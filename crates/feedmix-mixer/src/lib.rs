//! Feedmix Orchestration Core
//!
//! This crate implements the request orchestration engine behind the feed
//! endpoint:
//!
//! - [`ClientRegistry`] - the swappable mapping from provider identity to
//!   the client capability serving it
//! - [`Mixer`] - the fan-out/fan-in orchestrator: per-position rotation
//!   resolution, a concurrent primary fetch phase, a concurrent fallback
//!   phase for the failed positions, and the truncation rule
//! - [`HttpServer`] - the axum HTTP surface exposing `GET /` with `offset`
//!   and `count` query parameters
//!
//! # Design
//!
//! A request owns all of its in-flight state: worker tasks report into a
//! per-request channel and nothing is shared across requests except the mix
//! configuration and the client registry, both read-only from the mixer's
//! perspective. Provider failures are absorbed into per-position result
//! slots; the only user-visible effect of failure is a shorter response.

pub mod http_server;
pub mod mixer;
pub mod registry;

pub use http_server::HttpServer;
pub use mixer::{Mixer, MixerConfig};
pub use registry::{ClientRegistry, SharedRegistry};
