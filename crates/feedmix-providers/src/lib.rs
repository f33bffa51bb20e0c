//! Provider Clients for Feedmix
//!
//! Implementations of the [`feedmix_common::ContentClient`] capability:
//!
//! - [`HttpContentProvider`] - fetches items from a real upstream provider
//!   over HTTP
//! - [`SampleContentProvider`] - fabricates deterministic items in process;
//!   used by the demo mode and by the feed test suites

pub mod http;
pub mod sample;

pub use http::HttpContentProvider;
pub use sample::SampleContentProvider;
