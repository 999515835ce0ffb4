//! Catalog snapshot cache and relevance search
//!
//! # Structure
//!
//! - [`source`] - the `CatalogSource` seam and the storefront GraphQL
//!   implementation
//! - [`cache`] - TTL-bounded snapshot holder with single-flight refresh
//!   and stale-while-revalidate
//! - [`search`] - pure relevance scoring over a snapshot

pub mod cache;
pub mod search;
pub mod source;

pub use cache::CatalogCache;
pub use search::{search, search_with_fill};
pub use source::{CatalogSource, StorefrontCatalogSource};
