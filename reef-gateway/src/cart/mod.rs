//! Cart reconciliation against the upstream commerce backend
//!
//! # Structure
//!
//! - [`upstream`] - the `CartUpstream` seam and the two historical wire
//!   shapes (REST `cart/add.js` vs. GraphQL cart mutations) as a tagged
//!   union with one normalization step
//! - [`http`] - reqwest implementation of `CartUpstream`
//! - [`gateway`] - the `CartGateway`: variant-ref normalization, cookie
//!   forwarding, re-fetch-after-mutation, path selection

pub mod gateway;
pub mod http;
pub mod upstream;

pub use gateway::{CartGateway, CartOutcome, UpstreamPath};
pub use http::HttpCartUpstream;
pub use upstream::{CartUpstream, UpstreamCart, UpstreamError, UpstreamReply};
