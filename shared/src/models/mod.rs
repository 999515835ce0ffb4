//! Data models shared between the gateway and the bridge

pub mod cart;
pub mod catalog;
pub mod session;

pub use cart::{CartLine, CartState, CartSummary, SessionCookies, VariantRef};
pub use catalog::{CatalogEntry, CatalogSnapshot, CollectionRef, ScoredEntry};
pub use session::{BridgeSession, SessionPatch, WidgetVisibility};
