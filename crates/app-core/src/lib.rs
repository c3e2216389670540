//! Local domain services for Ember Market
//!
//! Catalog filtering and sorting, the mock login flow, and the in-app
//! notification center. Everything here is a pure consumer of the state
//! store's public types; nothing talks to a network.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod auth;
pub mod catalog;
pub mod notifications;

pub use auth::{AuthError, CredentialError, MockAuthenticator, MockSession};
pub use catalog::{CatalogFilter, PriceRange, SortBy};
pub use notifications::{Notification, NotificationCenter, NotificationKind};
