//! Cart state management.
//!
//! Two pure functions do the work: [`apply_optimistic`] applies a local
//! action before the server has seen it, and [`reconcile`] overwrites local
//! state with an authoritative server snapshot. [`CartStore`] wraps them
//! with request bookkeeping and read queries.

mod optimistic;
mod reconcile;
mod store;

pub use optimistic::{apply_optimistic, CartAction, SellerContext};
pub use reconcile::reconcile;
pub use store::{CartStore, FetchOutcome, FetchTicket};
