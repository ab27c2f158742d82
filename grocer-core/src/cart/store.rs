//! The cart store: current snapshot, request bookkeeping and queries.

use std::fmt;

use crate::models::{CartSnapshot, CartState, SellerGroup};

use super::{apply_optimistic, reconcile, CartAction};

/// Identifies one `GET /cart` request issued through [`CartStore::begin_fetch`].
///
/// Tickets are ordered by issue time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FetchTicket(u64);

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The snapshot replaced the cart contents
    Applied,
    /// A newer fetch had already been applied; the result was discarded
    Stale,
    /// The fetch failed; contents are untouched and the error flag is set
    Failed,
}

/// Holds the cart and answers queries over it.
///
/// All mutation goes through [`dispatch`](Self::dispatch) (optimistic),
/// [`reconcile`](Self::reconcile) / [`complete_fetch`](Self::complete_fetch)
/// (server truth) and [`clear`](Self::clear).
#[derive(Debug, Default)]
pub struct CartStore {
    state: CartState,
    error: Option<String>,
    issued: u64,
    applied: u64,
    in_flight: usize,
}

impl CartStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded from a previously saved snapshot.
    pub fn from_snapshot(snapshot: CartSnapshot) -> Self {
        let mut store = Self::new();
        store.reconcile(snapshot);
        store
    }

    pub fn state(&self) -> &CartState {
        &self.state
    }

    pub fn snapshot(&self) -> CartSnapshot {
        self.state.to_snapshot()
    }

    pub fn seller(&self, seller_id: &str) -> Option<&SellerGroup> {
        self.state.seller(seller_id)
    }

    pub fn is_loading(&self) -> bool {
        self.state.loading
    }

    /// Message of the last failed request.
    ///
    /// The flag stays up until [`clear_error`](Self::clear_error) is called,
    /// normally when the next user action starts, so a rollback fetch after a
    /// failed mutation does not hide the failure.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn set_error(&mut self, message: impl Into<String>) {
        self.error = Some(message.into());
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    /// Applies an optimistic action.
    pub fn dispatch(&mut self, action: CartAction) {
        tracing::debug!(?action, "Applying optimistic cart update");
        let state = std::mem::take(&mut self.state);
        self.state = apply_optimistic(state, &action);
    }

    /// Replaces the contents with a server snapshot (last writer wins).
    pub fn reconcile(&mut self, snapshot: CartSnapshot) {
        let state = std::mem::take(&mut self.state);
        self.state = reconcile(state, snapshot);
    }

    /// Marks a cart fetch as in flight and returns its ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.issued += 1;
        self.begin_request();
        FetchTicket(self.issued)
    }

    /// Settles a fetch started with [`begin_fetch`](Self::begin_fetch).
    ///
    /// A result for a ticket older than the last applied one is discarded,
    /// so a slow response can never overwrite a newer snapshot.
    pub fn complete_fetch<E: fmt::Display>(
        &mut self,
        ticket: FetchTicket,
        result: Result<CartSnapshot, E>,
    ) -> FetchOutcome {
        self.end_request();

        if ticket.0 <= self.applied {
            tracing::debug!(
                ticket = ticket.0,
                applied = self.applied,
                "Discarding stale cart response"
            );
            return FetchOutcome::Stale;
        }

        match result {
            Ok(snapshot) => {
                self.applied = ticket.0;
                self.reconcile(snapshot);
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!("Cart fetch failed: {}", e);
                self.error = Some(e.to_string());
                FetchOutcome::Failed
            }
        }
    }

    /// Marks a mutation request as in flight.
    pub fn begin_mutation(&mut self) {
        self.begin_request();
    }

    /// Settles a mutation request. Returns true if it succeeded.
    pub fn end_mutation<E: fmt::Display>(&mut self, result: Result<(), E>) -> bool {
        self.end_request();
        match result {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Cart mutation failed: {}", e);
                self.error = Some(e.to_string());
                false
            }
        }
    }

    /// Quantity of a product across all sellers; 0 if it is not in the cart.
    ///
    /// Linear in the number of line items.
    pub fn quantity_of(&self, product_id: &str) -> u32 {
        self.state
            .lines()
            .filter(|(_, item)| item.product_id() == product_id)
            .map(|(_, item)| item.quantity)
            .fold(0, u32::saturating_add)
    }

    /// Number of distinct line items (not units) across all sellers.
    pub fn total_item_count(&self) -> usize {
        self.state.sellers.iter().map(|s| s.items.len()).sum()
    }

    /// Empties the cart, e.g. on logout or after an order is placed.
    pub fn clear(&mut self) {
        self.state.sellers.clear();
        self.state.total_price = rust_decimal::Decimal::ZERO;
        self.error = None;
    }

    fn begin_request(&mut self) {
        self.in_flight += 1;
        self.state.loading = true;
    }

    fn end_request(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
        self.state.loading = self.in_flight > 0;
    }
}
