//! Cart store
//!
//! Single authoritative in-process view of what the user currently intends
//! to buy, reconciled against the remote cart. Two logical layers:
//!
//! - an authoritative snapshot, replaced wholesale by [`CartStore::reconcile`]
//! - a short-lived per-line optimistic overlay for in-flight mutations;
//!   an overlay entry is dropped the moment its remote call resolves
//!   (success keeps the value, failure reverts it)
//!
//! A generation counter orders the two layers: `reconcile` bumps it, and a
//! revert is a no-op when a newer snapshot has landed in the meantime —
//! last-authoritative-snapshot semantics, not last-write-wins.
//!
//! Nothing outside this module writes cart fields; all callers go through
//! these methods.

pub mod policy;
pub mod totals;

use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::remote::CartRemote;
use crate::token::TokenProvider;
use parking_lot::{Mutex, RwLock};
use shared::models::{CartLine, CartPricing, CartSnapshot, DeliveryAddress, Product, Variant};
use shared::request::OrderItemInput;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;
use totals::CartTotals;

/// A single-step quantity change. The remote contract is delta-only, so
/// "jump to quantity N" gestures must be issued one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QtyDelta {
    Increment,
    Decrement,
}

struct CartState {
    lines: Vec<CartLine>,
    pricing: CartPricing,
    /// Bumped on every authoritative replace; reverts from older
    /// in-flight mutations are discarded
    generation: u64,
}

/// Overlay entry describing one in-flight optimistic mutation
struct Overlay {
    key: String,
    /// Line value before the mutation; `None` when the line did not exist
    prev: Option<CartLine>,
    generation: u64,
}

pub struct CartStore {
    state: RwLock<CartState>,
    /// Per-line async locks: no two remote mutations for one line are in
    /// flight at once; different lines proceed independently
    line_locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
    remote: Arc<dyn CartRemote>,
    tokens: Arc<dyn TokenProvider>,
    selected_address: Arc<RwLock<Option<DeliveryAddress>>>,
    events: broadcast::Sender<EngineEvent>,
}

impl CartStore {
    pub fn new(
        remote: Arc<dyn CartRemote>,
        tokens: Arc<dyn TokenProvider>,
        selected_address: Arc<RwLock<Option<DeliveryAddress>>>,
        events: broadcast::Sender<EngineEvent>,
    ) -> Self {
        Self {
            state: RwLock::new(CartState {
                lines: Vec::new(),
                pricing: CartPricing::default(),
                generation: 0,
            }),
            line_locks: Mutex::new(HashMap::new()),
            remote,
            tokens,
            selected_address,
            events,
        }
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Lines in display order: free-product lines first, then paid lines
    /// in insertion order
    pub fn lines(&self) -> Vec<CartLine> {
        let state = self.state.read();
        let mut out: Vec<CartLine> = Vec::with_capacity(state.lines.len());
        out.extend(state.lines.iter().filter(|l| l.is_free_product).cloned());
        out.extend(state.lines.iter().filter(|l| !l.is_free_product).cloned());
        out
    }

    pub fn line(&self, key: &str) -> Option<CartLine> {
        self.state.read().lines.iter().find(|l| l.key() == key).cloned()
    }

    /// Number of purchasable (non-free) lines
    pub fn purchasable_count(&self) -> usize {
        self.state
            .read()
            .lines
            .iter()
            .filter(|l| !l.is_free_product)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.purchasable_count() == 0
    }

    pub fn totals(&self) -> CartTotals {
        let state = self.state.read();
        totals::compute(&state.lines, &state.pricing)
    }

    /// `{variant, quantity}` pairs for order submission (non-free lines)
    pub fn order_items(&self) -> Vec<OrderItemInput> {
        self.state
            .read()
            .lines
            .iter()
            .filter(|l| !l.is_free_product)
            .map(|l| OrderItemInput {
                variant_id: l.key().to_string(),
                quantity: l.quantity,
            })
            .collect()
    }

    /// Current state as a snapshot, for the persisted cache
    pub fn to_snapshot(&self) -> CartSnapshot {
        let state = self.state.read();
        CartSnapshot {
            item_count: state.lines.iter().filter(|l| !l.is_free_product).count() as u32,
            lines: state.lines.clone(),
            pricing: state.pricing.clone(),
        }
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Add a variant to the cart.
    ///
    /// Zero stock fails with `OutOfStock` and performs no mutation. An
    /// existing line for the same variant is incremented through policy;
    /// otherwise a new line is inserted at `min_order_qty` (a requested
    /// quantity below the minimum is raised to it). The local mutation is
    /// applied optimistically; a remote failure reverts this line only.
    pub async fn add_line(
        &self,
        product: &Product,
        variant: &Variant,
        requested_qty: u32,
    ) -> EngineResult<()> {
        if !variant.in_stock() {
            return Err(EngineError::OutOfStock {
                name: variant.name.clone(),
            });
        }

        let key = variant.id.clone();
        let lock = self.line_lock(&key);
        let _guard = lock.lock().await;

        if self.line(&key).is_some() {
            return self.increment_locked(&key).await;
        }

        let quantity = requested_qty.max(variant.min_order_qty);
        let effective_max = variant
            .max_order_qty_or_default()
            .min(variant.available_stock_or_default());
        if quantity > effective_max {
            return Err(EngineError::OutOfStock {
                name: variant.name.clone(),
            });
        }

        let line = CartLine {
            line_id: None,
            product_id: product.id.clone(),
            variant_id: Some(variant.id.clone()),
            name: variant.name.clone(),
            unit_price: variant.unit_price,
            quantity,
            min_order_qty: variant.min_order_qty,
            max_order_qty: variant.max_order_qty_or_default(),
            available_stock: variant.available_stock_or_default(),
            category: Some(product.category.clone()),
            is_free_product: false,
        };

        let overlay = self.apply_insert(line);
        self.notify();

        if self.tokens.bearer_token().is_none() {
            // Local-only mode: the mutation stands, nothing goes remote
            return Ok(());
        }

        let address_id = self
            .selected_address
            .read()
            .as_ref()
            .map(|a| a.id.clone());

        match self
            .remote
            .add(&key, quantity, address_id.as_deref())
            .await
        {
            Ok(line_id) => {
                self.attach_line_id(&overlay, line_id);
                Ok(())
            }
            Err(e) => {
                tracing::warn!(variant = %key, error = %e, "Remote cart add failed, reverting");
                self.revert(overlay);
                self.notify();
                Err(EngineError::CartSyncFailed(e))
            }
        }
    }

    /// Apply a single-step quantity change to an existing line.
    ///
    /// A decrement that would fall below `min_order_qty` removes the line
    /// instead of clamping. On remote failure the line reverts to its
    /// pre-mutation value; no global rollback, no retry.
    pub async fn change_quantity(&self, key: &str, delta: QtyDelta) -> EngineResult<()> {
        let result = {
            let lock = self.line_lock(key);
            let _guard = lock.lock().await;

            match delta {
                QtyDelta::Increment => self.increment_locked(key).await,
                QtyDelta::Decrement => self.decrement_locked(key).await,
            }
        };
        self.prune_line_locks();
        result
    }

    /// Explicitly remove a line
    pub async fn remove_line(&self, key: &str) -> EngineResult<()> {
        let result = {
            let lock = self.line_lock(key);
            let _guard = lock.lock().await;
            self.remove_locked(key).await
        };
        self.prune_line_locks();
        result
    }

    /// Replace local state with the authoritative server snapshot.
    ///
    /// Idempotent. A snapshot with neither positive subtotal nor positive
    /// item count is treated as an empty cart. This is the only entry path
    /// for free-product lines and server-computed pricing; free lines are
    /// de-duplicated per variant so they never double-count.
    pub fn reconcile(&self, snapshot: Option<CartSnapshot>) {
        {
            let mut state = self.state.write();
            state.generation += 1;

            match snapshot {
                Some(snap) if !snap.is_effectively_empty() => {
                    let mut seen_free: Vec<String> = Vec::new();
                    let lines = snap
                        .lines
                        .into_iter()
                        .filter(|l| {
                            if !l.is_free_product {
                                return true;
                            }
                            let key = l.key().to_string();
                            if seen_free.contains(&key) {
                                false
                            } else {
                                seen_free.push(key);
                                true
                            }
                        })
                        .collect();
                    state.lines = lines;
                    state.pricing = snap.pricing;
                }
                _ => {
                    state.lines.clear();
                    state.pricing = CartPricing::default();
                }
            }
        }
        self.prune_line_locks();
        self.notify();
    }

    /// Drop all lines. Called only on confirmed checkout completion.
    pub fn clear(&self) {
        {
            let mut state = self.state.write();
            state.generation += 1;
            state.lines.clear();
            state.pricing = CartPricing::default();
        }
        self.prune_line_locks();
        self.notify();
    }

    // ========================================================================
    // Locked mutation paths (caller holds the per-line lock)
    // ========================================================================

    async fn increment_locked(&self, key: &str) -> EngineResult<()> {
        let line = self.line(key).ok_or_else(|| EngineError::LineNotFound(key.into()))?;

        let decision = policy::can_increment(&line);
        if !decision.allowed {
            return Err(deny_to_error(decision.reason, &line));
        }

        let overlay = self.apply_quantity(key, line.quantity + 1)?;
        self.notify();

        let Some(line_id) = line.line_id else {
            // Never synced (anonymous add); stays local until reconcile
            return Ok(());
        };
        if self.tokens.bearer_token().is_none() {
            return Ok(());
        }

        match self.remote.increment(&line_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(line = %key, error = %e, "Remote increment failed, reverting");
                self.revert(overlay);
                self.notify();
                Err(EngineError::CartSyncFailed(e))
            }
        }
    }

    async fn decrement_locked(&self, key: &str) -> EngineResult<()> {
        let line = self.line(key).ok_or_else(|| EngineError::LineNotFound(key.into()))?;

        let decision = policy::can_decrement(&line);
        if !decision.allowed {
            return Err(EngineError::FreeProductImmutable);
        }
        if decision.requires_removal {
            return self.remove_locked(key).await;
        }

        let overlay = self.apply_quantity(key, line.quantity - 1)?;
        self.notify();

        let Some(line_id) = line.line_id else {
            return Ok(());
        };
        if self.tokens.bearer_token().is_none() {
            return Ok(());
        }

        match self.remote.decrement(&line_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(line = %key, error = %e, "Remote decrement failed, reverting");
                self.revert(overlay);
                self.notify();
                Err(EngineError::CartSyncFailed(e))
            }
        }
    }

    async fn remove_locked(&self, key: &str) -> EngineResult<()> {
        let line = self.line(key).ok_or_else(|| EngineError::LineNotFound(key.into()))?;
        if line.is_free_product {
            return Err(EngineError::FreeProductImmutable);
        }

        let overlay = self.apply_remove(key)?;
        self.notify();

        let Some(line_id) = line.line_id else {
            return Ok(());
        };
        if self.tokens.bearer_token().is_none() {
            return Ok(());
        }

        match self.remote.remove(&line_id).await {
            Ok(()) => Ok(()),
            Err(e) => {
                tracing::warn!(line = %key, error = %e, "Remote remove failed, restoring line");
                self.revert(overlay);
                self.notify();
                Err(EngineError::CartSyncFailed(e))
            }
        }
    }

    // ========================================================================
    // Overlay plumbing
    // ========================================================================

    fn line_lock(&self, key: &str) -> Arc<tokio::sync::Mutex<()>> {
        let mut locks = self.line_locks.lock();
        locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())))
            .clone()
    }

    /// Drop lock entries whose line is gone. An entry still held by an
    /// in-flight mutation keeps its Arc alive and is skipped; it is
    /// reclaimed on the next prune.
    fn prune_line_locks(&self) {
        let state = self.state.read();
        let mut locks = self.line_locks.lock();
        locks.retain(|key, lock| {
            Arc::strong_count(lock) > 1 || state.lines.iter().any(|l| l.key() == key)
        });
    }

    fn apply_insert(&self, line: CartLine) -> Overlay {
        let mut state = self.state.write();
        let key = line.key().to_string();
        state.lines.push(line);
        Overlay {
            key,
            prev: None,
            generation: state.generation,
        }
    }

    fn apply_quantity(&self, key: &str, quantity: u32) -> EngineResult<Overlay> {
        let mut state = self.state.write();
        let generation = state.generation;
        let line = state
            .lines
            .iter_mut()
            .find(|l| l.key() == key)
            .ok_or_else(|| EngineError::LineNotFound(key.into()))?;
        let prev = Some(line.clone());
        line.quantity = quantity;
        Ok(Overlay {
            key: key.to_string(),
            prev,
            generation,
        })
    }

    fn apply_remove(&self, key: &str) -> EngineResult<Overlay> {
        let mut state = self.state.write();
        let generation = state.generation;
        let pos = state
            .lines
            .iter()
            .position(|l| l.key() == key)
            .ok_or_else(|| EngineError::LineNotFound(key.into()))?;
        let prev = Some(state.lines.remove(pos));
        Ok(Overlay {
            key: key.to_string(),
            prev,
            generation,
        })
    }

    /// Record the server line id after a successful add, unless a newer
    /// snapshot already replaced the line set
    fn attach_line_id(&self, overlay: &Overlay, line_id: String) {
        let mut state = self.state.write();
        if state.generation != overlay.generation {
            return;
        }
        if let Some(line) = state.lines.iter_mut().find(|l| l.key() == overlay.key) {
            line.line_id = Some(line_id);
        }
    }

    /// Undo one optimistic mutation. A no-op when a reconcile landed after
    /// the mutation was applied: the snapshot is authoritative and already
    /// carries the server's answer.
    fn revert(&self, overlay: Overlay) {
        let mut state = self.state.write();
        if state.generation != overlay.generation {
            tracing::debug!(line = %overlay.key, "Revert superseded by newer snapshot");
            return;
        }
        let pos = state.lines.iter().position(|l| l.key() == overlay.key);
        match (pos, overlay.prev) {
            (Some(pos), Some(prev)) => state.lines[pos] = prev,
            (Some(pos), None) => {
                state.lines.remove(pos);
            }
            (None, Some(prev)) => state.lines.push(prev),
            (None, None) => {}
        }
    }

    fn notify(&self) {
        let _ = self.events.send(EngineEvent::CartChanged);
    }
}

fn deny_to_error(reason: Option<policy::DenyReason>, line: &CartLine) -> EngineError {
    match reason {
        Some(policy::DenyReason::OrderLimit) => EngineError::OrderLimitExceeded {
            name: line.name.clone(),
        },
        Some(policy::DenyReason::FreeProduct) => EngineError::FreeProductImmutable,
        _ => EngineError::OutOfStock {
            name: line.name.clone(),
        },
    }
}
