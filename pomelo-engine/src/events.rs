//! Engine event bus
//!
//! Broadcast channel the host UI subscribes to. Senders never block; if no
//! subscriber is listening the event is dropped.

use tokio::sync::broadcast;

/// Checkout phase, mirrored for UI consumption
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutPhase {
    Idle,
    AddressMissing,
    Assembling,
    Submitted,
    AwaitingGateway,
    Verifying,
    /// Cash path confirmed
    Finalized,
    /// Online payment verified
    Completed,
    Failed,
}

/// Events published by the engine
#[derive(Debug, Clone)]
pub enum EngineEvent {
    /// Cart lines or pricing changed (optimistic or reconciled)
    CartChanged,
    /// The current checkout attempt moved to a new phase
    CheckoutChanged(CheckoutPhase),
    /// An order was created or its status changed
    OrderUpdated { order_id: String },
}

/// Shared sender handle with a fixed buffer
pub fn channel() -> broadcast::Sender<EngineEvent> {
    broadcast::channel(64).0
}
