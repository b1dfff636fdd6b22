//! Pomelo cart & checkout transaction engine
//!
//! Embedded, library-style engine for a consumer grocery-ordering client.
//! It keeps a locally-held cart consistent with the remote authoritative
//! cart, enforces per-line quantity constraints, and drives order placement
//! across a direct cash path and a hosted-gateway online-payment path with
//! mandatory server-side verification, plus order-lifecycle normalization
//! for display.
//!
//! The host application supplies a bearer-token provider and a gateway
//! surface; everything else is wired by [`PomeloEngine`].

pub mod cache;
pub mod cart;
pub mod checkout;
pub mod config;
pub mod engine;
pub mod error;
pub mod events;
pub mod logging;
pub mod orders;
pub mod remote;
pub mod sync;
pub mod token;

pub use cache::EngineCache;
pub use cart::{CartStore, QtyDelta, policy, totals};
pub use checkout::CheckoutOrchestrator;
pub use checkout::bridge::{
    GatewayOptions, GatewayOutcome, GatewaySurface, OutcomeHandle, PaymentGatewayBridge,
    PaymentSession,
};
pub use config::EngineConfig;
pub use engine::PomeloEngine;
pub use error::{EngineError, EngineResult, RemoteError, RemoteResult};
pub use events::{CheckoutPhase, EngineEvent};
pub use orders::{OrderLifecycleTracker, ReorderReport, stage};
pub use token::{StaticTokenProvider, TokenProvider};
