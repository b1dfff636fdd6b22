//! Engine umbrella
//!
//! Wires the cart store, remote gateways, checkout orchestrator, order
//! tracker, persisted cache, and sync worker into one handle the host
//! application owns. The cart is the single piece of mutable shared state
//! touched by multiple flows, and only the store mutates it; everything
//! else goes through the methods here.

use crate::cache::EngineCache;
use crate::cart::CartStore;
use crate::checkout::CheckoutOrchestrator;
use crate::checkout::bridge::{GatewaySurface, PaymentGatewayBridge};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::events::EngineEvent;
use crate::orders::{OrderLifecycleTracker, ReorderReport};
use crate::remote::{
    CartRemote, HttpCartRemote, HttpOrderRemote, HttpServiceabilityRemote, OrderRemote,
    ServiceabilityRemote, StorefrontHttpClient, check_with_timeout,
};
use crate::sync::SyncWorker;
use crate::token::TokenProvider;
use parking_lot::RwLock;
use shared::models::{DeliveryAddress, Product, Variant};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;

pub struct PomeloEngine {
    config: EngineConfig,
    cart: Arc<CartStore>,
    cart_remote: Arc<dyn CartRemote>,
    serviceability: Arc<dyn ServiceabilityRemote>,
    checkout: Arc<CheckoutOrchestrator>,
    orders: Arc<OrderLifecycleTracker>,
    selected_address: Arc<RwLock<Option<DeliveryAddress>>>,
    events: broadcast::Sender<EngineEvent>,
    shutdown: CancellationToken,
}

impl PomeloEngine {
    /// Build an engine over the HTTP gateways, with the host-supplied
    /// token provider and gateway surface injected at the seams
    pub fn new(
        config: EngineConfig,
        tokens: Arc<dyn TokenProvider>,
        surface: Arc<dyn GatewaySurface>,
    ) -> Self {
        let http = StorefrontHttpClient::new(&config.base_url, tokens.clone());
        Self::with_remotes(
            config,
            tokens,
            surface,
            Arc::new(HttpCartRemote::new(http.clone())),
            Arc::new(HttpOrderRemote::new(http.clone())),
            Arc::new(HttpServiceabilityRemote::new(http)),
        )
    }

    /// Build with explicit gateway implementations (tests, in-process)
    pub fn with_remotes(
        config: EngineConfig,
        tokens: Arc<dyn TokenProvider>,
        surface: Arc<dyn GatewaySurface>,
        cart_remote: Arc<dyn CartRemote>,
        order_remote: Arc<dyn OrderRemote>,
        serviceability: Arc<dyn ServiceabilityRemote>,
    ) -> Self {
        let events = crate::events::channel();

        // Seed from the persisted cache so a restarted host shows the
        // last-known cart before the first refresh lands
        let cache = EngineCache::load(&config.cache_path());
        let selected_address = Arc::new(RwLock::new(cache.selected_address));

        let cart = Arc::new(CartStore::new(
            cart_remote.clone(),
            tokens,
            selected_address.clone(),
            events.clone(),
        ));
        if cache.cart.is_some() {
            cart.reconcile(cache.cart);
        }

        let orders = Arc::new(OrderLifecycleTracker::new(order_remote.clone(), events.clone()));

        let checkout = Arc::new(CheckoutOrchestrator::new(
            cart.clone(),
            order_remote,
            serviceability.clone(),
            PaymentGatewayBridge::new(surface),
            orders.clone(),
            selected_address.clone(),
            events.clone(),
            config.store_id.clone(),
            config.payment_gateway.clone(),
            config.serviceability_timeout,
        ));

        Self {
            config,
            cart,
            cart_remote,
            serviceability,
            checkout,
            orders,
            selected_address,
            events,
            shutdown: CancellationToken::new(),
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn cart(&self) -> &Arc<CartStore> {
        &self.cart
    }

    pub fn checkout(&self) -> &Arc<CheckoutOrchestrator> {
        &self.checkout
    }

    pub fn orders(&self) -> &Arc<OrderLifecycleTracker> {
        &self.orders
    }

    pub fn subscribe(&self) -> broadcast::Receiver<EngineEvent> {
        self.events.subscribe()
    }

    pub fn selected_address(&self) -> Option<DeliveryAddress> {
        self.selected_address.read().clone()
    }

    pub fn select_address(&self, address: Option<DeliveryAddress>) {
        *self.selected_address.write() = address;
        self.persist_cache();
    }

    // ========================================================================
    // Flows
    // ========================================================================

    /// Add a variant to the cart, gated on serviceability when the
    /// selected address carries coordinates
    pub async fn add_to_cart(
        &self,
        product: &Product,
        variant: &Variant,
        requested_qty: u32,
    ) -> EngineResult<()> {
        let point = self.selected_address.read().as_ref().and_then(|a| a.coordinates);
        if let Some(point) = point {
            let available = check_with_timeout(
                &*self.serviceability,
                point,
                self.config.serviceability_timeout,
            )
            .await;
            if !available {
                return Err(EngineError::NotServiceable);
            }
        }
        self.cart.add_line(product, variant, requested_qty).await
    }

    /// Fetch the authoritative cart and reconcile. Called on screen focus
    /// and by the sync worker; this is the documented convergence path
    /// after any missed best-effort revert.
    pub async fn refresh(&self) -> EngineResult<()> {
        let snapshot = self.cart_remote.fetch().await?;
        self.cart.reconcile(snapshot);
        self.persist_cache();
        Ok(())
    }

    /// Replay a delivered order into the cart, then reconcile so the
    /// server's view of the re-added lines is authoritative
    pub async fn reorder(&self, order_id: &str) -> EngineResult<ReorderReport> {
        let report = self.orders.reorder(order_id, &*self.cart_remote).await?;
        self.refresh().await?;
        Ok(report)
    }

    /// Spawn the periodic reconcile loop
    pub fn spawn_sync(&self) -> tokio::task::JoinHandle<()> {
        let worker = SyncWorker::new(
            self.cart.clone(),
            self.cart_remote.clone(),
            self.config.sync_interval,
            self.shutdown.child_token(),
        );
        tokio::spawn(worker.run())
    }

    /// Stop background work and save the cache one last time
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.persist_cache();
    }

    fn persist_cache(&self) {
        let cache = EngineCache {
            cart: Some(self.cart.to_snapshot()),
            selected_address: self.selected_address.read().clone(),
            saved_at: 0,
        };
        if let Err(e) = cache.save(&self.config.cache_path()) {
            tracing::warn!(error = %e, "Engine cache save failed");
        }
    }
}

impl Drop for PomeloEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
