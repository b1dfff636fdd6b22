//! Domain models shared between the engine and the storefront surface

pub mod address;
pub mod cart;
pub mod order;
pub mod payment;
pub mod product;

pub use address::{AddressType, DeliveryAddress, GeoPoint};
pub use cart::{CartLine, CartPricing, CartSnapshot};
pub use order::{
    Order, OrderLineSnapshot, OrderPricing, OrderTimeline, PaymentInit, PaymentMethod,
    PlaceOrderResponse,
};
pub use payment::{GatewayData, PaymentCompletion, ServiceabilityResult, VerifyOutcome};
pub use product::{Product, UNBOUNDED_QTY, Variant};
