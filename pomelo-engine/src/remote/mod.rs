//! Remote storefront gateways
//!
//! Trait-per-concern interfaces over the storefront backend plus their
//! reqwest implementations. Tests substitute these traits with fakes;
//! integration tests drive the HTTP implementations against the mock
//! storefront.

pub mod cart;
pub mod http;
pub mod orders;
pub mod serviceability;

pub use cart::{CartRemote, HttpCartRemote};
pub use http::StorefrontHttpClient;
pub use orders::{HttpOrderRemote, OrderRemote};
pub use serviceability::{
    HttpServiceabilityRemote, ServiceabilityRemote, check_with_timeout,
};
