//! Delivery address models
//!
//! Address management (geocoding, map search, permissions) lives outside the
//! engine; these types are the shape in which the selected address arrives.

use serde::{Deserialize, Serialize};

/// Address kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AddressType {
    Home,
    Office,
    Other,
    /// One-off address entered for a single order
    Adhoc,
}

/// Geographic point used for serviceability checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

/// A saved delivery address
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeliveryAddress {
    pub id: String,
    #[serde(rename = "type")]
    pub address_type: AddressType,
    pub line1: String,
    #[serde(default)]
    pub line2: Option<String>,
    #[serde(default)]
    pub landmark: Option<String>,
    #[serde(default)]
    pub coordinates: Option<GeoPoint>,
    #[serde(default)]
    pub is_default: bool,
}
