//! Persisted engine cache
//!
//! JSON file holding the last reconciled cart snapshot and the selected
//! address reference, so a restarted host can show a cart before the first
//! refresh completes. A corrupt or missing file falls back to the default;
//! the cache is a convenience, never a source of truth.

use crate::error::{EngineError, EngineResult};
use serde::{Deserialize, Serialize};
use shared::models::{CartSnapshot, DeliveryAddress};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EngineCache {
    #[serde(default)]
    pub cart: Option<CartSnapshot>,
    #[serde(default)]
    pub selected_address: Option<DeliveryAddress>,
    /// Epoch millis of the last save
    #[serde(default)]
    pub saved_at: i64,
}

impl EngineCache {
    /// Load from disk, falling back to the default on any problem
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str(&text) {
                Ok(cache) => cache,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Engine cache corrupt, starting fresh");
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Self::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Engine cache unreadable, starting fresh");
                Self::default()
            }
        }
    }

    /// Persist to disk, creating parent directories as needed
    pub fn save(&self, path: &Path) -> EngineResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| EngineError::Cache(format!("create {}: {}", parent.display(), e)))?;
        }
        let mut cache = self.clone();
        cache.saved_at = chrono::Utc::now().timestamp_millis();

        let text = serde_json::to_string_pretty(&cache)
            .map_err(|e| EngineError::Cache(format!("serialize: {}", e)))?;
        fs::write(path, text)
            .map_err(|e| EngineError::Cache(format!("write {}: {}", path.display(), e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::models::{AddressType, CartLine, CartPricing};

    fn sample() -> EngineCache {
        EngineCache {
            cart: Some(CartSnapshot {
                lines: vec![CartLine {
                    line_id: Some("srv-1".into()),
                    product_id: "p-1".into(),
                    variant_id: Some("v-1".into()),
                    name: "Tomatoes 500g".into(),
                    unit_price: 30.0,
                    quantity: 2,
                    min_order_qty: 1,
                    max_order_qty: 999,
                    available_stock: 999,
                    category: None,
                    is_free_product: false,
                }],
                item_count: 1,
                pricing: CartPricing {
                    subtotal: 60.0,
                    ..Default::default()
                },
            }),
            selected_address: Some(DeliveryAddress {
                id: "addr-1".into(),
                address_type: AddressType::Home,
                line1: "12 Lake Rd".into(),
                line2: None,
                landmark: None,
                coordinates: None,
                is_default: true,
            }),
            saved_at: 0,
        }
    }

    #[test]
    fn test_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine_cache.json");

        sample().save(&path).unwrap();
        let loaded = EngineCache::load(&path);

        let cart = loaded.cart.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].quantity, 2);
        assert_eq!(loaded.selected_address.unwrap().id, "addr-1");
        assert!(loaded.saved_at > 0);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = EngineCache::load(&dir.path().join("nope.json"));
        assert!(loaded.cart.is_none());
        assert!(loaded.selected_address.is_none());
    }

    #[test]
    fn test_corrupt_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("engine_cache.json");
        std::fs::write(&path, "{not json").unwrap();

        let loaded = EngineCache::load(&path);
        assert!(loaded.cart.is_none());
    }

    #[test]
    fn test_save_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dir/engine_cache.json");
        sample().save(&path).unwrap();
        assert!(path.exists());
    }
}
