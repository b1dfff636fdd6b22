//! Display-stage normalization
//!
//! Maps heterogeneous raw status tokens from the server onto a fixed
//! four-stage display pipeline plus an out-of-band cancelled state. The
//! mapping is total: an unrecognized token degrades to `Pending` instead
//! of crashing, so new server statuses never break old clients.

use serde::{Deserialize, Serialize};
use shared::models::OrderTimeline;

/// Raw token that alone permits reordering
pub const DELIVERED_TOKEN: &str = "DELIVERED";

/// Fixed display pipeline: `Placed → Packed → OnTheWay → Delivered`,
/// plus `Cancelled` out-of-band and `Pending` as the safe default
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayStage {
    Pending,
    Placed,
    Packed,
    OnTheWay,
    Delivered,
    Cancelled,
}

impl DisplayStage {
    /// Total mapping from a raw server token. Many-to-one; unknown tokens
    /// map to `Pending`.
    pub fn from_raw(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "PAYMENT_PENDING" => Self::Pending,
            "PAYMENT_CONFIRMED" | "CONFIRMED" | "PLACED" | "ALLOCATED" | "ACCEPTED" => {
                Self::Placed
            }
            "PACKED" | "PACKING" | "READY" => Self::Packed,
            "DISPATCHED" | "OUT_FOR_DELIVERY" | "ON_THE_WAY" | "SHIPPED" => Self::OnTheWay,
            "DELIVERED" | "COMPLETED" => Self::Delivered,
            "CANCELLED" | "CANCELED" | "REJECTED" | "REFUNDED" => Self::Cancelled,
            _ => Self::Pending,
        }
    }

    /// Friendly label for display
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Placed => "Order Placed",
            Self::Packed => "Packed",
            Self::OnTheWay => "On the Way",
            Self::Delivered => "Delivered",
            Self::Cancelled => "Cancelled",
        }
    }

    /// Index in the four-stage pipeline; `None` for the out-of-band states
    pub fn pipeline_index(&self) -> Option<usize> {
        match self {
            Self::Placed => Some(0),
            Self::Packed => Some(1),
            Self::OnTheWay => Some(2),
            Self::Delivered => Some(3),
            Self::Pending | Self::Cancelled => None,
        }
    }
}

/// One row of the displayed pipeline
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageView {
    pub stage: DisplayStage,
    pub label: &'static str,
    pub completed: bool,
    /// Explicit per-stage timestamp (epoch millis) when the server sent a
    /// richer timeline
    pub timestamp: Option<i64>,
}

/// Build the four-row pipeline view for an order.
///
/// Completion is index-derived from the coarse status; when a timeline
/// carries an explicit timestamp for a stage, its presence overrides the
/// index-based flag for that stage — richer data wins.
pub fn pipeline(raw_status: &str, timeline: Option<&OrderTimeline>) -> Vec<StageView> {
    let current = DisplayStage::from_raw(raw_status);
    let reached = current.pipeline_index();

    let stages = [
        DisplayStage::Placed,
        DisplayStage::Packed,
        DisplayStage::OnTheWay,
        DisplayStage::Delivered,
    ];

    stages
        .iter()
        .enumerate()
        .map(|(idx, stage)| {
            let timestamp = timeline.and_then(|t| match stage {
                DisplayStage::Placed => t.placed,
                DisplayStage::Packed => t.packed,
                DisplayStage::OnTheWay => t.dispatched,
                DisplayStage::Delivered => t.delivered,
                _ => None,
            });
            let completed = match timestamp {
                Some(_) => true,
                None => reached.is_some_and(|r| idx <= r),
            };
            StageView {
                stage: *stage,
                label: stage.label(),
                completed,
                timestamp,
            }
        })
        .collect()
}

/// Reorder eligibility is gated strictly on the raw delivered token;
/// no display stage and no other token permits it
pub fn is_reorder_eligible(raw_status: &str) -> bool {
    raw_status.trim().eq_ignore_ascii_case(DELIVERED_TOKEN)
}
