use chrono::{DateTime, Utc};
use core::str::FromStr;
use serde::{Deserialize, Serialize};

use zambrano_core::{DomainError, MovementId, VariantId};

/// Direction of a stock movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MovementKind {
    #[serde(rename = "IN")]
    In,
    #[serde(rename = "OUT")]
    Out,
}

impl MovementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MovementKind::In => "IN",
            MovementKind::Out => "OUT",
        }
    }
}

impl FromStr for MovementKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "IN" => Ok(MovementKind::In),
            "OUT" => Ok(MovementKind::Out),
            other => Err(DomainError::validation(format!(
                "unknown movement kind '{other}'"
            ))),
        }
    }
}

/// Immutable audit row capturing one stock change.
///
/// A movement references its variant but is not owned by it; the ledger is a
/// log. `stock_after = stock_before - quantity` for `Out`, `+ quantity` for
/// `In`. `unit_price`/`total_amount` are carried for sales only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub movement_id: MovementId,
    pub variant_id: VariantId,
    pub kind: MovementKind,
    pub quantity: i64,
    pub stock_before: i64,
    pub stock_after: i64,
    pub unit_price: Option<i64>,
    pub total_amount: Option<i64>,
    pub occurred_at: DateTime<Utc>,
}
