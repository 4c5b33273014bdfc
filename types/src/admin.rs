use crate::player::{ParseVariantError, PlayerStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};

/// Preset reasons offered by the balance adjustment form.
pub const COMMON_ADJUSTMENT_REASONS: [&str; 8] = [
    "System reward",
    "Promotion gift",
    "Customer service compensation",
    "Erroneous charge refund",
    "Violation penalty",
    "System error correction",
    "Referral bonus",
    "First deposit bonus",
];

/// Preset reasons offered by the status change form.
pub const COMMON_STATUS_REASONS: [&str; 8] = [
    "Routine operation",
    "Terms of service violation",
    "Suspicious activity detected",
    "Customer service request",
    "System maintenance",
    "Risk control",
    "Account review",
    "Self exclusion",
];

/// Direction of a balance adjustment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjustmentType {
    #[default]
    Add,
    Subtract,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Add => "add",
            AdjustmentType::Subtract => "subtract",
        }
    }

    /// Balance after applying `amount` in this direction.
    pub fn apply(&self, balance: f64, amount: f64) -> f64 {
        match self {
            AdjustmentType::Add => balance + amount,
            AdjustmentType::Subtract => balance - amount,
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentType {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "add" => Ok(AdjustmentType::Add),
            "subtract" => Ok(AdjustmentType::Subtract),
            _ => Err(ParseVariantError {
                kind: "adjustment type",
                value: s.to_string(),
            }),
        }
    }
}

/// Body of `POST /players/{id}/balance/adjust`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BalanceAdjustment {
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: AdjustmentType,
    pub reason: String,
}

/// Body of `PUT /players/{id}/status`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub status: PlayerStatus,
}

/// Optional ceilings placed on a player. Unset limits are omitted on the wire.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerLimits {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub daily_bet_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bet_amount_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deposit_limit: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loss_limit: Option<f64>,
    /// Minutes per session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_time_limit: Option<f64>,
}

impl PlayerLimits {
    pub fn is_empty(&self) -> bool {
        self.daily_bet_limit.is_none()
            && self.bet_amount_limit.is_none()
            && self.deposit_limit.is_none()
            && self.loss_limit.is_none()
            && self.session_time_limit.is_none()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BalanceHistoryRecord {
    pub id: u64,
    pub amount: f64,
    #[serde(rename = "type")]
    pub kind: String,
    pub reason: String,
    pub balance_before: f64,
    pub balance_after: f64,
    pub created_at: DateTime<Utc>,
    pub admin_user: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusHistoryRecord {
    pub id: u64,
    pub old_status: PlayerStatus,
    pub new_status: PlayerStatus,
    pub reason: String,
    pub created_at: DateTime<Utc>,
    pub admin_user: String,
}

/// Body of `POST /auth/login`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    #[serde(default)]
    pub user: serde_json::Value,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub token: String,
}
