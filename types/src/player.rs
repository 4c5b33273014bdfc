use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use thiserror::Error;

/// Returned when a string does not name a known variant.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseVariantError {
    pub kind: &'static str,
    pub value: String,
}

/// Account status of a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    #[default]
    Active,
    Inactive,
    Suspended,
    Deleted,
}

impl PlayerStatus {
    pub const ALL: [PlayerStatus; 4] = [
        PlayerStatus::Active,
        PlayerStatus::Inactive,
        PlayerStatus::Suspended,
        PlayerStatus::Deleted,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "active",
            PlayerStatus::Inactive => "inactive",
            PlayerStatus::Suspended => "suspended",
            PlayerStatus::Deleted => "deleted",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "Active",
            PlayerStatus::Inactive => "Inactive",
            PlayerStatus::Suspended => "Suspended",
            PlayerStatus::Deleted => "Deleted",
        }
    }

    /// What the status means for the player, shown next to the status picker.
    pub fn description(&self) -> &'static str {
        match self {
            PlayerStatus::Active => "Player can use every feature",
            PlayerStatus::Inactive => "Player cannot log in or perform any action",
            PlayerStatus::Suspended => "Player is temporarily restricted from some features",
            PlayerStatus::Deleted => "Account is deleted (irreversible)",
        }
    }
}

impl fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PlayerStatus {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PlayerStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseVariantError {
                kind: "player status",
                value: s.to_string(),
            })
    }
}

/// How far a player has proven their identity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationLevel {
    #[default]
    None,
    Email,
    Phone,
    Identity,
}

impl VerificationLevel {
    pub const ALL: [VerificationLevel; 4] = [
        VerificationLevel::None,
        VerificationLevel::Email,
        VerificationLevel::Phone,
        VerificationLevel::Identity,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationLevel::None => "none",
            VerificationLevel::Email => "email",
            VerificationLevel::Phone => "phone",
            VerificationLevel::Identity => "identity",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            VerificationLevel::None => "Unverified",
            VerificationLevel::Email => "Email verified",
            VerificationLevel::Phone => "Phone verified",
            VerificationLevel::Identity => "Identity verified",
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VerificationLevel {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        VerificationLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseVariantError {
                kind: "verification level",
                value: s.to_string(),
            })
    }
}

/// Risk classification assigned by the backend.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
    Blacklist,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Medium,
        RiskLevel::High,
        RiskLevel::Blacklist,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
            RiskLevel::Blacklist => "blacklist",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low risk",
            RiskLevel::Medium => "Medium risk",
            RiskLevel::High => "High risk",
            RiskLevel::Blacklist => "Blacklisted",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RiskLevel::ALL
            .into_iter()
            .find(|level| level.as_str() == s)
            .ok_or_else(|| ParseVariantError {
                kind: "risk level",
                value: s.to_string(),
            })
    }
}

/// Player account as returned by the backend.
///
/// The backend owns this record. Every view holds its own copy, which may be
/// stale until that view refetches.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: u64,
    pub player_id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub real_name: String,
    #[serde(default)]
    pub phone: String,

    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub timezone: String,

    pub status: PlayerStatus,
    #[serde(default)]
    pub verification_level: VerificationLevel,
    #[serde(default)]
    pub risk_level: RiskLevel,
    #[serde(default)]
    pub vip_level: u32,

    #[serde(default)]
    pub last_login_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub login_count: u64,

    #[serde(default)]
    pub total_deposit: f64,
    #[serde(default)]
    pub total_withdraw: f64,
    #[serde(default)]
    pub total_bet: f64,
    #[serde(default)]
    pub total_win: f64,
    #[serde(default)]
    pub balance: f64,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Player {
    /// Winnings minus wagers; negative when the house is ahead.
    pub fn net_win(&self) -> f64 {
        self.total_win - self.total_bet
    }

    pub fn net_deposit(&self) -> f64 {
        self.total_deposit - self.total_withdraw
    }
}
