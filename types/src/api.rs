use crate::player::{ParseVariantError, Player, PlayerStatus, RiskLevel};
use serde::{Deserialize, Deserializer, Serialize};
use std::{fmt, str::FromStr};
use url::form_urlencoded;

/// Default page size used by the backend when `limit` is omitted.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Wrapper every backend response is delivered in.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    /// Machine readable failure code (e.g. `VALIDATION_FAILED`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl<T> Envelope<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            timestamp: None,
            code: None,
        }
    }

    pub fn ok_with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            ..Self::ok(data)
        }
    }

    pub fn failure(message: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            timestamp: None,
            code: Some(code.into()),
        }
    }

    /// Returns the payload of a successful envelope, or the backend message
    /// (falling back to `default_message`) otherwise.
    pub fn into_data(self, default_message: &str) -> Result<T, String> {
        match (self.success, self.data) {
            (true, Some(data)) => Ok(data),
            _ => Err(self
                .message
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| default_message.to_string())),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(ParseVariantError {
                kind: "sort order",
                value: s.to_string(),
            }),
        }
    }
}

/// Paging and ordering shared by every list endpoint.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginationParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl PaginationParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_pair(&mut pairs, "page", self.page);
        push_pair(&mut pairs, "limit", self.limit);
        push_str(&mut pairs, "sort", self.sort.as_deref());
        push_pair(&mut pairs, "order", self.order);
        pairs
    }

    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.query_pairs())
    }
}

/// Filters, ordering and paging for the player list.
///
/// Only fields that are set (and, for strings, non-empty) are sent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerSearchParams {
    pub search: Option<String>,
    pub status: Option<PlayerStatus>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_balance: Option<f64>,
    pub max_balance: Option<f64>,
    pub risk_level: Option<RiskLevel>,
    pub vip_level: Option<u32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<SortOrder>,
}

impl PlayerSearchParams {
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        push_str(&mut pairs, "search", self.search.as_deref());
        push_pair(&mut pairs, "status", self.status);
        push_str(&mut pairs, "startDate", self.start_date.as_deref());
        push_str(&mut pairs, "endDate", self.end_date.as_deref());
        push_pair(&mut pairs, "minBalance", self.min_balance);
        push_pair(&mut pairs, "maxBalance", self.max_balance);
        push_pair(&mut pairs, "risk_level", self.risk_level);
        push_pair(&mut pairs, "vip_level", self.vip_level);
        push_pair(&mut pairs, "page", self.page);
        push_pair(&mut pairs, "limit", self.limit);
        push_str(&mut pairs, "sort", self.sort.as_deref());
        push_pair(&mut pairs, "order", self.order);
        pairs
    }

    pub fn to_query_string(&self) -> String {
        encode_pairs(&self.query_pairs())
    }
}

fn push_pair<T: ToString>(
    pairs: &mut Vec<(&'static str, String)>,
    key: &'static str,
    value: Option<T>,
) {
    if let Some(value) = value {
        push_str(pairs, key, Some(&value.to_string()));
    }
}

fn push_str(pairs: &mut Vec<(&'static str, String)>, key: &'static str, value: Option<&str>) {
    match value {
        Some(value) if !value.is_empty() => pairs.push((key, value.to_string())),
        _ => {}
    }
}

fn encode_pairs(pairs: &[(&'static str, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        serializer.append_pair(key, value);
    }
    serializer.finish()
}

/// Appends `?query` to `path` when the query is non-empty.
pub fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{path}?{query}")
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_previous: bool,
}

impl Pagination {
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(limit as u64) as u32;
        Self {
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }
}

/// Filters echoed back by the backend with a player page.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerFilters {
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub risk_level: String,
    #[serde(default)]
    pub verification_level: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortInfo {
    pub field: String,
    pub order: SortOrder,
}

/// One page of the player list.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PlayerPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub players: Vec<Player>,
    pub pagination: Pagination,
    #[serde(default)]
    pub filters: PlayerFilters,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort: Option<SortInfo>,
}

// The backend serializes an empty result set as `null`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
