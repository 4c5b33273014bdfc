use axum::{
    body::{self, Body, Bytes},
    extract::{Path, Query, Request, State as AxumState},
    http::{header, HeaderMap, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use backoffice_types::{
    AdjustmentType, BalanceAdjustment, Credentials, Envelope, LoginResponse, Pagination, Player,
    PlayerFilters, PlayerLimits, PlayerPage, PlayerStatus, RiskLevel, SortInfo, SortOrder,
    StatusUpdate, TokenResponse, VerificationLevel, DEFAULT_PAGE_SIZE,
};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashSet},
    sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard},
};
use tower_http::cors::{Any, CorsLayer};

/// Path every route is mounted under.
pub const API_PREFIX: &str = "/api/v1";

/// Credentials accepted by `POST /auth/login`.
pub const ADMIN_USERNAME: &str = "admin";
pub const ADMIN_PASSWORD: &str = "admin123";

/// Largest page the list endpoints will return.
const MAX_PAGE_SIZE: u32 = 100;

/// Fields the player list may be sorted by.
const SORT_FIELDS: [&str; 12] = [
    "id",
    "player_id",
    "username",
    "email",
    "created_at",
    "updated_at",
    "last_login_at",
    "balance",
    "vip_level",
    "login_count",
    "status",
    "risk_level",
];

const GAME_TYPES: [&str; 4] = ["baccarat", "blackjack", "roulette", "texas_holdem"];

/// 2024-01-01T00:00:00Z
const SEED_EPOCH: i64 = 1_704_067_200;

/// A rejected request: HTTP status plus the failure envelope returned with it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApiFailure {
    pub status: StatusCode,
    pub message: String,
    pub code: &'static str,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>, code: &'static str) -> Self {
        Self {
            status,
            message: message.into(),
            code,
        }
    }

    fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, "VALIDATION_FAILED")
    }

    fn not_found(id: &str) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("player {id} not found"),
            "PLAYER_NOT_FOUND",
        )
    }

    fn unauthorized() -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "invalid or missing token", "UNAUTHORIZED")
    }

    fn internal() -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "simulator state unavailable",
            "INTERNAL_ERROR",
        )
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        let mut envelope = Envelope::<Value>::failure(self.message, self.code);
        envelope.timestamp = Some(Utc::now().to_rfc3339());
        (self.status, Json(envelope)).into_response()
    }
}

/// Query string of `GET /players/`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct ListQuery {
    pub search: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "startDate")]
    pub start_date: Option<String>,
    #[serde(rename = "endDate")]
    pub end_date: Option<String>,
    #[serde(rename = "minBalance")]
    pub min_balance: Option<f64>,
    #[serde(rename = "maxBalance")]
    pub max_balance: Option<f64>,
    pub risk_level: Option<String>,
    pub verification_level: Option<String>,
    pub vip_level: Option<u32>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Query string of `GET /players/{id}/game-history`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub sort: Option<String>,
    pub order: Option<String>,
}

/// Weights applied by the value score, each in `0..=1`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    pub activity_weight: f64,
    pub loyalty_weight: f64,
    pub spending_weight: f64,
    pub risk_weight: f64,
    pub profitability_weight: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            activity_weight: 0.25,
            loyalty_weight: 0.20,
            spending_weight: 0.25,
            risk_weight: 0.15,
            profitability_weight: 0.15,
        }
    }
}

/// What the most recent request looked like on the wire.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestRecord {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub body_len: usize,
}

struct PlayerRecord {
    player: Player,
    limits: PlayerLimits,
}

#[derive(Default)]
pub struct State {
    players: BTreeMap<String, PlayerRecord>,
    tokens: HashSet<String>,

    failing: HashSet<String>,
    listing_outage: bool,
    last_request: Option<RequestRecord>,
}

/// In-memory stand-in for the backoffice backend.
#[derive(Clone, Default)]
pub struct Simulator {
    state: Arc<RwLock<State>>,
}

impl Simulator {
    /// Simulator seeded with [seed_players].
    pub fn new() -> Self {
        let simulator = Self::default();
        for player in seed_players() {
            simulator.insert_player(player);
        }
        simulator
    }

    fn read(&self) -> Option<RwLockReadGuard<'_, State>> {
        match self.state.read() {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::error!("Failed to acquire read lock: {}", e);
                None
            }
        }
    }

    fn write(&self) -> Option<RwLockWriteGuard<'_, State>> {
        match self.state.write() {
            Ok(state) => Some(state),
            Err(e) => {
                tracing::error!("Failed to acquire write lock: {}", e);
                None
            }
        }
    }

    pub fn insert_player(&self, player: Player) {
        let Some(mut state) = self.write() else {
            return;
        };
        state.players.insert(
            player.player_id.clone(),
            PlayerRecord {
                player,
                limits: PlayerLimits::default(),
            },
        );
    }

    pub fn player(&self, id: &str) -> Option<Player> {
        self.read()?
            .players
            .get(id)
            .map(|record| record.player.clone())
    }

    pub fn limits(&self, id: &str) -> Option<PlayerLimits> {
        self.read()?
            .players
            .get(id)
            .map(|record| record.limits.clone())
    }

    /// Makes every request whose path ends with `suffix` fail with a 500.
    pub fn fail_endpoint(&self, suffix: &str) {
        if let Some(mut state) = self.write() {
            state.failing.insert(suffix.to_string());
        }
    }

    pub fn restore_endpoint(&self, suffix: &str) {
        if let Some(mut state) = self.write() {
            state.failing.remove(suffix);
        }
    }

    /// While set, the player list answers `200` with `success: false`.
    pub fn set_listing_outage(&self, outage: bool) {
        if let Some(mut state) = self.write() {
            state.listing_outage = outage;
        }
    }

    pub fn last_request(&self) -> Option<RequestRecord> {
        self.read()?.last_request.clone()
    }

    /// `Authorization` header of the most recent request (if it had one).
    pub fn last_authorization(&self) -> Option<String> {
        self.last_request()?.authorization
    }

    fn observe(&self, record: RequestRecord) -> bool {
        let Some(mut state) = self.write() else {
            return false;
        };
        let failing = state
            .failing
            .iter()
            .any(|suffix| record.path.ends_with(suffix.as_str()));
        state.last_request = Some(record);
        failing
    }

    pub fn list_players(&self, query: &ListQuery) -> Result<PlayerPage, ApiFailure> {
        let state = self.read().ok_or_else(ApiFailure::internal)?;
        if state.listing_outage {
            return Err(ApiFailure::new(
                StatusCode::OK,
                "player listing is temporarily unavailable",
                "DATABASE_ERROR",
            ));
        }

        let search = non_empty(&query.search).map(str::to_lowercase);
        let status = parse_filter::<PlayerStatus>(&query.status)?;
        let risk_level = parse_filter::<RiskLevel>(&query.risk_level)?;
        let verification_level = parse_filter::<VerificationLevel>(&query.verification_level)?;
        let start_date = parse_date(&query.start_date)?;
        let end_date = parse_date(&query.end_date)?;

        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);
        let sort = non_empty(&query.sort).unwrap_or("id").to_string();
        if !SORT_FIELDS.contains(&sort.as_str()) {
            return Err(ApiFailure::validation(format!("invalid sort field: {sort}")));
        }
        let order = parse_filter::<SortOrder>(&query.order)?.unwrap_or(SortOrder::Desc);

        let mut players: Vec<Player> = state
            .players
            .values()
            .map(|record| &record.player)
            .filter(|player| {
                search.as_ref().map_or(true, |needle| {
                    player.username.to_lowercase().contains(needle)
                        || player.email.to_lowercase().contains(needle)
                        || player.real_name.to_lowercase().contains(needle)
                })
            })
            .filter(|player| status.map_or(true, |status| player.status == status))
            .filter(|player| risk_level.map_or(true, |risk| player.risk_level == risk))
            .filter(|player| {
                verification_level.map_or(true, |level| player.verification_level == level)
            })
            .filter(|player| query.vip_level.map_or(true, |vip| player.vip_level == vip))
            .filter(|player| {
                start_date.map_or(true, |start| player.created_at.date_naive() >= start)
            })
            .filter(|player| end_date.map_or(true, |end| player.created_at.date_naive() <= end))
            .filter(|player| query.min_balance.map_or(true, |min| player.balance >= min))
            .filter(|player| query.max_balance.map_or(true, |max| player.balance <= max))
            .cloned()
            .collect();

        players.sort_by(|a, b| {
            let ordering = compare_players(&sort, a, b);
            match order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });

        let total = players.len() as u64;
        let players = players
            .into_iter()
            .skip(page_offset(page, limit))
            .take(limit as usize)
            .collect();

        Ok(PlayerPage {
            players,
            pagination: Pagination::new(page, limit, total),
            filters: PlayerFilters {
                search: query.search.clone().unwrap_or_default(),
                status: query.status.clone().unwrap_or_default(),
                start_date: query.start_date.clone().unwrap_or_default(),
                end_date: query.end_date.clone().unwrap_or_default(),
                risk_level: query.risk_level.clone().unwrap_or_default(),
                verification_level: query.verification_level.clone().unwrap_or_default(),
            },
            sort: Some(SortInfo { field: sort, order }),
        })
    }

    pub fn get_player(&self, id: &str) -> Result<Player, ApiFailure> {
        self.player(id).ok_or_else(|| ApiFailure::not_found(id))
    }

    pub fn balance(&self, id: &str) -> Result<Value, ApiFailure> {
        let player = self.get_player(id)?;
        Ok(json!({
            "player_id": player.player_id,
            "balance": player.balance,
            "currency": "TWD",
            "updated_at": player.updated_at,
        }))
    }

    pub fn game_history(&self, id: &str, query: &HistoryQuery) -> Result<Value, ApiFailure> {
        let player = self.get_player(id)?;
        let order = parse_filter::<SortOrder>(&query.order)?.unwrap_or(SortOrder::Desc);
        let page = query.page.unwrap_or(1).max(1);
        let limit = query
            .limit
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .clamp(1, MAX_PAGE_SIZE);

        let mut rounds = game_rounds(&player);
        if order == SortOrder::Desc {
            rounds.reverse();
        }
        let total = rounds.len() as u64;
        let records: Vec<Value> = rounds
            .into_iter()
            .skip(page_offset(page, limit))
            .take(limit as usize)
            .collect();

        Ok(json!({
            "player_id": player.player_id,
            "records": records,
            "pagination": Pagination::new(page, limit, total),
        }))
    }

    pub fn update_status(&self, id: &str, status: PlayerStatus) -> Result<Value, ApiFailure> {
        let mut state = self.write().ok_or_else(ApiFailure::internal)?;
        let record = state
            .players
            .get_mut(id)
            .ok_or_else(|| ApiFailure::not_found(id))?;
        let old_status = record.player.status;
        if old_status == PlayerStatus::Deleted && status != PlayerStatus::Deleted {
            return Err(ApiFailure::validation("deleted players cannot be restored"));
        }
        record.player.status = status;
        record.player.updated_at = Utc::now();
        Ok(json!({
            "player_id": id,
            "old_status": old_status,
            "new_status": status,
        }))
    }

    pub fn set_limits(&self, id: &str, limits: PlayerLimits) -> Result<Value, ApiFailure> {
        let values = [
            limits.daily_bet_limit,
            limits.bet_amount_limit,
            limits.deposit_limit,
            limits.loss_limit,
            limits.session_time_limit,
        ];
        if values.iter().flatten().any(|value| *value < 0.0) {
            return Err(ApiFailure::validation("limits must not be negative"));
        }

        let mut state = self.write().ok_or_else(ApiFailure::internal)?;
        let record = state
            .players
            .get_mut(id)
            .ok_or_else(|| ApiFailure::not_found(id))?;
        record.limits = limits;
        serde_json::to_value(&record.limits).map_err(|_| ApiFailure::internal())
    }

    pub fn adjust_balance(
        &self,
        id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Value, ApiFailure> {
        if adjustment.amount.is_nan() || adjustment.amount <= 0.0 {
            return Err(ApiFailure::validation("amount must be greater than 0"));
        }
        if adjustment.reason.trim().is_empty() {
            return Err(ApiFailure::validation("reason is required"));
        }

        let mut state = self.write().ok_or_else(ApiFailure::internal)?;
        let record = state
            .players
            .get_mut(id)
            .ok_or_else(|| ApiFailure::not_found(id))?;
        let balance_before = record.player.balance;
        if adjustment.kind == AdjustmentType::Subtract && adjustment.amount > balance_before {
            return Err(ApiFailure::new(
                StatusCode::BAD_REQUEST,
                "insufficient balance",
                "INSUFFICIENT_BALANCE",
            ));
        }
        let balance_after = adjustment.kind.apply(balance_before, adjustment.amount);
        record.player.balance = balance_after;
        record.player.updated_at = Utc::now();

        Ok(json!({
            "player_id": id,
            "amount": adjustment.amount,
            "type": adjustment.kind,
            "reason": adjustment.reason,
            "balance_before": balance_before,
            "balance_after": balance_after,
        }))
    }

    pub fn behavior_analysis(&self, id: &str) -> Result<Value, ApiFailure> {
        let player = self.get_player(id)?;
        let games = game_rounds(&player).len() as u64;
        Ok(json!({
            "player_id": player.player_id,
            "username": player.username,
            "login_count": player.login_count,
            "last_login_at": player.last_login_at,
            "games_played": games,
            "average_bet_per_login": player.total_bet / player.login_count.max(1) as f64,
            "activity_level": activity_level(games),
        }))
    }

    pub fn game_preference(&self, id: &str) -> Result<Value, ApiFailure> {
        let player = self.get_player(id)?;
        let mut by_type: BTreeMap<&str, (u64, f64)> = BTreeMap::new();
        for round in game_rounds(&player) {
            let game_type = GAME_TYPES
                .iter()
                .find(|kind| round["game_type"] == **kind)
                .copied()
                .unwrap_or("unknown");
            let entry = by_type.entry(game_type).or_default();
            entry.0 += 1;
            entry.1 += round["bet"].as_f64().unwrap_or_default();
        }
        let favorite = by_type
            .iter()
            .max_by(|a, b| a.1 .0.cmp(&b.1 .0).then(b.0.cmp(a.0)))
            .map(|(kind, _)| *kind);
        let game_types: Vec<Value> = by_type
            .iter()
            .map(|(kind, (games, bet))| {
                json!({ "game_type": kind, "games": games, "total_bet": bet })
            })
            .collect();
        Ok(json!({
            "player_id": player.player_id,
            "favorite_game_type": favorite,
            "total_games": by_type.values().map(|(games, _)| games).sum::<u64>(),
            "game_types": game_types,
        }))
    }

    pub fn spending_habits(&self, id: &str) -> Result<Value, ApiFailure> {
        let player = self.get_player(id)?;
        let deposits = player.login_count.max(1) as f64;
        let average_deposit = player.total_deposit / deposits;
        Ok(json!({
            "player_id": player.player_id,
            "total_deposit": player.total_deposit,
            "total_withdraw": player.total_withdraw,
            "net_deposit": player.net_deposit(),
            "average_deposit": average_deposit,
            "spending_level": spending_level(player.total_deposit, average_deposit),
        }))
    }

    pub fn value_score(&self, id: &str, weights: ScoreWeights) -> Result<Value, ApiFailure> {
        let player = self.get_player(id)?;
        let activity = (player.login_count as f64).min(100.0);
        let loyalty = (player.vip_level as f64 * 20.0).min(100.0);
        let spending = (player.total_deposit / 1_000.0).min(100.0);
        let risk = match player.risk_level {
            RiskLevel::Low => 10.0,
            RiskLevel::Medium => 40.0,
            RiskLevel::High => 70.0,
            RiskLevel::Blacklist => 100.0,
        };
        let profitability =
            (50.0 + (player.total_bet - player.total_win) / 1_000.0).clamp(0.0, 100.0);

        let mut total_weight = weights.activity_weight
            + weights.loyalty_weight
            + weights.spending_weight
            + weights.risk_weight
            + weights.profitability_weight;
        if total_weight == 0.0 {
            total_weight = 1.0;
        }
        // Risk counts against the player, so its score is inverted
        let overall = ((activity * weights.activity_weight
            + loyalty * weights.loyalty_weight
            + spending * weights.spending_weight
            + (100.0 - risk) * weights.risk_weight
            + profitability * weights.profitability_weight)
            / total_weight)
            .clamp(0.0, 100.0);

        Ok(json!({
            "player_id": player.player_id,
            "overall_score": overall,
            "value_category": value_category(overall),
            "activity_score": activity,
            "loyalty_score": loyalty,
            "spending_score": spending,
            "risk_score": risk,
            "profitability_score": profitability,
            "weights": weights,
        }))
    }

    pub fn login(&self, credentials: &Credentials) -> Result<LoginResponse, ApiFailure> {
        if credentials.username != ADMIN_USERNAME || credentials.password != ADMIN_PASSWORD {
            return Err(ApiFailure::new(
                StatusCode::UNAUTHORIZED,
                "invalid username or password",
                "INVALID_CREDENTIALS",
            ));
        }
        let token = uuid::Uuid::new_v4().to_string();
        let mut state = self.write().ok_or_else(ApiFailure::internal)?;
        state.tokens.insert(token.clone());
        Ok(LoginResponse {
            token,
            user: json!({ "username": ADMIN_USERNAME, "role": "admin" }),
        })
    }

    pub fn logout(&self, token: Option<&str>) {
        if let (Some(token), Some(mut state)) = (token, self.write()) {
            state.tokens.remove(token);
        }
    }

    pub fn refresh(&self, token: Option<&str>) -> Result<TokenResponse, ApiFailure> {
        let token = token.ok_or_else(ApiFailure::unauthorized)?;
        let mut state = self.write().ok_or_else(ApiFailure::internal)?;
        if !state.tokens.remove(token) {
            return Err(ApiFailure::unauthorized());
        }
        let token = uuid::Uuid::new_v4().to_string();
        state.tokens.insert(token.clone());
        Ok(TokenResponse { token })
    }

    pub fn is_token_valid(&self, token: &str) -> bool {
        self.read()
            .map(|state| state.tokens.contains(token))
            .unwrap_or(false)
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|value| !value.is_empty())
}

fn parse_filter<T: std::str::FromStr>(value: &Option<String>) -> Result<Option<T>, ApiFailure>
where
    T::Err: std::fmt::Display,
{
    non_empty(value)
        .map(|value| {
            value
                .parse::<T>()
                .map_err(|err| ApiFailure::validation(err.to_string()))
        })
        .transpose()
}

fn parse_date(value: &Option<String>) -> Result<Option<NaiveDate>, ApiFailure> {
    non_empty(value)
        .map(|value| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .map_err(|_| ApiFailure::validation(format!("invalid date: {value}")))
        })
        .transpose()
}

fn compare_players(field: &str, a: &Player, b: &Player) -> Ordering {
    match field {
        "player_id" => a.player_id.cmp(&b.player_id),
        "username" => a.username.cmp(&b.username),
        "email" => a.email.cmp(&b.email),
        "created_at" => a.created_at.cmp(&b.created_at),
        "updated_at" => a.updated_at.cmp(&b.updated_at),
        "last_login_at" => a.last_login_at.cmp(&b.last_login_at),
        "balance" => a.balance.total_cmp(&b.balance),
        "vip_level" => a.vip_level.cmp(&b.vip_level),
        "login_count" => a.login_count.cmp(&b.login_count),
        "status" => a.status.as_str().cmp(b.status.as_str()),
        "risk_level" => a.risk_level.as_str().cmp(b.risk_level.as_str()),
        _ => a.id.cmp(&b.id),
    }
    .then(a.id.cmp(&b.id))
}

/// Deterministic round history derived from the player's totals, oldest first.
fn game_rounds(player: &Player) -> Vec<Value> {
    let count = 3 + (player.id % 5) as usize;
    let average_bet = (player.total_bet / 100.0).max(10.0).round();
    (0..count)
        .map(|round| {
            let bet = average_bet * (round as f64 + 1.0);
            let win = if round % 2 == 0 { bet * 1.9 } else { 0.0 };
            let played_at = player.created_at + Duration::hours(round as i64 * 6);
            json!({
                "round_id": format!("{}-R{:03}", player.player_id, round + 1),
                "game_type": GAME_TYPES[(player.id as usize + round) % GAME_TYPES.len()],
                "bet": bet,
                "win": win,
                "played_at": played_at,
            })
        })
        .collect()
}

fn activity_level(games: u64) -> &'static str {
    match games {
        0 => "inactive",
        1..=5 => "low",
        6..=15 => "medium",
        16..=30 => "high",
        _ => "peak",
    }
}

fn spending_level(total: f64, average: f64) -> &'static str {
    if total >= 10_000.0 || average >= 500.0 {
        "high_value"
    } else if total >= 5_000.0 || average >= 200.0 {
        "medium_value"
    } else if total >= 1_000.0 || average >= 50.0 {
        "low_value"
    } else {
        "minimal"
    }
}

fn value_category(score: f64) -> &'static str {
    if score >= 80.0 {
        "VIP"
    } else if score >= 60.0 {
        "High"
    } else if score >= 40.0 {
        "Medium"
    } else {
        "Low"
    }
}

fn seed_time(days: i64) -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(SEED_EPOCH, 0).unwrap_or_default() + Duration::days(days)
}

/// Players served by [Simulator::new].
pub fn seed_players() -> Vec<Player> {
    #[allow(clippy::type_complexity)]
    #[rustfmt::skip]
    let rows: [(
        &str,
        &str,
        PlayerStatus,
        VerificationLevel,
        RiskLevel,
        u32,
        u64,
        f64,
        f64,
        f64,
        f64,
        f64,
    ); 6] = [
        ("testuser123", "Test Player", PlayerStatus::Active, VerificationLevel::Email, RiskLevel::Low, 1, 42, 50_000.0, 25_000.0, 100_000.0, 85_000.0, 12_500.0),
        ("lucky_dragon", "Chen Wei", PlayerStatus::Active, VerificationLevel::Identity, RiskLevel::Low, 4, 318, 420_000.0, 150_000.0, 900_000.0, 870_000.0, 86_000.0),
        ("night_owl", "Lin Mei", PlayerStatus::Inactive, VerificationLevel::Phone, RiskLevel::Medium, 0, 7, 3_000.0, 0.0, 5_200.0, 2_900.0, 800.0),
        ("high_roller", "Wang Jun", PlayerStatus::Suspended, VerificationLevel::Identity, RiskLevel::High, 5, 154, 1_200_000.0, 950_000.0, 2_600_000.0, 2_480_000.0, 130_000.0),
        ("shadow_bet", "Liu Yang", PlayerStatus::Active, VerificationLevel::None, RiskLevel::Blacklist, 0, 3, 500.0, 0.0, 1_500.0, 1_100.0, 100.0),
        ("former_member", "Huang Li", PlayerStatus::Deleted, VerificationLevel::Email, RiskLevel::Low, 2, 61, 18_000.0, 17_500.0, 40_000.0, 39_600.0, 0.0),
    ];

    rows.into_iter()
        .enumerate()
        .map(
            |(
                index,
                (
                    username,
                    real_name,
                    status,
                    verification_level,
                    risk_level,
                    vip_level,
                    login_count,
                    total_deposit,
                    total_withdraw,
                    total_bet,
                    total_win,
                    balance,
                ),
            )| {
                let id = index as u64 + 1;
                let created_at = seed_time(index as i64 * 30);
                Player {
                    id,
                    player_id: format!("P{id:03}"),
                    username: username.to_string(),
                    email: format!("{username}@example.com"),
                    real_name: real_name.to_string(),
                    phone: format!("09{:08}", 12_345_678 + id),
                    language: "zh-TW".to_string(),
                    timezone: "Asia/Taipei".to_string(),
                    status,
                    verification_level,
                    risk_level,
                    vip_level,
                    last_login_at: (login_count > 0).then(|| created_at + Duration::days(90)),
                    login_count,
                    total_deposit,
                    total_withdraw,
                    total_bet,
                    total_win,
                    balance,
                    created_at,
                    updated_at: created_at + Duration::days(90),
                }
            },
        )
        .collect()
}

pub struct Api {
    simulator: Arc<Simulator>,
}

impl Api {
    pub fn new(simulator: Arc<Simulator>) -> Self {
        Self { simulator }
    }

    pub fn router(&self) -> Router {
        // Configure CORS
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

        let routes = Router::new()
            .route("/players", get(list_players))
            .route("/players/", get(list_players))
            .route("/players/:id", get(get_player))
            .route("/players/:id/balance", get(get_balance))
            .route("/players/:id/game-history", get(game_history))
            .route("/players/:id/status", put(update_status))
            .route("/players/:id/limits", put(set_limits))
            .route("/players/:id/balance/adjust", post(adjust_balance))
            .route("/players/:id/behavior-analysis", post(behavior_analysis))
            .route("/players/:id/game-preference", post(game_preference))
            .route("/players/:id/spending-habits", post(spending_habits))
            .route("/players/:id/value-score", post(value_score))
            .route("/auth/login", post(login))
            .route("/auth/logout", post(logout))
            .route("/auth/refresh", post(refresh));

        Router::new()
            .nest(API_PREFIX, routes)
            .layer(middleware::from_fn_with_state(
                self.simulator.clone(),
                observe_request,
            ))
            .layer(cors)
            .with_state(self.simulator.clone())
    }
}

async fn observe_request(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    request: Request,
    next: Next,
) -> Response {
    let (parts, request_body) = request.into_parts();
    let bytes = match body::to_bytes(request_body, usize::MAX).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(?err, "Failed to read request body");
            return StatusCode::BAD_REQUEST.into_response();
        }
    };
    let header_value = |name: header::HeaderName| {
        parts
            .headers
            .get(name)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    };
    let record = RequestRecord {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        authorization: header_value(header::AUTHORIZATION),
        content_type: header_value(header::CONTENT_TYPE),
        body_len: bytes.len(),
    };
    if simulator.observe(record) {
        tracing::warn!(path = %parts.uri.path(), "Injected failure");
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    }
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// Rows skipped before `page`; saturates instead of overflowing.
fn page_offset(page: u32, limit: u32) -> usize {
    let offset = u64::from(page.saturating_sub(1)).saturating_mul(u64::from(limit));
    usize::try_from(offset).unwrap_or(usize::MAX)
}

fn respond<T: Serialize>(result: Result<T, ApiFailure>, message: &str) -> Response {
    match result {
        Ok(data) => {
            let mut envelope = Envelope::ok_with_message(data, message);
            envelope.timestamp = Some(Utc::now().to_rfc3339());
            (StatusCode::OK, Json(envelope)).into_response()
        }
        Err(failure) => failure.into_response(),
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

async fn list_players(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Query(query): Query<ListQuery>,
) -> Response {
    respond(simulator.list_players(&query), "player list retrieved")
}

async fn get_player(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
) -> Response {
    respond(simulator.get_player(&id), "player retrieved")
}

async fn get_balance(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
) -> Response {
    respond(simulator.balance(&id), "balance retrieved")
}

async fn game_history(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Response {
    respond(simulator.game_history(&id, &query), "game history retrieved")
}

async fn update_status(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    Json(update): Json<StatusUpdate>,
) -> Response {
    respond(simulator.update_status(&id, update.status), "status updated")
}

async fn set_limits(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    Json(limits): Json<PlayerLimits>,
) -> Response {
    respond(simulator.set_limits(&id, limits), "limits updated")
}

async fn adjust_balance(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    Json(adjustment): Json<BalanceAdjustment>,
) -> Response {
    respond(simulator.adjust_balance(&id, &adjustment), "balance adjusted")
}

async fn behavior_analysis(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
) -> Response {
    respond(simulator.behavior_analysis(&id), "behavior analysis completed")
}

async fn game_preference(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
) -> Response {
    respond(simulator.game_preference(&id), "game preference analysis completed")
}

async fn spending_habits(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
) -> Response {
    respond(simulator.spending_habits(&id), "spending habits analysis completed")
}

async fn value_score(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Path(id): Path<String>,
    body: Bytes,
) -> Response {
    // The weight config is optional; an empty body uses the defaults
    let weights = if body.is_empty() {
        ScoreWeights::default()
    } else {
        match serde_json::from_slice::<Option<ScoreWeights>>(&body) {
            Ok(weights) => weights.unwrap_or_default(),
            Err(err) => return ApiFailure::validation(err.to_string()).into_response(),
        }
    };
    respond(simulator.value_score(&id, weights), "value score calculated")
}

async fn login(
    AxumState(simulator): AxumState<Arc<Simulator>>,
    Json(credentials): Json<Credentials>,
) -> Response {
    respond(simulator.login(&credentials), "login successful")
}

async fn logout(AxumState(simulator): AxumState<Arc<Simulator>>, headers: HeaderMap) -> Response {
    simulator.logout(bearer_token(&headers));
    respond(Ok::<_, ApiFailure>(Value::Null), "logout successful")
}

async fn refresh(AxumState(simulator): AxumState<Arc<Simulator>>, headers: HeaderMap) -> Response {
    respond(simulator.refresh(bearer_token(&headers)), "token refreshed")
}

#[cfg(test)]
mod tests;
