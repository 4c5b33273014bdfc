use crate::{HttpClient, Result};
use async_trait::async_trait;
use backoffice_types::{
    with_query, BalanceAdjustment, Envelope, PaginationParams, Player, PlayerLimits, PlayerPage,
    PlayerSearchParams, PlayerStatus, StatusUpdate,
};
use serde_json::Value;

/// Typed player operations offered by a backend.
///
/// Each call is a single request: no validation, no retries and no
/// idempotency keys (submitting the same adjustment twice applies it twice).
#[async_trait]
pub trait PlayerApi: Send + Sync {
    async fn get_players(&self, params: &PlayerSearchParams) -> Result<Envelope<PlayerPage>>;

    async fn get_player(&self, id: &str) -> Result<Envelope<Player>>;

    async fn get_player_balance(&self, id: &str) -> Result<Envelope<Value>>;

    async fn get_player_game_history(
        &self,
        id: &str,
        params: &PaginationParams,
    ) -> Result<Envelope<Value>>;

    async fn update_player_status(&self, id: &str, status: PlayerStatus)
        -> Result<Envelope<Value>>;

    async fn set_player_limits(&self, id: &str, limits: &PlayerLimits) -> Result<Envelope<Value>>;

    async fn adjust_player_balance(
        &self,
        id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Envelope<Value>>;

    async fn get_player_behavior_analysis(&self, id: &str) -> Result<Envelope<Value>>;

    async fn get_player_game_preference(&self, id: &str) -> Result<Envelope<Value>>;

    async fn get_player_spending_habits(&self, id: &str) -> Result<Envelope<Value>>;

    async fn calculate_player_value_score(
        &self,
        id: &str,
        config: Option<&Value>,
    ) -> Result<Envelope<Value>>;
}

/// [PlayerApi] for the `/api/v1` REST backend.
#[derive(Clone)]
pub struct HttpPlayerApi {
    http: HttpClient,
}

impl HttpPlayerApi {
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

#[async_trait]
impl PlayerApi for HttpPlayerApi {
    async fn get_players(&self, params: &PlayerSearchParams) -> Result<Envelope<PlayerPage>> {
        let endpoint = with_query("/players/", &params.to_query_string());
        self.http.get(&endpoint).await
    }

    async fn get_player(&self, id: &str) -> Result<Envelope<Player>> {
        self.http.get(&format!("/players/{id}")).await
    }

    async fn get_player_balance(&self, id: &str) -> Result<Envelope<Value>> {
        self.http.get(&format!("/players/{id}/balance")).await
    }

    async fn get_player_game_history(
        &self,
        id: &str,
        params: &PaginationParams,
    ) -> Result<Envelope<Value>> {
        let endpoint = with_query(
            &format!("/players/{id}/game-history"),
            &params.to_query_string(),
        );
        self.http.get(&endpoint).await
    }

    async fn update_player_status(
        &self,
        id: &str,
        status: PlayerStatus,
    ) -> Result<Envelope<Value>> {
        self.http
            .put(&format!("/players/{id}/status"), Some(&StatusUpdate { status }))
            .await
    }

    async fn set_player_limits(&self, id: &str, limits: &PlayerLimits) -> Result<Envelope<Value>> {
        self.http
            .put(&format!("/players/{id}/limits"), Some(limits))
            .await
    }

    async fn adjust_player_balance(
        &self,
        id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Envelope<Value>> {
        self.http
            .post(&format!("/players/{id}/balance/adjust"), Some(adjustment))
            .await
    }

    async fn get_player_behavior_analysis(&self, id: &str) -> Result<Envelope<Value>> {
        self.http
            .post_empty(&format!("/players/{id}/behavior-analysis"))
            .await
    }

    async fn get_player_game_preference(&self, id: &str) -> Result<Envelope<Value>> {
        self.http
            .post_empty(&format!("/players/{id}/game-preference"))
            .await
    }

    async fn get_player_spending_habits(&self, id: &str) -> Result<Envelope<Value>> {
        self.http
            .post_empty(&format!("/players/{id}/spending-habits"))
            .await
    }

    async fn calculate_player_value_score(
        &self,
        id: &str,
        config: Option<&Value>,
    ) -> Result<Envelope<Value>> {
        self.http
            .post(&format!("/players/{id}/value-score"), config)
            .await
    }
}
