use super::{request_failed, FetchState};
use backoffice_client::{load_analysis, AnalysisData, PlayerApi};
use backoffice_types::{PaginationParams, ParseVariantError, Player};
use serde_json::Value;
use std::{fmt, str::FromStr, sync::Arc};
use tracing::{debug, info};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum DetailTab {
    #[default]
    Basic,
    Account,
    Financial,
    Analysis,
}

impl DetailTab {
    pub const ALL: [DetailTab; 4] = [
        DetailTab::Basic,
        DetailTab::Account,
        DetailTab::Financial,
        DetailTab::Analysis,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DetailTab::Basic => "basic",
            DetailTab::Account => "account",
            DetailTab::Financial => "financial",
            DetailTab::Analysis => "analysis",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::Basic => "Basic info",
            DetailTab::Account => "Account",
            DetailTab::Financial => "Financial",
            DetailTab::Analysis => "Analysis",
        }
    }
}

impl fmt::Display for DetailTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DetailTab {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DetailTab::ALL
            .into_iter()
            .find(|tab| tab.as_str() == s)
            .ok_or_else(|| ParseVariantError {
                kind: "detail tab",
                value: s.to_string(),
            })
    }
}

/// Everything the detail view loads up front.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerDetail {
    pub player: Player,
    pub balance: Value,
    pub game_history: Value,
}

/// One player's record, balance and game history, split into tabs.
pub struct PlayerDetailView<A> {
    api: Arc<A>,
    player_id: String,
    tab: DetailTab,
    history_params: PaginationParams,
    state: FetchState<PlayerDetail>,
    analysis: FetchState<AnalysisData>,
}

impl<A: PlayerApi> PlayerDetailView<A> {
    pub fn new(api: Arc<A>, player_id: impl Into<String>) -> Self {
        Self {
            api,
            player_id: player_id.into(),
            tab: DetailTab::default(),
            history_params: PaginationParams {
                page: Some(1),
                limit: Some(10),
                ..Default::default()
            },
            state: FetchState::Idle,
            analysis: FetchState::Idle,
        }
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn tab(&self) -> DetailTab {
        self.tab
    }

    pub fn state(&self) -> &FetchState<PlayerDetail> {
        &self.state
    }

    pub fn analysis(&self) -> &FetchState<AnalysisData> {
        &self.analysis
    }

    pub fn player(&self) -> Option<&Player> {
        self.state.data().map(|detail| &detail.player)
    }

    pub fn history_params_mut(&mut self) -> &mut PaginationParams {
        &mut self.history_params
    }

    /// Switching tabs never fetches.
    pub fn select_tab(&mut self, tab: DetailTab) {
        self.tab = tab;
    }

    /// Replaces the loaded player with a copy updated elsewhere.
    pub fn update_player(&mut self, player: Player) {
        if let Some(detail) = self.state.data_mut() {
            if detail.player.player_id == player.player_id {
                detail.player = player;
            }
        }
    }

    /// Points the view at another player, reloading when the id changed.
    pub async fn set_player_id(&mut self, player_id: &str) {
        if self.player_id == player_id {
            return;
        }
        self.player_id = player_id.to_string();
        self.analysis = FetchState::Idle;
        self.load().await
    }

    pub async fn load(&mut self) {
        debug!(player_id = %self.player_id, "Loading player detail");
        self.state = FetchState::Loading;
        let id = self.player_id.as_str();
        let result = futures::try_join!(
            self.api.get_player(id),
            self.api.get_player_balance(id),
            self.api.get_player_game_history(id, &self.history_params),
        );
        self.state = match result {
            Ok((player, balance, game_history)) => {
                let detail = player.into_data("player not found").and_then(|player| {
                    Ok(PlayerDetail {
                        player,
                        balance: balance.into_data("balance unavailable")?,
                        game_history: game_history.into_data("game history unavailable")?,
                    })
                });
                match detail {
                    Ok(detail) => FetchState::Loaded(detail),
                    Err(message) => FetchState::Failed(message),
                }
            }
            Err(err) => FetchState::Failed(request_failed("loading player", &err)),
        };
    }

    pub async fn reload(&mut self) {
        self.load().await
    }

    /// Marks analysis as loading. Returns `false` if it already was.
    pub fn begin_analysis(&mut self) -> bool {
        if self.analysis.is_loading() {
            return false;
        }
        self.analysis = FetchState::Loading;
        true
    }

    /// Runs the four analytics calls. Ignored while a previous run is in flight.
    pub async fn load_analysis(&mut self) -> bool {
        if !self.begin_analysis() {
            debug!(player_id = %self.player_id, "Analysis already loading");
            return false;
        }
        let data = load_analysis(self.api.as_ref(), &self.player_id).await;
        info!(
            player_id = %self.player_id,
            panels = data.panels().len(),
            "Analysis loaded"
        );
        self.analysis = FetchState::Loaded(data);
        true
    }

    pub fn analysis_panels(&self) -> Vec<(&'static str, &Value)> {
        self.analysis
            .data()
            .map(AnalysisData::panels)
            .unwrap_or_default()
    }
}
