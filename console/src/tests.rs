use crate::{
    display::format_amount,
    pages::{
        mock_player, player_route, GameManagementPage, PlayerDetailPage, PlayersPage,
        WorkbenchComponent, WorkbenchPage,
    },
    views::{
        AdjustmentForm, DetailTab, FetchState, GameCatalogView, PlayerDetailView, PlayerListView,
        PointsManagementView, SearchForm, StatusManagementView, ValidationError,
    },
    Config, ConfigError,
};
use async_trait::async_trait;
use backoffice_client::{Error, PlayerApi, Result};
use backoffice_types::{
    AdjustmentType, BalanceAdjustment, Envelope, GameStatus, Pagination, PaginationParams, Player,
    PlayerLimits, PlayerPage, PlayerSearchParams, PlayerStatus, SortOrder,
};
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::{
    collections::HashSet,
    sync::{Arc, Mutex},
};

/// In-memory [PlayerApi] recording every call.
#[derive(Default)]
struct MockApi {
    players: Vec<Player>,
    calls: Mutex<Vec<&'static str>>,
    failing: HashSet<&'static str>,
    rejecting: HashSet<&'static str>,
    last_search: Mutex<Option<PlayerSearchParams>>,
}

impl MockApi {
    fn new() -> Self {
        let mut second = mock_player();
        second.id = 2;
        second.player_id = "P002".to_string();
        second.username = "lucky_dragon".to_string();
        Self {
            players: vec![mock_player(), second],
            ..Default::default()
        }
    }

    fn failing(mut self, call: &'static str) -> Self {
        self.failing.insert(call);
        self
    }

    /// `call` answers 200 with `success: false`.
    fn rejecting(mut self, call: &'static str) -> Self {
        self.rejecting.insert(call);
        self
    }

    fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    fn count(&self, call: &str) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    fn last_search(&self) -> Option<PlayerSearchParams> {
        self.last_search.lock().unwrap().clone()
    }

    fn respond<T>(&self, call: &'static str, data: T) -> Result<Envelope<T>> {
        self.calls.lock().unwrap().push(call);
        if self.failing.contains(call) {
            return Err(Error::Failed(StatusCode::INTERNAL_SERVER_ERROR));
        }
        if self.rejecting.contains(call) {
            return Ok(Envelope::failure(format!("{call} rejected"), "REJECTED"));
        }
        Ok(Envelope::ok(data))
    }

    fn find(&self, id: &str) -> Player {
        self.players
            .iter()
            .find(|p| p.player_id == id)
            .cloned()
            .unwrap_or_else(mock_player)
    }
}

#[async_trait]
impl PlayerApi for MockApi {
    async fn get_players(&self, params: &PlayerSearchParams) -> Result<Envelope<PlayerPage>> {
        *self.last_search.lock().unwrap() = Some(params.clone());
        let page = params.page.unwrap_or(1);
        let limit = params.limit.unwrap_or(20);
        self.respond(
            "get_players",
            PlayerPage {
                players: self.players.clone(),
                pagination: Pagination::new(page, limit, 45),
                ..Default::default()
            },
        )
    }

    async fn get_player(&self, id: &str) -> Result<Envelope<Player>> {
        self.respond("get_player", self.find(id))
    }

    async fn get_player_balance(&self, id: &str) -> Result<Envelope<Value>> {
        let balance = self.find(id).balance;
        self.respond("get_player_balance", json!({ "balance": balance }))
    }

    async fn get_player_game_history(
        &self,
        _id: &str,
        _params: &PaginationParams,
    ) -> Result<Envelope<Value>> {
        self.respond("get_player_game_history", json!({ "records": [] }))
    }

    async fn update_player_status(
        &self,
        _id: &str,
        status: PlayerStatus,
    ) -> Result<Envelope<Value>> {
        self.respond("update_player_status", json!({ "new_status": status }))
    }

    async fn set_player_limits(&self, _id: &str, limits: &PlayerLimits) -> Result<Envelope<Value>> {
        self.respond("set_player_limits", serde_json::to_value(limits).unwrap())
    }

    async fn adjust_player_balance(
        &self,
        _id: &str,
        adjustment: &BalanceAdjustment,
    ) -> Result<Envelope<Value>> {
        self.respond("adjust_player_balance", json!({ "amount": adjustment.amount }))
    }

    async fn get_player_behavior_analysis(&self, _id: &str) -> Result<Envelope<Value>> {
        self.respond("behavior_analysis", json!({ "activity_level": "low" }))
    }

    async fn get_player_game_preference(&self, _id: &str) -> Result<Envelope<Value>> {
        self.respond("game_preference", json!({ "favorite_game_type": "baccarat" }))
    }

    async fn get_player_spending_habits(&self, _id: &str) -> Result<Envelope<Value>> {
        self.respond("spending_habits", json!({ "spending_level": "low_value" }))
    }

    async fn calculate_player_value_score(
        &self,
        _id: &str,
        _config: Option<&Value>,
    ) -> Result<Envelope<Value>> {
        self.respond("value_score", json!({ "overall_score": 42.0 }))
    }
}

#[tokio::test]
async fn test_list_defaults_and_loading() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerListView::new(api.clone());
    assert_eq!(view.state(), &FetchState::Idle);

    view.load().await;
    let params = api.last_search().unwrap();
    assert_eq!(params.page, Some(1));
    assert_eq!(params.limit, Some(20));
    assert_eq!(params.sort.as_deref(), Some("created_at"));
    assert_eq!(params.order, Some(SortOrder::Desc));
    assert_eq!(view.players().len(), 2);
    assert_eq!(view.total(), 45);
    assert_eq!(view.total_pages(), 3);
}

#[tokio::test]
async fn test_list_sends_only_filled_fields() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerListView::new(api.clone());
    view.form.search = "  dragon ".to_string();
    view.form.min_balance = "1000".to_string();
    view.form.max_balance = "lots".to_string();
    view.load().await;

    let params = api.last_search().unwrap();
    assert_eq!(params.search.as_deref(), Some("dragon"));
    assert_eq!(params.min_balance, Some(1000.0));
    assert_eq!(params.max_balance, None);
    assert_eq!(params.start_date, None);
    assert_eq!(
        params.to_query_string(),
        "search=dragon&minBalance=1000&page=1&limit=20&sort=created_at&order=desc"
    );
}

#[tokio::test]
async fn test_list_sort_toggling() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerListView::new(api.clone());
    view.go_to_page(3).await;
    assert_eq!(view.page(), 3);

    // Default is created_at desc, so the same column starts ascending
    view.sort_by("created_at").await;
    assert_eq!(view.params().order, Some(SortOrder::Asc));
    assert_eq!(view.page(), 1);

    view.sort_by("created_at").await;
    assert_eq!(view.params().order, Some(SortOrder::Desc));

    view.sort_by("created_at").await;
    assert_eq!(view.params().order, Some(SortOrder::Asc));

    // A different column always starts ascending
    view.sort_by("balance").await;
    assert_eq!(view.params().sort.as_deref(), Some("balance"));
    assert_eq!(view.params().order, Some(SortOrder::Asc));

    view.toggle_sort("balance");
    view.toggle_sort("username");
    assert_eq!(view.params().order, Some(SortOrder::Asc));
    assert_eq!(api.count("get_players"), 5);
}

#[tokio::test]
async fn test_list_search_and_clear_reset_page() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerListView::new(api.clone());

    view.go_to_page(4).await;
    view.form.status = Some(PlayerStatus::Suspended);
    view.submit_search().await;
    assert_eq!(view.page(), 1);
    assert_eq!(
        api.last_search().unwrap().status,
        Some(PlayerStatus::Suspended)
    );

    view.go_to_page(2).await;
    view.clear().await;
    assert_eq!(view.page(), 1);
    assert_eq!(view.form, SearchForm::default());
    assert_eq!(api.last_search().unwrap().status, None);
}

#[tokio::test]
async fn test_list_unsuccessful_envelope_is_an_error() {
    let api = Arc::new(MockApi::new().rejecting("get_players"));
    let mut view = PlayerListView::new(api);
    view.load().await;
    assert_eq!(view.state().error(), Some("get_players rejected"));
    assert!(view.players().is_empty());
}

#[tokio::test]
async fn test_list_transport_failure_is_an_error() {
    let api = Arc::new(MockApi::new().failing("get_players"));
    let mut page = PlayersPage::new(api, 20);
    page.list_mut().load().await;
    let message = page.list().state().error().unwrap();
    assert!(message.starts_with("loading players failed"));
    assert!(page.render().contains("loading players failed"));
}

#[tokio::test]
async fn test_players_page_selects_detail_route() {
    let api = Arc::new(MockApi::new());
    let mut page = PlayersPage::new(api, 20);
    assert_eq!(page.select(0), None);
    page.list_mut().load().await;
    assert_eq!(page.select(1), Some("/players/P002".to_string()));
    assert_eq!(page.select(2), None);
    assert!(page.render().contains("lucky_dragon"));
}

#[tokio::test]
async fn test_detail_loads_concurrently_and_tabs_do_not_fetch() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerDetailView::new(api.clone(), "P001");
    view.load().await;

    let detail = view.state().data().unwrap();
    assert_eq!(detail.player.username, "testuser123");
    assert_eq!(detail.balance["balance"], 12_500.0);
    assert_eq!(api.calls().len(), 3);

    for tab in DetailTab::ALL {
        view.select_tab(tab);
    }
    assert_eq!(view.tab(), DetailTab::Analysis);
    assert_eq!(api.calls().len(), 3);
}

#[tokio::test]
async fn test_detail_fails_when_any_call_fails() {
    let api = Arc::new(MockApi::new().failing("get_player_balance"));
    let mut view = PlayerDetailView::new(api, "P001");
    view.load().await;
    assert!(view.state().error().unwrap().starts_with("loading player failed"));
    assert!(view.player().is_none());
}

#[tokio::test]
async fn test_detail_surfaces_rejected_balance_and_history() {
    let api = Arc::new(MockApi::new().rejecting("get_player_balance"));
    let mut view = PlayerDetailView::new(api, "P001");
    view.load().await;
    assert_eq!(view.state().error(), Some("get_player_balance rejected"));
    assert!(view.player().is_none());

    let api = Arc::new(MockApi::new().rejecting("get_player_game_history"));
    let mut view = PlayerDetailView::new(api, "P001");
    view.load().await;
    assert_eq!(view.state().error(), Some("get_player_game_history rejected"));
}

#[tokio::test]
async fn test_detail_reloads_on_new_id_only() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerDetailView::new(api.clone(), "P001");
    view.load().await;
    view.set_player_id("P001").await;
    assert_eq!(api.count("get_player"), 1);

    view.set_player_id("P002").await;
    assert_eq!(api.count("get_player"), 2);
    assert_eq!(view.player().unwrap().username, "lucky_dragon");
}

#[tokio::test]
async fn test_analysis_renders_successful_panels() {
    let api = Arc::new(
        MockApi::new()
            .failing("game_preference")
            .failing("value_score"),
    );
    let mut page = PlayerDetailPage::new(api.clone(), "P001");
    page.load().await;
    let view = page.view_mut().unwrap();
    view.select_tab(DetailTab::Analysis);
    assert!(view.load_analysis().await);

    let titles: Vec<&str> = view
        .analysis_panels()
        .iter()
        .map(|(title, _)| *title)
        .collect();
    assert_eq!(titles, vec!["Behavior analysis", "Spending habits"]);

    let rendered = page.render();
    assert!(rendered.contains("Behavior analysis"));
    assert!(rendered.contains("Spending habits"));
    assert!(!rendered.contains("Game preference\n"));
    assert!(!rendered.contains("Value score"));
}

#[tokio::test]
async fn test_analysis_is_not_reentered_while_loading() {
    let api = Arc::new(MockApi::new());
    let mut view = PlayerDetailView::new(api.clone(), "P001");
    assert!(view.begin_analysis());
    assert!(!view.load_analysis().await);
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_detail_page_without_id() {
    let api = Arc::new(MockApi::new());
    let mut page = PlayerDetailPage::new(api.clone(), "  ");
    page.load().await;
    assert!(page.view().is_none());
    let rendered = page.render();
    assert!(rendered.contains("Missing player id"));
    assert!(rendered.contains("/players"));
    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_detail_page_breadcrumb() {
    let api = Arc::new(MockApi::new());
    let mut page = PlayerDetailPage::new(api, "P002");
    assert_eq!(page.breadcrumb(), "Players / P002");
    page.load().await;
    assert_eq!(page.breadcrumb(), "Players / lucky_dragon");
}

#[test]
fn test_points_preview() {
    let api = Arc::new(MockApi::new());
    let mut view = PointsManagementView::new(api, &mock_player(), "admin");
    assert_eq!(view.preview(), None);

    view.form.amount = 500.0;
    assert_eq!(view.preview(), Some(13_000.0));

    view.form.amount = 2_000.0;
    view.form.kind = AdjustmentType::Subtract;
    assert_eq!(view.preview(), Some(10_500.0));

    view.form.amount = -5.0;
    assert_eq!(view.preview(), None);
}

#[tokio::test]
async fn test_points_validation_makes_no_call() {
    let api = Arc::new(MockApi::new());
    let mut view = PointsManagementView::new(api.clone(), &mock_player(), "admin");

    view.form.amount = 0.0;
    view.form.reason = "Event bonus".to_string();
    assert_eq!(view.submit().await, None);
    assert_eq!(view.error(), Some("amount must be greater than 0"));

    view.form.amount = 100.0;
    view.form.reason = "   ".to_string();
    assert_eq!(view.submit().await, None);
    assert_eq!(
        view.form.validate(),
        Err(ValidationError::MissingAdjustmentReason)
    );
    assert_eq!(view.error(), Some("an adjustment reason is required"));

    assert!(api.calls().is_empty());
    assert_eq!(view.balance(), 12_500.0);
}

#[tokio::test]
async fn test_points_submit_updates_balance_and_history() {
    let api = Arc::new(MockApi::new());
    let mut view = PointsManagementView::new(api.clone(), &mock_player(), "ops");
    view.form.amount = 500.0;
    view.form.reason = "Event bonus".to_string();

    assert_eq!(view.submit().await, Some(13_000.0));
    assert_eq!(view.balance(), 13_000.0);
    assert_eq!(view.form, AdjustmentForm::default());
    assert!(view.error().is_none());

    let record = &view.history()[0];
    assert_eq!(record.balance_before, 12_500.0);
    assert_eq!(record.balance_after, 13_000.0);
    assert_eq!(record.kind, "add");
    assert_eq!(record.admin_user, "ops");
    assert_eq!(api.count("adjust_player_balance"), 1);
}

#[tokio::test]
async fn test_points_rejected_keeps_balance() {
    let api = Arc::new(MockApi::new().rejecting("adjust_player_balance"));
    let mut view = PointsManagementView::new(api, &mock_player(), "admin");
    view.form.amount = 500.0;
    view.form.reason = "Event bonus".to_string();

    assert_eq!(view.submit().await, None);
    assert_eq!(view.balance(), 12_500.0);
    assert_eq!(view.error(), Some("adjust_player_balance rejected"));
    assert!(view.history().is_empty());
    assert_eq!(view.form.amount, 500.0);
}

#[tokio::test]
async fn test_status_validation_makes_no_call() {
    let api = Arc::new(MockApi::new());
    let mut view = StatusManagementView::new(api.clone(), mock_player(), "admin");

    view.reason = "Suspicious activity".to_string();
    assert_eq!(view.submit_status().await, None);
    assert_eq!(view.validate(), Err(ValidationError::UnchangedStatus));

    view.selected = PlayerStatus::Suspended;
    view.reason.clear();
    assert_eq!(view.submit_status().await, None);
    assert_eq!(view.validate(), Err(ValidationError::MissingStatusReason));

    assert!(api.calls().is_empty());
}

#[tokio::test]
async fn test_status_submit_records_history() {
    let api = Arc::new(MockApi::new());
    let mut view = StatusManagementView::new(api.clone(), mock_player(), "admin");
    view.selected = PlayerStatus::Suspended;
    view.reason = "Suspicious activity".to_string();

    let player = view.submit_status().await.unwrap();
    assert_eq!(player.status, PlayerStatus::Suspended);
    assert_eq!(view.player().status, PlayerStatus::Suspended);
    assert!(view.reason.is_empty());
    let record = &view.history()[0];
    assert_eq!(record.old_status, PlayerStatus::Active);
    assert_eq!(record.new_status, PlayerStatus::Suspended);
    assert_eq!(record.reason, "Suspicious activity");
}

#[tokio::test]
async fn test_limits_are_sent_unvalidated() {
    let api = Arc::new(MockApi::new());
    let mut view = StatusManagementView::new(api.clone(), mock_player(), "admin");
    view.limits.loss_limit = Some(-10.0);
    assert!(view.submit_limits().await);
    assert_eq!(api.count("set_player_limits"), 1);
    assert_eq!(view.message(), Some("limits updated"));

    let api = Arc::new(MockApi::new().failing("set_player_limits"));
    let mut view = StatusManagementView::new(api, mock_player(), "admin");
    assert!(!view.submit_limits().await);
    assert!(view.error().unwrap().starts_with("updating limits failed"));
}

#[test]
fn test_catalog_toggle_and_stats() {
    let mut view = GameCatalogView::default();
    let stats = view.stats();
    assert_eq!(stats.total_games, 3);
    assert_eq!(stats.active_games, 2);
    assert_eq!(stats.total_players, 245);
    assert_eq!(stats.total_revenue, 221_000.0);

    assert_eq!(view.toggle_status(1), Some(GameStatus::Inactive));
    assert_eq!(view.toggle_status(1), Some(GameStatus::Active));
    // Maintenance goes straight to active
    assert_eq!(view.toggle_status(3), Some(GameStatus::Active));
    assert_eq!(view.stats().active_games, 3);
    assert_eq!(view.toggle_status(99), None);

    let page = GameManagementPage::new();
    assert!(page.render().contains("Texas Hold'em"));
}

#[tokio::test]
async fn test_workbench_propagates_updates() {
    let api = Arc::new(MockApi::new());
    let mut page = WorkbenchPage::new(api.clone(), "admin");
    assert_eq!(page.selected().balance, 12_500.0);

    page.switch_to(WorkbenchComponent::Points);
    page.points_mut().form.amount = 500.0;
    page.points_mut().form.reason = "Event bonus".to_string();
    assert_eq!(page.submit_points().await, Some(13_000.0));
    assert_eq!(page.selected().balance, 13_000.0);
    assert_eq!(page.status_mut().player().balance, 13_000.0);

    page.switch_to(WorkbenchComponent::Status);
    page.status_mut().selected = PlayerStatus::Inactive;
    page.status_mut().reason = "Player request".to_string();
    assert_eq!(page.submit_status().await, Some(PlayerStatus::Inactive));
    assert_eq!(page.selected().status, PlayerStatus::Inactive);
    assert!(page.render().contains("[status]"));
    // Switching components never fetches
    assert_eq!(api.calls(), vec!["adjust_player_balance", "update_player_status"]);
}

#[tokio::test]
async fn test_workbench_detail_load_refreshes_selection() {
    let api = Arc::new(MockApi::new());
    let mut page = WorkbenchPage::new(api.clone(), "admin");
    let mut stale = mock_player();
    stale.balance = 1.0;
    page.select_player(stale).await;
    assert_eq!(page.selected().balance, 1.0);
    assert_eq!(api.count("get_player"), 0);

    page.switch_to(WorkbenchComponent::Detail);
    page.load().await;
    assert_eq!(api.count("get_player"), 1);
    assert_eq!(page.selected().balance, 12_500.0);
    assert_eq!(page.points_mut().balance(), 12_500.0);
    assert_eq!(page.status_mut().player().balance, 12_500.0);
}

#[tokio::test]
async fn test_workbench_selects_list_row() {
    let api = Arc::new(MockApi::new());
    let mut page = WorkbenchPage::new(api.clone(), "admin");
    assert!(!page.select_row(0).await);

    page.load().await;
    assert!(page.select_row(1).await);
    assert_eq!(page.selected().player_id, "P002");
    assert_eq!(page.points_mut().player_id(), "P002");
    assert_eq!(api.count("get_player"), 1);
}

#[test]
fn test_route_and_amount_formatting() {
    assert_eq!(player_route("P001"), "/players/P001");
    assert_eq!(format_amount(12_500.0), "12,500.00");
    assert_eq!(format_amount(1_234_567.891), "1,234,567.89");
    assert_eq!(format_amount(-999.5), "-999.50");
    assert_eq!(format_amount(0.0), "0.00");
}

#[test]
fn test_config_defaults_and_overrides() {
    let config = Config::from_yaml("", std::path::Path::new("config.yaml")).unwrap();
    assert_eq!(config, Config::default());

    let mut config = Config::from_yaml(
        "api_url: http://backend:9000/api/v1\npage_size: 50\n",
        std::path::Path::new("config.yaml"),
    )
    .unwrap();
    assert_eq!(config.page_size, 50);
    assert_eq!(config.log_level, "info");

    // Environment then flag
    config.override_api_url(Some("http://env/api/v1".to_string()), None);
    assert_eq!(config.api_url, "http://env/api/v1");
    config.override_api_url(
        Some("http://env/api/v1".to_string()),
        Some("https://flag/api/v1".to_string()),
    );
    assert_eq!(config.api_url, "https://flag/api/v1");

    let validated = config.validate().unwrap();
    assert_eq!(validated.api_url.as_str(), "https://flag/api/v1");
    assert_eq!(validated.page_size, 50);
    assert!(validated.session_file.ends_with("session.json"));
}

#[test]
fn test_config_validation_errors() {
    let config = Config {
        timeout_secs: 0,
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidNonZero {
            field: "timeout_secs",
            ..
        })
    ));

    let config = Config {
        api_url: "ftp://example.com".to_string(),
        ..Config::default()
    };
    assert_eq!(
        config.validate().err().unwrap().to_string(),
        "invalid URL scheme: ftp (expected http or https)"
    );

    let config = Config {
        log_level: "chatty".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        config.validate(),
        Err(ConfigError::InvalidLogLevel { .. })
    ));

    let err = Config::from_yaml("page_size: [", std::path::Path::new("bad.yaml")).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
}

#[test]
fn test_config_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(
        &path,
        "session_file: /tmp/backoffice-session.json\nlog_level: debug\n",
    )
    .unwrap();

    let config = Config::load(Some(&path)).unwrap().validate().unwrap();
    assert_eq!(config.log_level, tracing::Level::DEBUG);
    assert_eq!(
        config.session_file,
        std::path::PathBuf::from("/tmp/backoffice-session.json")
    );

    let missing = dir.path().join("missing.yaml");
    assert!(matches!(
        Config::load(Some(&missing)),
        Err(ConfigError::Read { .. })
    ));
}
