//! Route-level containers composing the views.

use crate::{
    display::{
        card, format_amount, game_status_badge, json_block, risk_badge, status_badge, table,
    },
    views::{
        DetailTab, FetchState, GameCatalogView, PlayerDetailView, PlayerListView,
        PointsManagementView, StatusManagementView,
    },
};
use backoffice_client::PlayerApi;
use backoffice_types::{Player, PlayerStatus, RiskLevel, VerificationLevel};
use chrono::{DateTime, Utc};
use colored::*;
use std::{fmt, fmt::Write, str::FromStr, sync::Arc};

pub const PLAYERS_ROUTE: &str = "/players";

pub fn player_route(player_id: &str) -> String {
    format!("{PLAYERS_ROUTE}/{player_id}")
}

fn date(value: &DateTime<Utc>) -> String {
    value.format("%Y-%m-%d %H:%M").to_string()
}

fn error_line(message: &str) -> String {
    format!("{} {}\n", "✗".bright_red(), message.bright_red())
}

fn notice(message: Option<&str>, error: Option<&str>) -> String {
    let mut out = String::new();
    if let Some(message) = message {
        let _ = writeln!(out, "{} {}", "✓".bright_green(), message);
    }
    if let Some(error) = error {
        out.push_str(&error_line(error));
    }
    out
}

pub fn render_player_table(players: &[Player]) -> String {
    let rows: Vec<Vec<String>> = players
        .iter()
        .map(|player| {
            vec![
                player.player_id.clone(),
                player.username.clone(),
                player.email.clone(),
                player.status.label().to_string(),
                player.risk_level.label().to_string(),
                player.vip_level.to_string(),
                format_amount(player.balance),
                date(&player.created_at),
            ]
        })
        .collect();
    table(
        &[
            "ID", "Username", "Email", "Status", "Risk", "VIP", "Balance", "Created",
        ],
        &rows,
    )
}

pub fn render_player_tab(player: &Player, tab: DetailTab) -> String {
    let rows = match tab {
        DetailTab::Basic => vec![
            ("Player ID", player.player_id.clone()),
            ("Username", player.username.clone()),
            ("Email", player.email.clone()),
            ("Real name", player.real_name.clone()),
            ("Phone", player.phone.clone()),
            ("Language", player.language.clone()),
            ("Timezone", player.timezone.clone()),
        ],
        DetailTab::Account => vec![
            ("Status", status_badge(player.status).to_string()),
            (
                "Verification",
                player.verification_level.label().to_string(),
            ),
            ("Risk", risk_badge(player.risk_level).to_string()),
            ("VIP level", player.vip_level.to_string()),
            (
                "Last login",
                player
                    .last_login_at
                    .as_ref()
                    .map(date)
                    .unwrap_or_else(|| "never".to_string()),
            ),
            ("Login count", player.login_count.to_string()),
            ("Created", date(&player.created_at)),
            ("Updated", date(&player.updated_at)),
        ],
        DetailTab::Financial => vec![
            ("Balance", format_amount(player.balance)),
            ("Total deposit", format_amount(player.total_deposit)),
            ("Total withdraw", format_amount(player.total_withdraw)),
            ("Net deposit", format_amount(player.net_deposit())),
            ("Total bet", format_amount(player.total_bet)),
            ("Total win", format_amount(player.total_win)),
            ("Net win/loss", format_amount(player.net_win())),
        ],
        DetailTab::Analysis => return String::new(),
    };
    card(tab.label(), &rows)
}

/// Player list route.
pub struct PlayersPage<A> {
    list: PlayerListView<A>,
}

impl<A: PlayerApi> PlayersPage<A> {
    pub fn new(api: Arc<A>, page_size: u32) -> Self {
        Self {
            list: PlayerListView::with_page_size(api, page_size),
        }
    }

    pub fn list(&self) -> &PlayerListView<A> {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut PlayerListView<A> {
        &mut self.list
    }

    /// Detail route of the row at `index`.
    pub fn select(&self, index: usize) -> Option<String> {
        self.list
            .players()
            .get(index)
            .map(|player| player_route(&player.player_id))
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{}", "Players".bright_white().bold());
        match self.list.state() {
            FetchState::Idle => out.push_str("Not loaded\n"),
            FetchState::Loading => out.push_str("Loading...\n"),
            FetchState::Failed(message) => out.push_str(&error_line(message)),
            FetchState::Loaded(_) if self.list.players().is_empty() => {
                out.push_str("No players match the current filters\n")
            }
            FetchState::Loaded(_) => {
                out.push_str(&render_player_table(self.list.players()));
                let _ = writeln!(
                    out,
                    "Page {} of {} ({} players)",
                    self.list.page(),
                    self.list.total_pages().max(1),
                    self.list.total()
                );
            }
        }
        out
    }
}

/// Player detail route. An empty id has nothing to load.
pub struct PlayerDetailPage<A> {
    view: Option<PlayerDetailView<A>>,
}

impl<A: PlayerApi> PlayerDetailPage<A> {
    pub fn new(api: Arc<A>, player_id: &str) -> Self {
        let player_id = player_id.trim();
        Self {
            view: (!player_id.is_empty()).then(|| PlayerDetailView::new(api, player_id)),
        }
    }

    pub fn view(&self) -> Option<&PlayerDetailView<A>> {
        self.view.as_ref()
    }

    pub fn view_mut(&mut self) -> Option<&mut PlayerDetailView<A>> {
        self.view.as_mut()
    }

    pub async fn load(&mut self) {
        if let Some(view) = self.view.as_mut() {
            view.load().await;
        }
    }

    pub fn breadcrumb(&self) -> String {
        let current = self.view.as_ref().map(|view| {
            view.player()
                .map(|player| player.username.as_str())
                .unwrap_or(view.player_id())
        });
        match current {
            Some(current) => format!("Players / {current}"),
            None => "Players".to_string(),
        }
    }

    pub fn render(&self) -> String {
        let Some(view) = self.view.as_ref() else {
            return format!("Missing player id\nBack to player list: {PLAYERS_ROUTE}\n");
        };

        let mut out = String::new();
        let _ = writeln!(out, "{}", self.breadcrumb().bright_black());
        match view.state() {
            FetchState::Idle => out.push_str("Not loaded\n"),
            FetchState::Loading => out.push_str("Loading...\n"),
            FetchState::Failed(message) => out.push_str(&error_line(message)),
            FetchState::Loaded(detail) => {
                let tabs: Vec<String> = DetailTab::ALL
                    .iter()
                    .map(|tab| {
                        if *tab == view.tab() {
                            format!("[{}]", tab.label()).bold().to_string()
                        } else {
                            tab.label().to_string()
                        }
                    })
                    .collect();
                let _ = writeln!(out, "{}", tabs.join(" | "));
                if view.tab() == DetailTab::Analysis {
                    out.push_str(&render_analysis(view));
                } else {
                    out.push_str(&render_player_tab(&detail.player, view.tab()));
                }
                if view.tab() == DetailTab::Financial {
                    let _ = writeln!(out, "Balance\n{}", json_block(&detail.balance));
                    let _ = writeln!(out, "Game history\n{}", json_block(&detail.game_history));
                }
            }
        }
        out
    }
}

fn render_analysis<A: PlayerApi>(view: &PlayerDetailView<A>) -> String {
    let mut out = String::new();
    match view.analysis() {
        FetchState::Idle => out.push_str("Analysis not loaded\n"),
        FetchState::Loading => out.push_str("Analyzing...\n"),
        FetchState::Failed(message) => out.push_str(&error_line(message)),
        FetchState::Loaded(_) => {
            let panels = view.analysis_panels();
            if panels.is_empty() {
                out.push_str("No analysis data available\n");
            }
            for (title, value) in panels {
                let _ = writeln!(
                    out,
                    "{}\n{}",
                    title.bright_white().bold(),
                    json_block(value)
                );
            }
        }
    }
    out
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum WorkbenchComponent {
    #[default]
    List,
    Detail,
    Points,
    Status,
}

impl WorkbenchComponent {
    pub const ALL: [WorkbenchComponent; 4] = [
        WorkbenchComponent::List,
        WorkbenchComponent::Detail,
        WorkbenchComponent::Points,
        WorkbenchComponent::Status,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WorkbenchComponent::List => "list",
            WorkbenchComponent::Detail => "detail",
            WorkbenchComponent::Points => "points",
            WorkbenchComponent::Status => "status",
        }
    }
}

impl fmt::Display for WorkbenchComponent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorkbenchComponent {
    type Err = backoffice_types::ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WorkbenchComponent::ALL
            .into_iter()
            .find(|c| c.as_str() == s)
            .ok_or_else(|| backoffice_types::ParseVariantError {
                kind: "component",
                value: s.to_string(),
            })
    }
}

/// Player the workbench starts with.
pub fn mock_player() -> Player {
    let created_at = DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default();
    Player {
        id: 1,
        player_id: "P001".to_string(),
        username: "testuser123".to_string(),
        email: "testuser123@example.com".to_string(),
        real_name: "Test Player".to_string(),
        phone: "0912345679".to_string(),
        language: "zh-TW".to_string(),
        timezone: "Asia/Taipei".to_string(),
        status: PlayerStatus::Active,
        verification_level: VerificationLevel::Email,
        risk_level: RiskLevel::Low,
        vip_level: 1,
        last_login_at: Some(created_at),
        login_count: 42,
        total_deposit: 50_000.0,
        total_withdraw: 25_000.0,
        total_bet: 100_000.0,
        total_win: 85_000.0,
        balance: 12_500.0,
        created_at,
        updated_at: created_at,
    }
}

/// Every component side by side around one shared player.
///
/// Balance and status changes made by a child view are copied into the
/// shared player and from there into the other views.
pub struct WorkbenchPage<A> {
    selected: Player,
    component: WorkbenchComponent,
    list: PlayerListView<A>,
    detail: PlayerDetailView<A>,
    points: PointsManagementView<A>,
    status: StatusManagementView<A>,
}

impl<A: PlayerApi> WorkbenchPage<A> {
    pub fn new(api: Arc<A>, admin_user: &str) -> Self {
        Self::with_player(api, mock_player(), admin_user)
    }

    pub fn with_player(api: Arc<A>, player: Player, admin_user: &str) -> Self {
        Self {
            list: PlayerListView::new(api.clone()),
            detail: PlayerDetailView::new(api.clone(), player.player_id.clone()),
            points: PointsManagementView::new(api.clone(), &player, admin_user),
            status: StatusManagementView::new(api, player.clone(), admin_user),
            selected: player,
            component: WorkbenchComponent::default(),
        }
    }

    pub fn selected(&self) -> &Player {
        &self.selected
    }

    pub fn component(&self) -> WorkbenchComponent {
        self.component
    }

    pub fn switch_to(&mut self, component: WorkbenchComponent) {
        self.component = component;
    }

    pub fn list_mut(&mut self) -> &mut PlayerListView<A> {
        &mut self.list
    }

    pub fn detail_mut(&mut self) -> &mut PlayerDetailView<A> {
        &mut self.detail
    }

    pub fn points_mut(&mut self) -> &mut PointsManagementView<A> {
        &mut self.points
    }

    pub fn status_mut(&mut self) -> &mut StatusManagementView<A> {
        &mut self.status
    }

    /// Makes `player` the shared selection.
    pub async fn select_player(&mut self, player: Player) {
        self.points.set_player(&player);
        self.status.set_player(player.clone());
        self.detail.set_player_id(&player.player_id).await;
        self.selected = player;
    }

    /// Selects the list row at `index`.
    pub async fn select_row(&mut self, index: usize) -> bool {
        let Some(player) = self.list.players().get(index).cloned() else {
            return false;
        };
        self.select_player(player).await;
        true
    }

    pub async fn submit_points(&mut self) -> Option<f64> {
        let balance = self.points.submit().await?;
        self.selected.balance = balance;
        self.status.set_player(self.selected.clone());
        self.detail.update_player(self.selected.clone());
        Some(balance)
    }

    pub async fn submit_status(&mut self) -> Option<PlayerStatus> {
        let player = self.status.submit_status().await?;
        self.selected.status = player.status;
        self.points.set_player(&self.selected);
        self.detail.update_player(self.selected.clone());
        Some(player.status)
    }

    pub async fn load(&mut self) {
        match self.component {
            WorkbenchComponent::List => self.list.load().await,
            WorkbenchComponent::Detail => {
                self.detail.load().await;
                // Freshly loaded record replaces the shared selection
                if let Some(player) = self.detail.player().cloned() {
                    self.points.set_player(&player);
                    self.status.set_player(player.clone());
                    self.selected = player;
                }
            }
            WorkbenchComponent::Points | WorkbenchComponent::Status => {}
        }
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        let switcher: Vec<String> = WorkbenchComponent::ALL
            .iter()
            .map(|c| {
                if *c == self.component {
                    format!("[{c}]").bold().to_string()
                } else {
                    c.to_string()
                }
            })
            .collect();
        let _ = writeln!(out, "{}", switcher.join(" | "));
        let _ = writeln!(
            out,
            "Selected: {} ({}) balance {} status {}",
            self.selected.username,
            self.selected.player_id,
            format_amount(self.selected.balance),
            status_badge(self.selected.status)
        );

        match self.component {
            WorkbenchComponent::List => match self.list.state() {
                FetchState::Failed(message) => out.push_str(&error_line(message)),
                _ => out.push_str(&render_player_table(self.list.players())),
            },
            WorkbenchComponent::Detail => match self.detail.state() {
                FetchState::Loaded(detail) => {
                    out.push_str(&render_player_tab(&detail.player, self.detail.tab()))
                }
                FetchState::Failed(message) => out.push_str(&error_line(message)),
                _ => out.push_str(&render_player_tab(&self.selected, self.detail.tab())),
            },
            WorkbenchComponent::Points => out.push_str(&render_points(&self.points)),
            WorkbenchComponent::Status => out.push_str(&render_status(&self.status)),
        }
        out
    }
}

pub fn render_points<A: PlayerApi>(view: &PointsManagementView<A>) -> String {
    let mut rows = vec![
        ("Player", view.player_id().to_string()),
        ("Current balance", format_amount(view.balance())),
        (
            "Adjustment",
            format!("{} {}", view.form.kind, format_amount(view.form.amount)),
        ),
    ];
    if let Some(preview) = view.preview() {
        rows.push(("After adjustment", format_amount(preview)));
    }
    let mut out = card("Points management", &rows);
    out.push_str(&notice(view.message(), view.error()));
    if !view.history().is_empty() {
        let history: Vec<Vec<String>> = view
            .history()
            .iter()
            .map(|record| {
                vec![
                    date(&record.created_at),
                    record.kind.clone(),
                    format_amount(record.amount),
                    format_amount(record.balance_before),
                    format_amount(record.balance_after),
                    record.reason.clone(),
                    record.admin_user.clone(),
                ]
            })
            .collect();
        out.push_str(&table(
            &[
                "Time", "Type", "Amount", "Before", "After", "Reason", "Admin",
            ],
            &history,
        ));
    }
    out
}

pub fn render_status<A: PlayerApi>(view: &StatusManagementView<A>) -> String {
    let player = view.player();
    let mut rows = vec![
        ("Player", player.player_id.clone()),
        ("Current status", status_badge(player.status).to_string()),
        ("Selected status", view.selected.label().to_string()),
    ];
    let limits = [
        ("Daily bet limit", view.limits.daily_bet_limit),
        ("Bet amount limit", view.limits.bet_amount_limit),
        ("Deposit limit", view.limits.deposit_limit),
        ("Loss limit", view.limits.loss_limit),
        ("Session time limit", view.limits.session_time_limit),
    ];
    for (label, value) in limits {
        if let Some(value) = value {
            rows.push((label, format_amount(value)));
        }
    }
    let mut out = card("Status management", &rows);
    out.push_str(&notice(view.message(), view.error()));
    if !view.history().is_empty() {
        let history: Vec<Vec<String>> = view
            .history()
            .iter()
            .map(|record| {
                vec![
                    date(&record.created_at),
                    record.old_status.label().to_string(),
                    record.new_status.label().to_string(),
                    record.reason.clone(),
                    record.admin_user.clone(),
                ]
            })
            .collect();
        out.push_str(&table(&["Time", "From", "To", "Reason", "Admin"], &history));
    }
    out
}

/// Game catalog route.
#[derive(Default)]
pub struct GameManagementPage {
    catalog: GameCatalogView,
}

impl GameManagementPage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn catalog(&self) -> &GameCatalogView {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut GameCatalogView {
        &mut self.catalog
    }

    pub fn render(&self) -> String {
        let stats = self.catalog.stats();
        let mut out = card(
            "Game management",
            &[
                ("Games", stats.total_games.to_string()),
                ("Active", stats.active_games.to_string()),
                ("Players", stats.total_players.to_string()),
                ("Revenue", format_amount(stats.total_revenue)),
                (
                    "Average win rate",
                    format!("{:.1}%", stats.average_win_rate),
                ),
            ],
        );
        for game in self.catalog.games() {
            let _ = writeln!(
                out,
                "\n{} #{} {} ({})",
                game_status_badge(game.status),
                game.id,
                game.name.bright_white().bold(),
                game.kind
            );
            let _ = writeln!(out, "  {}", game.description);
            let _ = writeln!(
                out,
                "  players {}  revenue {}  win rate {:.1}%  bets {}-{}  odds {}",
                game.players,
                format_amount(game.revenue),
                game.win_rate,
                format_amount(game.min_bet),
                format_amount(game.max_bet),
                game.odds
            );
        }
        out
    }
}
