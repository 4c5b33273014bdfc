use anyhow::{bail, Context};
use backoffice_client::{
    AuthApi, FileSessionStore, HttpPlayerApi, PlayerApi, SessionStore, API_URL_ENV,
};
use backoffice_console::{
    display,
    pages::{
        render_points, render_status, GameManagementPage, PlayerDetailPage, PlayersPage,
        WorkbenchComponent, WorkbenchPage,
    },
    views::{DetailTab, FetchState, PointsManagementView, StatusManagementView},
    Config, ValidatedConfig,
};
use backoffice_types::{
    AdjustmentType, Credentials, PaginationParams, Player, PlayerLimits, PlayerStatus, SortOrder,
};
use clap::{Args, Parser, Subcommand};
use std::{path::PathBuf, sync::Arc};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "backoffice", author, version, about, long_about = None)]
struct Cli {
    /// YAML config file (defaults to ~/.backoffice/config.yaml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8080/api/v1
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and store the session token
    Login {
        #[arg(short, long)]
        username: Option<String>,
        #[arg(short, long)]
        password: String,
    },
    /// Log out and forget the session token
    Logout,
    /// Exchange the session token for a fresh one
    Refresh,
    /// Player administration
    #[command(subcommand)]
    Players(PlayersCommand),
    /// Game catalog (local preview data)
    #[command(subcommand)]
    Games(GamesCommand),
    /// Every component around one shared mock player
    Workbench {
        #[arg(short, long, default_value = "list")]
        component: WorkbenchComponent,
    },
}

#[derive(Subcommand, Debug)]
enum PlayersCommand {
    List(ListArgs),
    Show {
        id: String,
        #[arg(short, long, default_value = "basic")]
        tab: DetailTab,
    },
    Adjust {
        id: String,
        #[arg(short, long)]
        amount: f64,
        #[arg(short = 't', long = "type", default_value = "add")]
        kind: AdjustmentType,
        #[arg(short, long, default_value = "")]
        reason: String,
    },
    Status {
        id: String,
        #[arg(short, long)]
        status: PlayerStatus,
        #[arg(short, long, default_value = "")]
        reason: String,
    },
    Limits(LimitsArgs),
    History {
        id: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        limit: Option<u32>,
        #[arg(long)]
        order: Option<SortOrder>,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    #[arg(short, long)]
    search: Option<String>,
    #[arg(long)]
    status: Option<PlayerStatus>,
    /// YYYY-MM-DD
    #[arg(long)]
    start_date: Option<String>,
    /// YYYY-MM-DD
    #[arg(long)]
    end_date: Option<String>,
    #[arg(long)]
    min_balance: Option<String>,
    #[arg(long)]
    max_balance: Option<String>,
    #[arg(long)]
    page: Option<u32>,
    #[arg(long)]
    limit: Option<u32>,
    /// Column to sort by; repeat the column to flip the order
    #[arg(long)]
    sort: Vec<String>,
}

#[derive(Args, Debug)]
struct LimitsArgs {
    id: String,
    #[arg(long)]
    daily_bet_limit: Option<f64>,
    #[arg(long)]
    bet_amount_limit: Option<f64>,
    #[arg(long)]
    deposit_limit: Option<f64>,
    #[arg(long)]
    loss_limit: Option<f64>,
    /// Minutes
    #[arg(long)]
    session_time_limit: Option<f64>,
}

#[derive(Subcommand, Debug)]
enum GamesCommand {
    List,
    Toggle { id: u64 },
}

struct App {
    config: ValidatedConfig,
    session: Arc<FileSessionStore>,
    api: Arc<HttpPlayerApi>,
    auth: AuthApi,
}

impl App {
    fn new(config: ValidatedConfig) -> anyhow::Result<Self> {
        let session = Arc::new(FileSessionStore::new(&config.session_file));
        let http = config
            .http_client(session.clone())
            .context("failed to create API client")?;
        Ok(Self {
            session,
            api: Arc::new(HttpPlayerApi::new(http.clone())),
            auth: AuthApi::new(http),
            config,
        })
    }

    async fn fetch_player(&self, id: &str) -> anyhow::Result<Player> {
        self.api
            .get_player(id)
            .await
            .with_context(|| format!("failed to load player {id}"))?
            .into_data("player not found")
            .map_err(anyhow::Error::msg)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse args
    let cli = Cli::parse();

    // Load config
    let mut config = Config::load(cli.config.as_deref()).context("failed to load config")?;
    config.override_api_url(std::env::var(API_URL_ENV).ok(), cli.api_url.clone());
    let config = config.validate().context("invalid config")?;

    // Create logger
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_writer(std::io::stderr)
        .init();
    info!(api_url = %config.api_url, "Starting backoffice");

    let ctx = App::new(config)?;
    if let Err(err) = run(&ctx, cli.command).await {
        display::error(&format!("{err:#}"));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(ctx: &App, command: Command) -> anyhow::Result<()> {
    match command {
        Command::Login { username, password } => {
            let credentials = Credentials {
                username: username.unwrap_or_else(|| ctx.config.admin_user.clone()),
                password,
            };
            let login = ctx
                .auth
                .login(&credentials)
                .await
                .context("login failed")?
                .into_data("login rejected")
                .map_err(anyhow::Error::msg)?;
            ctx.session
                .set_token(&login.token)
                .context("failed to store session")?;
            display::success(&format!("Logged in as {}", credentials.username));
            display::info(&format!("Session saved to {}", ctx.session.path().display()));
        }
        Command::Logout => {
            if let Err(err) = ctx.auth.logout().await {
                display::warning(&format!("backend logout failed: {err}"));
            }
            ctx.session.clear().context("failed to clear session")?;
            display::success("Logged out");
        }
        Command::Refresh => {
            let refreshed = ctx
                .auth
                .refresh_token()
                .await
                .context("token refresh failed")?
                .into_data("token refresh rejected")
                .map_err(anyhow::Error::msg)?;
            ctx.session
                .set_token(&refreshed.token)
                .context("failed to store session")?;
            display::success("Session refreshed");
        }
        Command::Players(command) => run_players(ctx, command).await?,
        Command::Games(command) => {
            let mut page = GameManagementPage::new();
            if let GamesCommand::Toggle { id } = command {
                let Some(status) = page.catalog_mut().toggle_status(id) else {
                    bail!("no game with id {id}");
                };
                display::success(&format!("Game {id} is now {}", status.label()));
            }
            display::section("Games");
            print!("{}", page.render());
        }
        Command::Workbench { component } => {
            let mut page = WorkbenchPage::new(ctx.api.clone(), &ctx.config.admin_user);
            page.switch_to(component);
            page.load().await;
            display::section("Workbench");
            print!("{}", page.render());
        }
    }
    Ok(())
}

async fn run_players(ctx: &App, command: PlayersCommand) -> anyhow::Result<()> {
    match command {
        PlayersCommand::List(args) => {
            let mut page = PlayersPage::new(ctx.api.clone(), ctx.config.page_size);
            let list = page.list_mut();
            list.form.search = args.search.unwrap_or_default();
            list.form.status = args.status;
            list.form.start_date = args.start_date.unwrap_or_default();
            list.form.end_date = args.end_date.unwrap_or_default();
            list.form.min_balance = args.min_balance.unwrap_or_default();
            list.form.max_balance = args.max_balance.unwrap_or_default();
            if let Some(limit) = args.limit {
                list.set_limit(limit);
            }
            for field in &args.sort {
                list.toggle_sort(field);
            }
            match args.page {
                Some(number) => list.go_to_page(number).await,
                None => list.submit_search().await,
            }
            display::section("Players");
            print!("{}", page.render());
            if let FetchState::Failed(message) = page.list().state() {
                bail!("{message}");
            }
        }
        PlayersCommand::Show { id, tab } => {
            let mut page = PlayerDetailPage::new(ctx.api.clone(), &id);
            page.load().await;
            if let Some(view) = page.view_mut() {
                view.select_tab(tab);
                if tab == DetailTab::Analysis {
                    view.load_analysis().await;
                }
            }
            display::section("Player");
            print!("{}", page.render());
            match page.view().map(|view| view.state()) {
                None => bail!("missing player id"),
                Some(FetchState::Failed(message)) => bail!("{message}"),
                Some(_) => {}
            }
        }
        PlayersCommand::Adjust {
            id,
            amount,
            kind,
            reason,
        } => {
            let player = ctx.fetch_player(&id).await?;
            let mut view =
                PointsManagementView::new(ctx.api.clone(), &player, &ctx.config.admin_user);
            view.form.amount = amount;
            view.form.kind = kind;
            view.form.reason = reason;
            let result = view.submit().await;
            display::section("Points");
            print!("{}", render_points(&view));
            if result.is_none() {
                bail!("{}", view.error().unwrap_or("balance adjustment failed"));
            }
        }
        PlayersCommand::Status { id, status, reason } => {
            let player = ctx.fetch_player(&id).await?;
            let mut view =
                StatusManagementView::new(ctx.api.clone(), player, &ctx.config.admin_user);
            view.selected = status;
            view.reason = reason;
            let result = view.submit_status().await;
            display::section("Status");
            print!("{}", render_status(&view));
            if result.is_none() {
                bail!("{}", view.error().unwrap_or("status update failed"));
            }
        }
        PlayersCommand::Limits(args) => {
            let player = ctx.fetch_player(&args.id).await?;
            let mut view =
                StatusManagementView::new(ctx.api.clone(), player, &ctx.config.admin_user);
            view.limits = PlayerLimits {
                daily_bet_limit: args.daily_bet_limit,
                bet_amount_limit: args.bet_amount_limit,
                deposit_limit: args.deposit_limit,
                loss_limit: args.loss_limit,
                session_time_limit: args.session_time_limit,
            };
            let updated = view.submit_limits().await;
            display::section("Limits");
            print!("{}", render_status(&view));
            if !updated {
                bail!("{}", view.error().unwrap_or("limits update failed"));
            }
        }
        PlayersCommand::History {
            id,
            page,
            limit,
            order,
        } => {
            let params = PaginationParams {
                page: Some(page),
                limit: Some(limit.unwrap_or(ctx.config.page_size)),
                sort: None,
                order,
            };
            let history = ctx
                .api
                .get_player_game_history(&id, &params)
                .await
                .with_context(|| format!("failed to load game history for {id}"))?
                .into_data("game history unavailable")
                .map_err(anyhow::Error::msg)?;
            display::section("Game history");
            println!("{}", display::json_block(&history));
        }
    }
    Ok(())
}
