use super::{request_failed, FetchState};
use backoffice_client::PlayerApi;
use backoffice_types::{Player, PlayerPage, PlayerSearchParams, PlayerStatus, SortOrder};
use std::sync::Arc;
use tracing::{debug, warn};

pub const DEFAULT_SORT: &str = "created_at";

/// Search form as typed by the operator. Empty fields are not sent.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchForm {
    pub search: String,
    pub status: Option<PlayerStatus>,
    pub start_date: String,
    pub end_date: String,
    pub min_balance: String,
    pub max_balance: String,
}

fn text(value: &str) -> Option<String> {
    let value = value.trim();
    (!value.is_empty()).then(|| value.to_string())
}

fn number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Paginated, sortable, filterable player table.
pub struct PlayerListView<A> {
    api: Arc<A>,
    pub form: SearchForm,
    params: PlayerSearchParams,
    state: FetchState<PlayerPage>,
}

impl<A: PlayerApi> PlayerListView<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self::with_page_size(api, backoffice_types::DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(api: Arc<A>, limit: u32) -> Self {
        Self {
            api,
            form: SearchForm::default(),
            params: PlayerSearchParams {
                page: Some(1),
                limit: Some(limit),
                sort: Some(DEFAULT_SORT.to_string()),
                order: Some(SortOrder::Desc),
                ..Default::default()
            },
            state: FetchState::Idle,
        }
    }

    pub fn params(&self) -> &PlayerSearchParams {
        &self.params
    }

    pub fn state(&self) -> &FetchState<PlayerPage> {
        &self.state
    }

    pub fn page(&self) -> u32 {
        self.params.page.unwrap_or(1)
    }

    pub fn players(&self) -> &[Player] {
        self.state
            .data()
            .map(|page| page.players.as_slice())
            .unwrap_or_default()
    }

    pub fn total(&self) -> u64 {
        self.state
            .data()
            .map(|page| page.pagination.total)
            .unwrap_or_default()
    }

    pub fn total_pages(&self) -> u32 {
        self.state
            .data()
            .map(|page| page.pagination.total_pages)
            .unwrap_or_default()
    }

    /// Params merged with the form, as they will be sent.
    pub fn search_params(&self) -> PlayerSearchParams {
        PlayerSearchParams {
            search: text(&self.form.search),
            status: self.form.status,
            start_date: text(&self.form.start_date),
            end_date: text(&self.form.end_date),
            min_balance: number(&self.form.min_balance),
            max_balance: number(&self.form.max_balance),
            ..self.params.clone()
        }
    }

    /// Same column while ascending flips to descending; anything else starts ascending.
    pub fn toggle_sort(&mut self, field: &str) {
        let ascending_on_field = self.params.sort.as_deref() == Some(field)
            && self.params.order == Some(SortOrder::Asc);
        self.params.sort = Some(field.to_string());
        self.params.order = Some(if ascending_on_field {
            SortOrder::Desc
        } else {
            SortOrder::Asc
        });
        self.params.page = Some(1);
    }

    pub async fn load(&mut self) {
        let params = self.search_params();
        debug!(query = %params.to_query_string(), "Loading players");
        self.state = FetchState::Loading;
        self.state = match self.api.get_players(&params).await {
            Ok(envelope) => match envelope.into_data("failed to load players") {
                Ok(page) => FetchState::Loaded(page),
                Err(message) => {
                    warn!(%message, "Player list rejected");
                    FetchState::Failed(message)
                }
            },
            Err(err) => FetchState::Failed(request_failed("loading players", &err)),
        };
    }

    pub async fn reload(&mut self) {
        self.load().await
    }

    pub async fn submit_search(&mut self) {
        self.params.page = Some(1);
        self.load().await
    }

    pub async fn clear(&mut self) {
        self.form = SearchForm::default();
        self.params.page = Some(1);
        self.load().await
    }

    pub async fn sort_by(&mut self, field: &str) {
        self.toggle_sort(field);
        self.load().await
    }

    pub async fn go_to_page(&mut self, page: u32) {
        self.params.page = Some(page.max(1));
        self.load().await
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.params.limit = Some(limit.max(1));
        self.params.page = Some(1);
    }
}
