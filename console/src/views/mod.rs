//! Stateful views over a [backoffice_client::PlayerApi].
//!
//! Views keep their own copy of whatever they fetched and report failures as
//! inline message strings. A view failing never affects another.

pub mod catalog;
pub mod detail;
pub mod list;
pub mod points;
pub mod status;

pub use catalog::GameCatalogView;
pub use detail::{DetailTab, PlayerDetail, PlayerDetailView};
pub use list::{PlayerListView, SearchForm};
pub use points::{AdjustmentForm, PointsManagementView};
pub use status::StatusManagementView;

use thiserror::Error;

/// Lifecycle of a view's fetch.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FetchState<T> {
    #[default]
    Idle,
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> FetchState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, FetchState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn data_mut(&mut self) -> Option<&mut T> {
        match self {
            FetchState::Loaded(data) => Some(data),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            FetchState::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Form input rejected before any request is made.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("amount must be greater than 0")]
    NonPositiveAmount,
    #[error("an adjustment reason is required")]
    MissingAdjustmentReason,
    #[error("the new status must differ from the current one")]
    UnchangedStatus,
    #[error("a reason for the status change is required")]
    MissingStatusReason,
}

/// Inline message for a failed request.
pub(crate) fn request_failed(action: &str, err: &backoffice_client::Error) -> String {
    format!("{action} failed: {err}")
}
