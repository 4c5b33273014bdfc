use super::{request_failed, ValidationError};
use backoffice_client::PlayerApi;
use backoffice_types::{
    AdjustmentType, BalanceAdjustment, BalanceHistoryRecord, Player, COMMON_ADJUSTMENT_REASONS,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AdjustmentForm {
    pub amount: f64,
    pub kind: AdjustmentType,
    pub reason: String,
}

impl AdjustmentForm {
    pub fn validate(&self) -> Result<BalanceAdjustment, ValidationError> {
        if self.amount.is_nan() || self.amount <= 0.0 {
            return Err(ValidationError::NonPositiveAmount);
        }
        let reason = self.reason.trim();
        if reason.is_empty() {
            return Err(ValidationError::MissingAdjustmentReason);
        }
        Ok(BalanceAdjustment {
            amount: self.amount,
            kind: self.kind,
            reason: reason.to_string(),
        })
    }
}

/// Balance adjustment form for one player.
///
/// The displayed balance is updated locally on success; the backend value
/// replaces it on the next fetch.
pub struct PointsManagementView<A> {
    api: Arc<A>,
    admin_user: String,
    player_id: String,
    balance: f64,
    pub form: AdjustmentForm,
    history: Vec<BalanceHistoryRecord>,
    message: Option<String>,
    error: Option<String>,
}

impl<A: PlayerApi> PointsManagementView<A> {
    pub fn new(api: Arc<A>, player: &Player, admin_user: impl Into<String>) -> Self {
        Self {
            api,
            admin_user: admin_user.into(),
            player_id: player.player_id.clone(),
            balance: player.balance,
            form: AdjustmentForm::default(),
            history: Vec::new(),
            message: None,
            error: None,
        }
    }

    /// Re-seeds the view from a (possibly different) player.
    pub fn set_player(&mut self, player: &Player) {
        if self.player_id != player.player_id {
            self.history.clear();
            self.form = AdjustmentForm::default();
        }
        self.player_id = player.player_id.clone();
        self.balance = player.balance;
    }

    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn history(&self) -> &[BalanceHistoryRecord] {
        &self.history
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn common_reasons(&self) -> &'static [&'static str] {
        &COMMON_ADJUSTMENT_REASONS
    }

    /// Balance after the pending adjustment, if the amount is positive.
    pub fn preview(&self) -> Option<f64> {
        (self.form.amount > 0.0).then(|| self.form.kind.apply(self.balance, self.form.amount))
    }

    /// Submits the form. Returns the new displayed balance on success.
    pub async fn submit(&mut self) -> Option<f64> {
        self.message = None;
        self.error = None;
        let adjustment = match self.form.validate() {
            Ok(adjustment) => adjustment,
            Err(err) => {
                self.error = Some(err.to_string());
                return None;
            }
        };

        match self
            .api
            .adjust_player_balance(&self.player_id, &adjustment)
            .await
        {
            Ok(envelope) if envelope.success => {
                let balance_before = self.balance;
                let balance_after = adjustment.kind.apply(balance_before, adjustment.amount);
                self.history.push(BalanceHistoryRecord {
                    id: self.history.len() as u64 + 1,
                    amount: adjustment.amount,
                    kind: adjustment.kind.as_str().to_string(),
                    reason: adjustment.reason,
                    balance_before,
                    balance_after,
                    created_at: Utc::now(),
                    admin_user: self.admin_user.clone(),
                });
                self.balance = balance_after;
                self.form = AdjustmentForm::default();
                info!(player_id = %self.player_id, balance_after, "Balance adjusted");
                self.message = Some(
                    envelope
                        .message
                        .unwrap_or_else(|| "balance adjusted".to_string()),
                );
                Some(balance_after)
            }
            Ok(envelope) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "balance adjustment rejected".to_string());
                warn!(player_id = %self.player_id, %message, "Balance adjustment rejected");
                self.error = Some(message);
                None
            }
            Err(err) => {
                self.error = Some(request_failed("adjusting balance", &err));
                None
            }
        }
    }
}
