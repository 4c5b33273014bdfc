use super::{request_failed, ValidationError};
use backoffice_client::PlayerApi;
use backoffice_types::{
    Player, PlayerLimits, PlayerStatus, StatusHistoryRecord, COMMON_STATUS_REASONS,
};
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

/// Status change and limit settings for one player.
pub struct StatusManagementView<A> {
    api: Arc<A>,
    admin_user: String,
    player: Player,
    pub selected: PlayerStatus,
    pub reason: String,
    pub limits: PlayerLimits,
    history: Vec<StatusHistoryRecord>,
    message: Option<String>,
    error: Option<String>,
}

impl<A: PlayerApi> StatusManagementView<A> {
    pub fn new(api: Arc<A>, player: Player, admin_user: impl Into<String>) -> Self {
        Self {
            api,
            admin_user: admin_user.into(),
            selected: player.status,
            player,
            reason: String::new(),
            limits: PlayerLimits::default(),
            history: Vec::new(),
            message: None,
            error: None,
        }
    }

    pub fn set_player(&mut self, player: Player) {
        if self.player.player_id != player.player_id {
            self.history.clear();
            self.reason.clear();
            self.limits = PlayerLimits::default();
        }
        self.selected = player.status;
        self.player = player;
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn history(&self) -> &[StatusHistoryRecord] {
        &self.history
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn common_reasons(&self) -> &'static [&'static str] {
        &COMMON_STATUS_REASONS
    }

    pub fn validate(&self) -> Result<PlayerStatus, ValidationError> {
        if self.selected == self.player.status {
            return Err(ValidationError::UnchangedStatus);
        }
        if self.reason.trim().is_empty() {
            return Err(ValidationError::MissingStatusReason);
        }
        Ok(self.selected)
    }

    /// Submits the selected status. Returns the updated player on success.
    ///
    /// The reason is kept in the local history only.
    pub async fn submit_status(&mut self) -> Option<Player> {
        self.message = None;
        self.error = None;
        let status = match self.validate() {
            Ok(status) => status,
            Err(err) => {
                self.error = Some(err.to_string());
                return None;
            }
        };

        match self
            .api
            .update_player_status(&self.player.player_id, status)
            .await
        {
            Ok(envelope) if envelope.success => {
                let old_status = self.player.status;
                self.history.push(StatusHistoryRecord {
                    id: self.history.len() as u64 + 1,
                    old_status,
                    new_status: status,
                    reason: self.reason.trim().to_string(),
                    created_at: Utc::now(),
                    admin_user: self.admin_user.clone(),
                });
                self.player.status = status;
                self.reason.clear();
                info!(
                    player_id = %self.player.player_id,
                    %old_status,
                    new_status = %status,
                    "Status updated"
                );
                self.message = Some(
                    envelope
                        .message
                        .unwrap_or_else(|| format!("status changed to {}", status.label())),
                );
                Some(self.player.clone())
            }
            Ok(envelope) => {
                let message = envelope
                    .message
                    .unwrap_or_else(|| "status update rejected".to_string());
                warn!(player_id = %self.player.player_id, %message, "Status update rejected");
                self.error = Some(message);
                None
            }
            Err(err) => {
                self.error = Some(request_failed("updating status", &err));
                None
            }
        }
    }

    /// Sends the limits form as is.
    pub async fn submit_limits(&mut self) -> bool {
        self.message = None;
        self.error = None;
        match self
            .api
            .set_player_limits(&self.player.player_id, &self.limits)
            .await
        {
            Ok(envelope) if envelope.success => {
                info!(player_id = %self.player.player_id, "Limits updated");
                self.message = Some(
                    envelope
                        .message
                        .unwrap_or_else(|| "limits updated".to_string()),
                );
                true
            }
            Ok(envelope) => {
                self.error = Some(
                    envelope
                        .message
                        .unwrap_or_else(|| "limits update rejected".to_string()),
                );
                false
            }
            Err(err) => {
                self.error = Some(request_failed("updating limits", &err));
                false
            }
        }
    }
}
