use crate::{PlayerApi, Result};
use backoffice_types::Envelope;
use serde_json::Value;
use tracing::warn;

/// Outcome of the four analytics calls, one slot per call.
///
/// A slot is `None` when its call failed or returned no payload.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AnalysisData {
    pub behavior_analysis: Option<Value>,
    pub game_preference: Option<Value>,
    pub spending_habits: Option<Value>,
    pub value_score: Option<Value>,
}

impl AnalysisData {
    /// Titled panels for every slot that holds data, in display order.
    pub fn panels(&self) -> Vec<(&'static str, &Value)> {
        [
            ("Behavior analysis", self.behavior_analysis.as_ref()),
            ("Game preference", self.game_preference.as_ref()),
            ("Spending habits", self.spending_habits.as_ref()),
            ("Value score", self.value_score.as_ref()),
        ]
        .into_iter()
        .filter_map(|(title, value)| value.map(|value| (title, value)))
        .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.panels().is_empty()
    }
}

/// Runs every analytics call for `id` concurrently.
///
/// Failures are isolated to their own slot; this never returns an error.
pub async fn load_analysis<A: PlayerApi + ?Sized>(api: &A, id: &str) -> AnalysisData {
    let (behavior, preference, spending, value) = futures::join!(
        api.get_player_behavior_analysis(id),
        api.get_player_game_preference(id),
        api.get_player_spending_habits(id),
        api.calculate_player_value_score(id, None),
    );

    AnalysisData {
        behavior_analysis: settle("behavior-analysis", behavior),
        game_preference: settle("game-preference", preference),
        spending_habits: settle("spending-habits", spending),
        value_score: settle("value-score", value),
    }
}

fn settle(slot: &'static str, result: Result<Envelope<Value>>) -> Option<Value> {
    match result {
        Ok(envelope) => envelope.data.filter(|data| !data.is_null()),
        Err(err) => {
            warn!(slot, ?err, "Analysis request failed");
            None
        }
    }
}
