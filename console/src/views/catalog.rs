use backoffice_types::{preview_catalog, CatalogStats, GameEntry, GameStatus};
use tracing::info;

/// Game catalog held locally; nothing is sent to the backend.
#[derive(Clone, Debug)]
pub struct GameCatalogView {
    games: Vec<GameEntry>,
}

impl Default for GameCatalogView {
    fn default() -> Self {
        Self::new(preview_catalog())
    }
}

impl GameCatalogView {
    pub fn new(games: Vec<GameEntry>) -> Self {
        Self { games }
    }

    pub fn games(&self) -> &[GameEntry] {
        &self.games
    }

    pub fn game(&self, id: u64) -> Option<&GameEntry> {
        self.games.iter().find(|game| game.id == id)
    }

    /// Active becomes inactive, anything else becomes active.
    pub fn toggle_status(&mut self, id: u64) -> Option<GameStatus> {
        let game = self.games.iter_mut().find(|game| game.id == id)?;
        game.status = game.status.toggled();
        info!(id, name = %game.name, status = game.status.label(), "Game status toggled");
        Some(game.status)
    }

    pub fn stats(&self) -> CatalogStats {
        CatalogStats::from_games(&self.games)
    }
}
