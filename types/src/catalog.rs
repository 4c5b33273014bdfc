use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Active,
    Inactive,
    Maintenance,
}

impl GameStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GameStatus::Active => "Running",
            GameStatus::Inactive => "Disabled",
            GameStatus::Maintenance => "Maintenance",
        }
    }

    /// Active games are disabled; anything else is brought back online.
    pub fn toggled(&self) -> GameStatus {
        match self {
            GameStatus::Active => GameStatus::Inactive,
            GameStatus::Inactive | GameStatus::Maintenance => GameStatus::Active,
        }
    }
}

/// A table game offered by the platform.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameEntry {
    pub id: u64,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: GameStatus,
    pub players: u64,
    pub revenue: f64,
    /// Percentage, 0-100.
    pub win_rate: f64,
    pub min_bet: f64,
    pub max_bet: f64,
    pub odds: f64,
}

/// Aggregates shown above the catalog table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CatalogStats {
    pub total_games: usize,
    pub active_games: usize,
    pub total_players: u64,
    pub total_revenue: f64,
    pub average_win_rate: f64,
}

impl CatalogStats {
    pub fn from_games(games: &[GameEntry]) -> Self {
        let total_games = games.len();
        let average_win_rate = if total_games == 0 {
            0.0
        } else {
            games.iter().map(|game| game.win_rate).sum::<f64>() / total_games as f64
        };
        Self {
            total_games,
            active_games: games
                .iter()
                .filter(|game| game.status == GameStatus::Active)
                .count(),
            total_players: games.iter().map(|game| game.players).sum(),
            total_revenue: games.iter().map(|game| game.revenue).sum(),
            average_win_rate,
        }
    }
}

/// Preview catalog used until the game management backend exists.
pub fn preview_catalog() -> Vec<GameEntry> {
    vec![
        GameEntry {
            id: 1,
            name: "Texas Hold'em".to_string(),
            description: "Classic Texas Hold'em poker".to_string(),
            kind: "poker".to_string(),
            status: GameStatus::Active,
            players: 156,
            revenue: 125_600.0,
            win_rate: 52.3,
            min_bet: 10.0,
            max_bet: 5_000.0,
            odds: 2.1,
        },
        GameEntry {
            id: 2,
            name: "Baccarat".to_string(),
            description: "Traditional baccarat".to_string(),
            kind: "baccarat".to_string(),
            status: GameStatus::Active,
            players: 89,
            revenue: 95_400.0,
            win_rate: 48.7,
            min_bet: 50.0,
            max_bet: 10_000.0,
            odds: 1.95,
        },
        GameEntry {
            id: 3,
            name: "Five Card Stud".to_string(),
            description: "Five card stud poker".to_string(),
            kind: "stud".to_string(),
            status: GameStatus::Maintenance,
            players: 0,
            revenue: 0.0,
            win_rate: 0.0,
            min_bet: 20.0,
            max_bet: 2_000.0,
            odds: 2.5,
        },
    ]
}
