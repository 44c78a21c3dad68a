use super::match_state::GameState;
use crate::model::player::Seat;
use crate::model::score::ScoreManager;
use serde::{Deserialize, Serialize};

/// Score table at a point in a match, as stored by the statistics layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreSheetSnapshot {
    pub block_number: u8,
    pub round_in_block: usize,
    pub dealer: Seat,
    pub totals: Vec<i32>,
    pub sheet: ScoreManager,
}

impl ScoreSheetSnapshot {
    pub fn capture(state: &GameState) -> Self {
        ScoreSheetSnapshot {
            block_number: state.current_block(),
            round_in_block: state.current_round_in_block(),
            dealer: state.dealer(),
            totals: state.scores().total_scores_including_current_block(),
            sheet: state.scores().clone(),
        }
    }

    pub fn to_json(state: &GameState) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&Self::capture(state))
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

#[cfg(test)]
mod tests {
    use super::ScoreSheetSnapshot;
    use crate::game::match_state::GameState;
    use crate::model::player::PlayerCount;

    #[test]
    fn snapshot_serializes_to_json() {
        let state = GameState::new(PlayerCount::Four, 3);
        let json = ScoreSheetSnapshot::to_json(&state).unwrap();
        assert!(json.contains("\"block_number\": 1"));
        assert!(json.contains("\"totals\""));
    }

    #[test]
    fn snapshot_roundtrip_keeps_score_sheet() {
        let state = GameState::new(PlayerCount::Three, 3);
        let snapshot = ScoreSheetSnapshot::capture(&state);
        let json = serde_json::to_string(&snapshot).unwrap();
        let restored = ScoreSheetSnapshot::from_json(&json).unwrap();
        assert_eq!(restored, snapshot);
        assert_eq!(restored.sheet.player_count(), 3);
    }
}
