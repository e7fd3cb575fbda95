use crate::game::shoe::ShoeSnapshot;
use crate::game::table::{Dealer, Player};
use crate::game::{GameOverReason, GamePhase};

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Bump this when the snapshot layout changes shape.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Everything needed to park a game between rounds, or mid-round, and pick
/// it up later with the same cards waiting in the shoe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub version: u32,
    pub rounds_played: u32,
    pub current_game_phase: GamePhase,
    pub players: Vec<Player>,
    pub dealer: Dealer,
    pub shoe: ShoeSnapshot,
    pub turn_queue: VecDeque<(usize, usize)>,
    pub game_over_reason: Option<GameOverReason>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::hand::Hand;
    use crate::game::{Card, Suit};

    fn typical_snapshot() -> GameSnapshot {
        let mut human = Player::new_human("Ada".to_string(), 480);
        human.hands = vec![Hand::new(20)];
        human.hands[0].receive_card(Card {
            face_value: 10,
            suit: Suit::Heart,
        });
        human.hands[0].receive_card(Card {
            face_value: 5,
            suit: Suit::Spade,
        });
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            rounds_played: 3,
            current_game_phase: GamePhase::PlayerTurns,
            players: vec![human],
            dealer: Dealer::new(10_000),
            shoe: ShoeSnapshot {
                cards: vec![Card::default(); 8],
                cut_offset: Some(4),
            },
            turn_queue: VecDeque::from(vec![(0, 0)]),
            game_over_reason: None,
        }
    }

    #[test]
    fn snapshot_round_trips_through_json() {
        let snapshot = typical_snapshot();
        let text = serde_json::to_string_pretty(&snapshot).unwrap();
        let parsed: GameSnapshot = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, snapshot);
    }

    #[test]
    fn phase_serializes_as_a_plain_string() {
        let value = serde_json::to_value(typical_snapshot()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["current_game_phase"], "PlayerTurns");
        assert_eq!(value["players"][0]["skill"], serde_json::Value::Null);
    }

    #[test]
    fn snapshot_without_cut_offset_still_parses() {
        let mut snapshot = typical_snapshot();
        snapshot.shoe.cut_offset = None;
        let text = serde_json::to_string(&snapshot).unwrap();
        let parsed: GameSnapshot = serde_json::from_str(&text).unwrap();
        assert!(parsed.shoe.cut_offset.is_none());
    }
}
