use crate::game::hand::Hand;
use crate::Action;

use rand::{Rng, RngCore};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};

/// Skill tier of a computer player. Each tier maps to a fixed strategy for
/// sizing bets and playing out hands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum SkillTier {
    Conservative,
    Aggressive,
    Calculator,
    Unpredictable,
}

impl SkillTier {
    pub fn strategy(&self) -> &'static dyn Strategy {
        match self {
            SkillTier::Conservative => &ConservativeStrategy,
            SkillTier::Aggressive => &AggressiveStrategy,
            SkillTier::Calculator => &CalculatorStrategy,
            SkillTier::Unpredictable => &UnpredictableStrategy,
        }
    }
}

/// How a computer player sizes its bet and plays out a hand. Computer
/// players only ever hit or stand.
pub trait Strategy {
    /// Picks the bet for the coming round. `balance` is at least 1 and the
    /// returned bet never exceeds it.
    fn bet_size(&self, balance: u32, rng: &mut dyn RngCore) -> u32;

    /// Picks hit or stand for the hand, given the blackjack value of the
    /// dealer upcard (1 for an ace, otherwise 2 to 10).
    fn decide(&self, hand: &Hand, dealer_up_value: u8, rng: &mut dyn RngCore) -> Action;
}

/// Bets 2% of the balance and bails out early against weak dealer upcards.
pub struct ConservativeStrategy;

impl Strategy for ConservativeStrategy {
    fn bet_size(&self, balance: u32, _rng: &mut dyn RngCore) -> u32 {
        ((balance as f64 * 0.02) as u32).clamp(1, balance)
    }

    fn decide(&self, hand: &Hand, dealer_up_value: u8, _rng: &mut dyn RngCore) -> Action {
        let threshold = {
            if (2..=6).contains(&dealer_up_value) {
                13
            } else {
                17
            }
        };
        if hand.total() < threshold {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

/// Bets big and always plays to 17.
pub struct AggressiveStrategy;

impl Strategy for AggressiveStrategy {
    fn bet_size(&self, balance: u32, rng: &mut dyn RngCore) -> u32 {
        let percent = rng.gen_range(10..=20);
        ((balance as f64 * percent as f64 / 100.0) as u32).clamp(1, balance)
    }

    fn decide(&self, hand: &Hand, _dealer_up_value: u8, _rng: &mut dyn RngCore) -> Action {
        if hand.total() < 17 {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

/// Bets a steady 5% and reads its decisions off the basic strategy charts.
pub struct CalculatorStrategy;

const H: Action = Action::Hit;
const S: Action = Action::Stand;

/// Hit or stand for hard totals 4 through 17 and up. Columns run from an
/// ace on the left up to a ten-valued card on the right.
static HARD_CHART: [[Action; 10]; 14] = [
    [H, H, H, H, H, H, H, H, H, H], // 4
    [H, H, H, H, H, H, H, H, H, H], // 5
    [H, H, H, H, H, H, H, H, H, H], // 6
    [H, H, H, H, H, H, H, H, H, H], // 7
    [H, H, H, H, H, H, H, H, H, H], // 8
    [H, H, H, H, H, H, H, H, H, H], // 9
    [H, H, H, H, H, H, H, H, H, H], // 10
    [H, H, H, H, H, H, H, H, H, H], // 11
    [H, H, H, S, S, S, H, H, H, H], // 12
    [H, S, S, S, S, S, H, H, H, H], // 13
    [H, S, S, S, S, S, H, H, H, H], // 14
    [H, S, S, S, S, S, H, H, H, H], // 15
    [H, S, S, S, S, S, H, H, H, H], // 16
    [S, S, S, S, S, S, S, S, S, S], // 17 and up
];

/// Hit or stand for soft totals 12 through 19 and up, same columns.
static SOFT_CHART: [[Action; 10]; 8] = [
    [H, H, H, H, H, H, H, H, H, H], // 12
    [H, H, H, H, H, H, H, H, H, H], // 13
    [H, H, H, H, H, H, H, H, H, H], // 14
    [H, H, H, H, H, H, H, H, H, H], // 15
    [H, H, H, H, H, H, H, H, H, H], // 16
    [H, H, H, H, H, H, H, H, H, H], // 17
    [H, S, S, S, S, S, S, S, H, H], // 18
    [S, S, S, S, S, S, S, S, S, S], // 19 and up
];

impl Strategy for CalculatorStrategy {
    fn bet_size(&self, balance: u32, _rng: &mut dyn RngCore) -> u32 {
        let bet = (balance as f64 * 0.05) as u32;
        bet.max(5).min(balance)
    }

    fn decide(&self, hand: &Hand, dealer_up_value: u8, _rng: &mut dyn RngCore) -> Action {
        let column = (dealer_up_value - 1) as usize;
        if hand.is_soft() {
            let row = (hand.total().clamp(12, 19) - 12) as usize;
            SOFT_CHART[row][column]
        } else {
            let row = (hand.total().clamp(4, 17) - 4) as usize;
            HARD_CHART[row][column]
        }
    }
}

/// Bets anything up to 20% of the balance and flips a coin on every decision.
pub struct UnpredictableStrategy;

impl Strategy for UnpredictableStrategy {
    fn bet_size(&self, balance: u32, rng: &mut dyn RngCore) -> u32 {
        let max_bet = ((balance as f64 * 0.20) as u32).max(1);
        rng.gen_range(1..=max_bet)
    }

    fn decide(&self, _hand: &Hand, _dealer_up_value: u8, rng: &mut dyn RngCore) -> Action {
        if rng.gen_bool(0.5) {
            Action::Hit
        } else {
            Action::Stand
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Card, Suit};
    use rand::thread_rng;

    fn hand_of(face_values: &[u8]) -> Hand {
        let mut hand = Hand::new(10);
        for &face_value in face_values {
            hand.receive_card(Card {
                face_value,
                suit: Suit::Club,
            });
        }
        hand
    }

    #[test]
    fn conservative_bet_is_two_percent_with_a_floor() {
        let mut rng = thread_rng();
        assert_eq!(ConservativeStrategy.bet_size(500, &mut rng), 10);
        assert_eq!(ConservativeStrategy.bet_size(20, &mut rng), 1);
        assert_eq!(ConservativeStrategy.bet_size(1, &mut rng), 1);
    }

    #[test]
    fn conservative_stops_early_against_weak_upcards() {
        let mut rng = thread_rng();
        let strategy = ConservativeStrategy;
        assert_eq!(strategy.decide(&hand_of(&[10, 2]), 4, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[10, 3]), 4, &mut rng), Action::Stand);
        assert_eq!(strategy.decide(&hand_of(&[10, 6]), 7, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[10, 7]), 10, &mut rng), Action::Stand);
        // An ace upcard counts as strong.
        assert_eq!(strategy.decide(&hand_of(&[10, 4]), 1, &mut rng), Action::Hit);
    }

    #[test]
    fn aggressive_bet_lands_between_10_and_20_percent() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let bet = AggressiveStrategy.bet_size(1000, &mut rng);
            assert!(bet >= 100);
            assert!(bet <= 200);
        }
        assert_eq!(AggressiveStrategy.bet_size(1, &mut rng), 1);
    }

    #[test]
    fn aggressive_plays_to_seventeen() {
        let mut rng = thread_rng();
        let strategy = AggressiveStrategy;
        assert_eq!(strategy.decide(&hand_of(&[10, 6]), 6, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[10, 7]), 6, &mut rng), Action::Stand);
    }

    #[test]
    fn calculator_bet_is_five_percent_with_a_floor_of_five() {
        let mut rng = thread_rng();
        assert_eq!(CalculatorStrategy.bet_size(1000, &mut rng), 50);
        assert_eq!(CalculatorStrategy.bet_size(40, &mut rng), 5);
        assert_eq!(CalculatorStrategy.bet_size(3, &mut rng), 3);
    }

    #[test]
    fn calculator_follows_the_hard_chart() {
        let mut rng = thread_rng();
        let strategy = CalculatorStrategy;
        assert_eq!(strategy.decide(&hand_of(&[10, 2]), 2, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[10, 2]), 4, &mut rng), Action::Stand);
        assert_eq!(strategy.decide(&hand_of(&[10, 6]), 6, &mut rng), Action::Stand);
        assert_eq!(strategy.decide(&hand_of(&[10, 6]), 7, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[10, 3]), 1, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[6, 5]), 10, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[10, 7]), 10, &mut rng), Action::Stand);
    }

    #[test]
    fn calculator_follows_the_soft_chart() {
        let mut rng = thread_rng();
        let strategy = CalculatorStrategy;
        // Soft 17 always hits, soft 18 depends on the upcard.
        assert_eq!(strategy.decide(&hand_of(&[1, 6]), 6, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[1, 7]), 3, &mut rng), Action::Stand);
        assert_eq!(strategy.decide(&hand_of(&[1, 7]), 9, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[1, 7]), 1, &mut rng), Action::Hit);
        assert_eq!(strategy.decide(&hand_of(&[1, 8]), 10, &mut rng), Action::Stand);
    }

    #[test]
    fn unpredictable_bet_stays_within_a_fifth_of_the_balance() {
        let mut rng = thread_rng();
        for _ in 0..100 {
            let bet = UnpredictableStrategy.bet_size(100, &mut rng);
            assert!(bet >= 1);
            assert!(bet <= 20);
        }
        assert_eq!(UnpredictableStrategy.bet_size(1, &mut rng), 1);
    }

    #[test]
    fn unpredictable_only_hits_or_stands() {
        let mut rng = thread_rng();
        let hand = hand_of(&[10, 5]);
        for _ in 0..20 {
            let action = UnpredictableStrategy.decide(&hand, 6, &mut rng);
            assert!(action == Action::Hit || action == Action::Stand);
        }
    }

    #[test]
    fn every_tier_resolves_to_a_strategy() {
        let mut rng = thread_rng();
        for tier in [
            SkillTier::Conservative,
            SkillTier::Aggressive,
            SkillTier::Calculator,
            SkillTier::Unpredictable,
        ] {
            let bet = tier.strategy().bet_size(500, &mut rng);
            assert!(bet >= 1);
            assert!(bet <= 500);
        }
    }

    #[test]
    fn skill_tier_serializes_as_a_plain_string() {
        let text = serde_json::to_string(&SkillTier::Calculator).unwrap();
        assert_eq!(text, "\"Calculator\"");
        let parsed: SkillTier = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, SkillTier::Calculator);
    }
}
