use crate::{EngineError, Rule};

use super::{Card, Suit};

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use rand::seq::SliceRandom;
use rand::thread_rng;
use rand::Rng;

/// Represents a shoe in the real world.
#[derive(Debug, Clone)]
pub struct Shoe {
    number_of_decks: u8,
    cut_card_min_proportion: f64,
    cut_card_max_proportion: f64,
    cut_card_index: usize,
    cards: Vec<Card>,
    current_index: usize,
}

/// The persisted face of a shoe: the undrawn cards in draw order and how far
/// ahead the cut card sits. `None` means the cut card was already passed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShoeSnapshot {
    pub cards: Vec<Card>,
    pub cut_offset: Option<usize>,
}

impl Shoe {
    /// Creates a new shoe with ordered cards. Call `shuffle` before play.
    pub fn new(
        number_of_decks: u8,
        cut_card_min_proportion: f64,
        cut_card_max_proportion: f64,
    ) -> Shoe {
        let mut shoe = Shoe {
            number_of_decks,
            cut_card_min_proportion,
            cut_card_max_proportion,
            cut_card_index: 0,
            cards: Vec::with_capacity(number_of_decks as usize * 52),
            current_index: 0,
        };
        shoe.fill_ordered();
        shoe.place_cut_card();
        shoe
    }

    /// Returns the dealt cards back into the shoe and shuffles, then places
    /// the cut card at a freshly sampled position.
    pub fn shuffle(&mut self) {
        self.cards.shuffle(&mut thread_rng());
        self.current_index = 0;
        self.place_cut_card();
    }

    /// Discards the current contents and builds a freshly shuffled full shoe.
    pub fn rebuild(&mut self) {
        self.fill_ordered();
        self.shuffle();
    }

    /// Deals the next card. A shoe that runs dry mid-round rebuilds itself,
    /// so a draw never fails.
    pub fn deal_card(&mut self) -> Card {
        if self.current_index >= self.cards.len() {
            log::warn!("Shoe ran out of cards mid-round, rebuilding it");
            self.rebuild();
        }
        let card = self.cards[self.current_index];
        self.current_index += 1;
        card
    }

    /// Checks if the cut card has been reached. Stays true until the shoe is
    /// rebuilt.
    pub fn reached_cut_card(&self) -> bool {
        self.current_index >= self.cut_card_index
    }

    pub fn remaining(&self) -> usize {
        self.cards.len() - self.current_index
    }

    /// Captures the undrawn cards and the distance to the cut card.
    pub fn snapshot(&self) -> ShoeSnapshot {
        let cut_offset = if self.reached_cut_card() {
            None
        } else {
            Some(self.cut_card_index - self.current_index)
        };
        ShoeSnapshot {
            cards: self.cards[self.current_index..].to_vec(),
            cut_offset,
        }
    }

    /// Rebuilds a shoe from a snapshot so that it deals the exact same cards
    /// in the same order. An offset of zero counts as an already reached cut
    /// card, same as the `None` sentinel.
    pub fn restore(rule: &Rule, snapshot: &ShoeSnapshot) -> Result<Shoe, EngineError> {
        let full_shoe = rule.number_of_decks as usize * 52;
        if snapshot.cards.len() > full_shoe {
            return Err(EngineError::corrupt(format!(
                "shoe holds {} cards but {} decks only have {}",
                snapshot.cards.len(),
                rule.number_of_decks,
                full_shoe
            )));
        }
        for card in &snapshot.cards {
            if card.face_value == 0 || card.face_value > 13 {
                return Err(EngineError::corrupt(format!(
                    "invalid card face value {}",
                    card.face_value
                )));
            }
        }
        let cut_card_index = match snapshot.cut_offset {
            None => 0,
            Some(offset) if offset > snapshot.cards.len() => {
                return Err(EngineError::corrupt(
                    "cut card offset lies beyond the remaining cards",
                ));
            }
            Some(offset) => offset,
        };
        Ok(Shoe {
            number_of_decks: rule.number_of_decks,
            cut_card_min_proportion: rule.cut_card_min_proportion,
            cut_card_max_proportion: rule.cut_card_max_proportion,
            cut_card_index,
            cards: snapshot.cards.clone(),
            current_index: 0,
        })
    }

    fn fill_ordered(&mut self) {
        self.cards.clear();
        for _ in 0..self.number_of_decks {
            for suit in Suit::iter() {
                for face_value in 1..=13 {
                    self.cards.push(Card { face_value, suit });
                }
            }
        }
    }

    fn place_cut_card(&mut self) {
        let proportion = thread_rng()
            .gen_range(self.cut_card_min_proportion..=self.cut_card_max_proportion);
        self.cut_card_index =
            (proportion * (self.number_of_decks as u16 * 52) as f64) as usize;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn number_of_cards_is_correct(shoe: &Shoe) -> bool {
        let mut counts = [0 as u8; 52];
        for card in &shoe.cards {
            let card_integer: u8 = (*card).into();
            counts[card_integer as usize] += 1;
        }

        for i in 0..52 {
            if counts[i] != shoe.number_of_decks {
                return false;
            }
        }
        true
    }

    #[test]
    fn new_shoe_is_ordered() {
        let number_of_decks = 3;
        let shoe = Shoe::new(number_of_decks, 0.5, 0.5);
        assert!(number_of_cards_is_correct(&shoe));
        assert_eq!(shoe.cards.len(), number_of_decks as usize * 52);
        let mut card: Card = Default::default();
        for suit in Suit::iter() {
            card.suit = suit;
            for face_value in 1..=13 {
                card.face_value = face_value;
                let card_integer: u8 = card.into();
                for i in 0..number_of_decks {
                    assert_eq!(card, shoe.cards[card_integer as usize + 52 * i as usize]);
                }
            }
        }
    }

    #[test]
    fn shuffle_keeps_card_counts() {
        let mut shoe = Shoe::new(2, 0.7, 0.8);
        shoe.shuffle();
        assert!(number_of_cards_is_correct(&shoe));
    }

    #[test]
    fn cut_card_lands_between_proportions() {
        let fixed = Shoe::new(6, 0.5, 0.5);
        assert_eq!(fixed.cut_card_index, 156);

        for _ in 0..50 {
            let sampled = Shoe::new(6, 0.7, 0.8);
            assert!(sampled.cut_card_index >= 218);
            assert!(sampled.cut_card_index <= 249);
        }
    }

    #[test]
    fn reached_cut_card_is_sticky_until_rebuild() {
        // Cut card sits at index 2 of a single deck.
        let mut shoe = Shoe::new(1, 0.05, 0.05);
        assert!(!shoe.reached_cut_card());
        shoe.deal_card();
        assert!(!shoe.reached_cut_card());
        shoe.deal_card();
        assert!(shoe.reached_cut_card());
        shoe.deal_card();
        assert!(shoe.reached_cut_card());

        shoe.rebuild();
        assert!(!shoe.reached_cut_card());
        assert_eq!(shoe.remaining(), 52);
    }

    #[test]
    fn exhausted_shoe_rebuilds_itself() {
        let mut shoe = Shoe::new(1, 0.5, 0.5);
        shoe.shuffle();
        for _ in 0..52 {
            shoe.deal_card();
        }
        assert_eq!(shoe.remaining(), 0);
        shoe.deal_card();
        assert_eq!(shoe.remaining(), 51);
    }

    #[test]
    fn snapshot_restores_identical_draw_order() {
        let rule = Rule {
            number_of_decks: 2,
            ..Default::default()
        };
        let mut shoe = Shoe::new(rule.number_of_decks, 0.7, 0.8);
        shoe.shuffle();
        for _ in 0..5 {
            shoe.deal_card();
        }

        let snapshot = shoe.snapshot();
        let mut restored = Shoe::restore(&rule, &snapshot).unwrap();
        assert_eq!(restored.remaining(), shoe.remaining());
        for _ in 0..shoe.remaining() {
            assert_eq!(restored.deal_card(), shoe.deal_card());
        }
    }

    #[test]
    fn snapshot_round_trips_cut_position() {
        let rule = Rule {
            number_of_decks: 1,
            ..Default::default()
        };
        let mut shoe = Shoe::new(1, 0.5, 0.5);
        shoe.shuffle();
        shoe.deal_card();
        let snapshot = shoe.snapshot();
        assert_eq!(snapshot.cut_offset, Some(25));

        let restored = Shoe::restore(&rule, &snapshot).unwrap();
        assert!(!restored.reached_cut_card());
        assert_eq!(restored.cut_card_index, 25);
    }

    #[test]
    fn restore_treats_missing_or_zero_offset_as_reached() {
        let rule = Rule {
            number_of_decks: 1,
            ..Default::default()
        };
        let cards = vec![Card::default(); 10];

        let passed = ShoeSnapshot {
            cards: cards.clone(),
            cut_offset: None,
        };
        assert!(Shoe::restore(&rule, &passed).unwrap().reached_cut_card());

        let zero = ShoeSnapshot {
            cards: cards.clone(),
            cut_offset: Some(0),
        };
        assert!(Shoe::restore(&rule, &zero).unwrap().reached_cut_card());

        let ahead = ShoeSnapshot {
            cards,
            cut_offset: Some(3),
        };
        assert!(!Shoe::restore(&rule, &ahead).unwrap().reached_cut_card());
    }

    #[test]
    fn restore_rejects_impossible_snapshots() {
        let rule = Rule {
            number_of_decks: 1,
            ..Default::default()
        };

        let oversized = ShoeSnapshot {
            cards: vec![Card::default(); 53],
            cut_offset: None,
        };
        assert!(Shoe::restore(&rule, &oversized).is_err());

        let bad_card = ShoeSnapshot {
            cards: vec![Card {
                face_value: 14,
                suit: Suit::Club,
            }],
            cut_offset: None,
        };
        assert!(Shoe::restore(&rule, &bad_card).is_err());

        let bad_offset = ShoeSnapshot {
            cards: vec![Card::default(); 4],
            cut_offset: Some(5),
        };
        assert!(Shoe::restore(&rule, &bad_offset).is_err());
    }

    #[test]
    #[ignore]
    fn examine_shuffle_results() {
        let mut shoe = Shoe::new(2, 0.7, 0.8);
        loop {
            shoe.shuffle();
            assert!(number_of_cards_is_correct(&shoe));
        }
    }
}
