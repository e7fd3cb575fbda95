use serde::{Deserialize, Serialize};

use super::Card;

/// Where a hand currently stands in its turn. A hand leaves `Playing` exactly
/// once and never returns to it within a round.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum HandState {
    Playing,
    Stood,
    Busted,
    Surrendered,
}

/// One playable hand together with the money riding on it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hand {
    pub cards: Vec<Card>,
    pub bet: u32,
    pub insurance: u32,
    pub state: HandState,
    pub doubled: bool,
    pub from_split: bool,
}

impl Hand {
    pub fn new(bet: u32) -> Hand {
        Hand {
            cards: Vec::with_capacity(3),
            bet,
            insurance: 0,
            state: HandState::Playing,
            doubled: false,
            from_split: false,
        }
    }

    pub fn receive_card(&mut self, card: Card) {
        self.cards.push(card);
    }

    /// Best total of the hand. Aces start at 11 and are reduced to 1 one at a
    /// time while the total is over 21.
    pub fn total(&self) -> u16 {
        self.score().0
    }

    /// True if an ace still counts as 11 in the current total.
    pub fn is_soft(&self) -> bool {
        self.score().1
    }

    pub fn is_bust(&self) -> bool {
        self.total() > 21
    }

    /// A natural is 21 on the two dealt cards. Two-card 21s assembled after a
    /// split do not count.
    pub fn is_natural(&self) -> bool {
        self.cards.len() == 2 && !self.from_split && self.total() == 21
    }

    /// Two cards of equal blackjack value, e.g. a king and a ten.
    pub fn is_pair(&self) -> bool {
        self.cards.len() == 2 && self.cards[0].blackjack_value() == self.cards[1].blackjack_value()
    }

    /// Moves the second card into a freshly created hand carrying the same
    /// bet. Both hands are tagged as split hands afterwards.
    pub fn split(&mut self) -> Hand {
        let card = self.cards.pop().unwrap();
        self.from_split = true;
        Hand {
            cards: vec![card],
            bet: self.bet,
            insurance: 0,
            state: HandState::Playing,
            doubled: false,
            from_split: true,
        }
    }

    pub fn double_down(&mut self) {
        self.bet *= 2;
        self.doubled = true;
    }

    fn score(&self) -> (u16, bool) {
        let mut total: u16 = 0;
        let mut aces_as_eleven: u16 = 0;
        for card in &self.cards {
            let value = card.blackjack_value() as u16;
            if value == 1 {
                total += 11;
                aces_as_eleven += 1;
            } else {
                total += value;
            }
        }
        while total > 21 && aces_as_eleven > 0 {
            total -= 10;
            aces_as_eleven -= 1;
        }
        (total, aces_as_eleven > 0)
    }
}

#[cfg(test)]
mod tests {
    use crate::game::Suit;

    use super::*;

    fn card(face_value: u8) -> Card {
        Card {
            face_value,
            suit: Suit::Club,
        }
    }

    fn hand_of(face_values: &[u8]) -> Hand {
        let mut hand = Hand::new(10);
        for face_value in face_values {
            hand.receive_card(card(*face_value));
        }
        hand
    }

    #[test]
    fn total_ignores_card_order() {
        assert_eq!(hand_of(&[5, 13, 1]).total(), 16);
        assert_eq!(hand_of(&[1, 5, 13]).total(), 16);
        assert_eq!(hand_of(&[13, 1, 5]).total(), 16);
    }

    #[test]
    fn aces_reduce_one_at_a_time() {
        let two_aces = hand_of(&[1, 1]);
        assert_eq!(two_aces.total(), 12);
        assert!(two_aces.is_soft());

        let three_aces = hand_of(&[1, 1, 1]);
        assert_eq!(three_aces.total(), 13);
        assert!(three_aces.is_soft());

        let ace_king_ace = hand_of(&[1, 13, 1]);
        assert_eq!(ace_king_ace.total(), 12);
        assert!(!ace_king_ace.is_soft());

        let ace_six = hand_of(&[1, 6]);
        assert_eq!(ace_six.total(), 17);
        assert!(ace_six.is_soft());
    }

    #[test]
    fn natural_is_two_dealt_cards_only() {
        assert!(hand_of(&[1, 13]).is_natural());
        assert!(!hand_of(&[7, 7, 7]).is_natural());

        let mut split_hand = hand_of(&[1, 13]);
        split_hand.from_split = true;
        assert_eq!(split_hand.total(), 21);
        assert!(!split_hand.is_natural());
    }

    #[test]
    fn bust_hand_is_hard() {
        let hand = hand_of(&[10, 9, 5]);
        assert_eq!(hand.total(), 24);
        assert!(hand.is_bust());
        assert!(!hand.is_soft());
    }

    #[test]
    fn empty_hand_scores_zero() {
        let hand = Hand::new(0);
        assert_eq!(hand.total(), 0);
        assert!(!hand.is_soft());
    }

    #[test]
    fn pair_compares_values_not_faces() {
        assert!(hand_of(&[13, 13]).is_pair());
        assert!(hand_of(&[13, 10]).is_pair());
        assert!(!hand_of(&[1, 13]).is_pair());
        assert!(!hand_of(&[8, 8, 8]).is_pair());
    }

    #[test]
    fn split_moves_second_card_and_copies_bet() {
        let mut hand = Hand::new(20);
        hand.receive_card(Card {
            face_value: 8,
            suit: Suit::Heart,
        });
        hand.receive_card(Card {
            face_value: 8,
            suit: Suit::Spade,
        });

        let new_hand = hand.split();
        assert_eq!(hand.cards.len(), 1);
        assert_eq!(hand.cards[0].suit, Suit::Heart);
        assert!(hand.from_split);
        assert_eq!(new_hand.cards.len(), 1);
        assert_eq!(new_hand.cards[0].suit, Suit::Spade);
        assert_eq!(new_hand.bet, 20);
        assert!(new_hand.from_split);
        assert_eq!(new_hand.state, HandState::Playing);
    }

    #[test]
    #[should_panic]
    fn split_on_empty_hand_panics() {
        let mut hand = Hand::new(20);
        hand.split();
    }

    #[test]
    fn double_down_doubles_the_bet() {
        let mut hand = hand_of(&[5, 6]);
        hand.double_down();
        assert_eq!(hand.bet, 20);
        assert!(hand.doubled);
    }
}
