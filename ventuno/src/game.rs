pub mod hand;
pub mod shoe;
pub mod table;

use crate::snapshot::{GameSnapshot, SNAPSHOT_VERSION};
use crate::{Action, EngineError, Rule, TableConfig};
use serde::{Deserialize, Serialize};
use serde_enum_str::{Deserialize_enum_str, Serialize_enum_str};
use strum_macros::EnumIter;
use ventuno_macros::allowed_phase;

use self::hand::{Hand, HandState};
use self::shoe::Shoe;
use self::table::{Dealer, Player};

use rand::thread_rng;
use std::collections::VecDeque;

static FACE_VALUE_TO_BLACKJACK_VALUE: [u8; 13] = [1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 10, 10, 10];
const HUMAN_INDEX: usize = 0;

#[derive(Debug, Clone, Copy, PartialEq, EnumIter, Serialize, Deserialize)]
pub enum Suit {
    Diamond = 0,
    Club,
    Heart,
    Spade,
}

/// Represents a card in the real world with a suit and a face value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Card {
    pub face_value: u8,
    pub suit: Suit,
}

impl Card {
    pub fn blackjack_value(&self) -> u8 {
        FACE_VALUE_TO_BLACKJACK_VALUE[(self.face_value - 1) as usize]
    }
}

impl Default for Card {
    fn default() -> Self {
        Card {
            face_value: 1,
            suit: Suit::Diamond,
        }
    }
}

impl std::fmt::Display for Card {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let suit = match self.suit {
            Suit::Diamond => 'D',
            Suit::Club => 'C',
            Suit::Heart => 'H',
            Suit::Spade => 'S',
        };
        let value = match self.face_value {
            1 => 'A',
            2 => '2',
            3 => '3',
            4 => '4',
            5 => '5',
            6 => '6',
            7 => '7',
            8 => '8',
            9 => '9',
            10 => 'T',
            11 => 'J',
            12 => 'Q',
            13 => 'K',
            _ => panic!("Invalid card face value!"),
        };
        write!(f, "{}{}", suit, value)
    }
}

impl Into<u8> for Card {
    fn into(self) -> u8 {
        self.suit as u8 * 13 + self.face_value - 1
    }
}

impl TryFrom<u8> for Card {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value >= 52 {
            Err(())
        } else {
            let suit = match value / 13 {
                0 => Suit::Diamond,
                1 => Suit::Club,
                2 => Suit::Heart,
                3 => Suit::Spade,
                _ => panic!("Impossible to happen!"),
            };
            let card = Card {
                suit,
                face_value: value % 13 + 1,
            };
            Ok(card)
        }
    }
}

/// The engine is a phase machine. Every operation names the one phase it may
/// be called in and moves the game to the next phase itself.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum GamePhase {
    PlaceBets,
    DealInitialCards,
    Insurance,
    PlayerTurns,
    DealerTurn,
    Settlement,
    GameOver,
}

/// Why the whole game ended.
#[derive(Debug, Clone, Copy, PartialEq, Serialize_enum_str, Deserialize_enum_str)]
pub enum GameOverReason {
    HouseWins,
    PlayerWins,
}

/// How a single hand came out at settlement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HandOutcome {
    Win,
    NaturalWin,
    Push,
    Loss,
    Surrender,
}

/// What one settled round did to every player that took part in it.
#[derive(Debug, Clone, PartialEq)]
pub struct RoundSummary {
    pub rounds_played: u32,
    pub results: Vec<PlayerRoundResult>,
    pub game_over: Option<GameOverReason>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerRoundResult {
    pub name: String,
    pub outcomes: Vec<HandOutcome>,
    /// Money the round moved for this player, insurance included.
    pub net: i64,
    pub balance: u32,
}

/// Runs one table of multi-player blackjack. The human sits at seat 0 and
/// computer players fill the rest; all of them play against the same dealer
/// hand out of a shared shoe. Rendering and persistence stay outside, wired
/// in through the two traits at the bottom of this module.
#[derive(Debug)]
pub struct Game {
    rule: Rule,

    // Table state
    players: Vec<Player>,
    dealer: Dealer,
    shoe: Shoe,
    rounds_played: u32,

    // Round state
    current_game_phase: GamePhase,
    turn_queue: VecDeque<(usize, usize)>,
    game_over_reason: Option<GameOverReason>,
}

impl Game {
    pub fn new(rule: &Rule, table: &TableConfig) -> Game {
        let mut shoe = Shoe::new(
            rule.number_of_decks,
            rule.cut_card_min_proportion,
            rule.cut_card_max_proportion,
        );
        shoe.shuffle();

        let mut players = Vec::with_capacity(table.cpu_players as usize + 1);
        players.push(Player::new_human(
            table.human_name.clone(),
            table.starting_balance,
        ));
        players.extend(table::seat_cpus(
            table.cpu_players,
            table.starting_balance,
            &mut thread_rng(),
        ));

        Game {
            rule: *rule,
            players,
            dealer: Dealer::new(table.house_bankroll),
            shoe,
            rounds_played: 0,
            current_game_phase: GamePhase::PlaceBets,
            turn_queue: VecDeque::new(),
            game_over_reason: None,
        }
    }

    /// Rebuilds a game from a snapshot taken earlier. The snapshot is checked
    /// for shape, not replayed, so a hand-edited file can still describe a
    /// table the engine would never have produced.
    pub fn restore(rule: &Rule, snapshot: GameSnapshot) -> Result<Game, EngineError> {
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(EngineError::corrupt(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }
        if snapshot.players.is_empty() {
            return Err(EngineError::corrupt("snapshot has no players"));
        }
        if snapshot.players[HUMAN_INDEX].skill.is_some() {
            return Err(EngineError::corrupt("the player at seat 0 must be human"));
        }
        for player in &snapshot.players {
            if player.hands.is_empty() {
                return Err(EngineError::corrupt(format!("{} has no hands", player.name)));
            }
        }
        for &(player_index, hand_index) in &snapshot.turn_queue {
            if player_index >= snapshot.players.len()
                || hand_index >= snapshot.players[player_index].hands.len()
            {
                return Err(EngineError::corrupt(format!(
                    "turn queue points at a missing hand ({}, {})",
                    player_index, hand_index
                )));
            }
        }

        let shoe = Shoe::restore(rule, &snapshot.shoe)?;
        Ok(Game {
            rule: *rule,
            players: snapshot.players,
            dealer: snapshot.dealer,
            shoe,
            rounds_played: snapshot.rounds_played,
            current_game_phase: snapshot.current_game_phase,
            turn_queue: snapshot.turn_queue,
            game_over_reason: snapshot.game_over_reason,
        })
    }

    /// Captures the complete game state for persistence.
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot {
            version: SNAPSHOT_VERSION,
            rounds_played: self.rounds_played,
            current_game_phase: self.current_game_phase,
            players: self.players.clone(),
            dealer: self.dealer.clone(),
            shoe: self.shoe.snapshot(),
            turn_queue: self.turn_queue.clone(),
            game_over_reason: self.game_over_reason,
        }
    }

    /// This will run one full round, pulling human decisions from `input` and
    /// driving computer players from their skill tiers. `handler` sees every
    /// state change and gets the final summary. The loop starts from whatever
    /// phase the game is in, so a game restored mid-round picks up exactly
    /// where it left off.
    pub fn play_round<T: PlayerInput, U: GameEventHandler>(
        &mut self,
        input: &mut T,
        handler: &mut U,
    ) -> Result<RoundSummary, EngineError> {
        loop {
            match self.current_game_phase {
                GamePhase::PlaceBets => {
                    handler.on_round_started(self.rounds_played + 1);
                    loop {
                        let bet = input.place_bet(self);
                        match self.place_bets(bet) {
                            Ok(rebuilt) => {
                                if rebuilt {
                                    handler.on_shoe_rebuilt(self.shoe.remaining());
                                }
                                break;
                            }
                            Err(EngineError::InvalidInput { reason }) => input.reject(&reason),
                            Err(error) => return Err(error),
                        }
                    }
                    handler.on_commit(self);
                }
                GamePhase::DealInitialCards => {
                    self.deal_initial_cards()?;
                    handler.on_cards_dealt(self);
                    handler.on_commit(self);
                }
                GamePhase::Insurance => {
                    let max_stake = self.max_insurance_stake();
                    let stake = {
                        if max_stake > 0 {
                            input.insurance_stake(self, max_stake)
                        } else {
                            0
                        }
                    };
                    match self.resolve_insurance(stake) {
                        Ok(dealer_natural) => {
                            handler.on_insurance_resolved(self, dealer_natural);
                            handler.on_commit(self);
                        }
                        Err(EngineError::InvalidInput { reason }) => input.reject(&reason),
                        Err(error) => return Err(error),
                    }
                }
                GamePhase::PlayerTurns => {
                    let (player_index, hand_index) = match self.turn_queue.front() {
                        Some(&turn) => turn,
                        None => {
                            self.current_game_phase = GamePhase::DealerTurn;
                            continue;
                        }
                    };
                    let action = match self.players[player_index].skill {
                        None => {
                            let options = self.get_available_actions();
                            input.choose_action(self, &options)
                        }
                        Some(skill) => {
                            let hand = &self.players[player_index].hands[hand_index];
                            let up = self.dealer.hand.cards[0].blackjack_value();
                            skill.strategy().decide(hand, up, &mut thread_rng())
                        }
                    };
                    match self.apply_action(action) {
                        Ok(_) => {
                            handler.on_action(self, player_index, hand_index, action);
                            handler.on_commit(self);
                        }
                        Err(EngineError::Precondition { reason }) => input.reject(&reason),
                        Err(error) => return Err(error),
                    }
                }
                GamePhase::DealerTurn => {
                    self.dealer_plays()?;
                    handler.on_dealer_played(self);
                    handler.on_commit(self);
                }
                GamePhase::Settlement => {
                    let summary = self.settle_bets()?;
                    handler.on_round_settled(&summary);
                    if let Some(reason) = summary.game_over {
                        handler.on_game_over(reason);
                    }
                    handler.on_commit(self);
                    return Ok(summary);
                }
                GamePhase::GameOver => {
                    return Err(EngineError::WrongPhase {
                        operation: "play_round",
                        phase: self.current_game_phase,
                    });
                }
            }
        }
    }

    /// Can be called at PlaceBets phase.
    /// Call this to open a round with the human bet. Computer players size
    /// their own bets from their tiers, and benched players sit the round
    /// out with an empty hand.
    /// Returns true if the cut card had been reached and the shoe was
    /// rebuilt before dealing.
    #[allowed_phase(PlaceBets)]
    pub fn place_bets(&mut self, human_bet: u32) -> Result<bool, EngineError> {
        let human_balance = self.players[HUMAN_INDEX].balance;
        if human_bet == 0 {
            return Err(EngineError::invalid_input("bet must be at least 1"));
        }
        if human_bet > human_balance {
            return Err(EngineError::invalid_input(format!(
                "bet cannot exceed the balance of {}",
                human_balance
            )));
        }

        let rebuilt = self.shoe.reached_cut_card();
        if rebuilt {
            log::debug!("Cut card reached, rebuilding the shoe");
            self.shoe.rebuild();
        }

        self.dealer.hand = Hand::new(0);
        self.dealer.hole_card_hidden = true;
        self.turn_queue.clear();

        let mut rng = thread_rng();
        for player in &mut self.players {
            let bet = match player.skill {
                None => human_bet,
                Some(skill) => {
                    if player.active {
                        skill.strategy().bet_size(player.balance, &mut rng)
                    } else {
                        0
                    }
                }
            };
            player.balance -= bet;
            player.hands = vec![Hand::new(bet)];
        }

        self.current_game_phase = GamePhase::DealInitialCards;
        Ok(rebuilt)
    }

    /// Can be called at DealInitialCards phase.
    /// Call this to deal two cards to every betting player and to the dealer,
    /// one card each per pass in table order. Naturals are stood right away
    /// and never enter the turn queue.
    /// Returns true if the dealer upcard is an ace and insurance opens.
    #[allowed_phase(DealInitialCards)]
    pub fn deal_initial_cards(&mut self) -> Result<bool, EngineError> {
        for _ in 0..2 {
            for player in &mut self.players {
                if player.hands[0].bet > 0 {
                    let card = self.shoe.deal_card();
                    player.hands[0].receive_card(card);
                }
            }
            let card = self.shoe.deal_card();
            self.dealer.hand.receive_card(card);
        }

        for (i, player) in self.players.iter_mut().enumerate() {
            let hand = &mut player.hands[0];
            if hand.bet == 0 {
                continue;
            }
            if hand.is_natural() {
                hand.state = HandState::Stood;
            } else {
                self.turn_queue.push_back((i, 0));
            }
        }

        let insurance_open = self.dealer.hand.cards[0].blackjack_value() == 1;
        self.current_game_phase = {
            if insurance_open {
                GamePhase::Insurance
            } else if self.turn_queue.is_empty() {
                GamePhase::DealerTurn
            } else {
                GamePhase::PlayerTurns
            }
        };
        Ok(insurance_open)
    }

    /// Can be called at Insurance phase.
    /// Call this to settle the insurance side bet with the human stake, which
    /// may be zero to decline. Computer players never insure. If the dealer
    /// holds a natural the round jumps straight to settlement; otherwise all
    /// stakes are forfeited and play goes on.
    /// Returns true if the dealer turns out to have a natural.
    #[allowed_phase(Insurance)]
    pub fn resolve_insurance(&mut self, human_stake: u32) -> Result<bool, EngineError> {
        let max_stake = self.max_insurance_stake();
        if human_stake > max_stake {
            return Err(EngineError::invalid_input(format!(
                "insurance stake can be at most {}",
                max_stake
            )));
        }

        if human_stake > 0 {
            let human = &mut self.players[HUMAN_INDEX];
            human.balance -= human_stake;
            human.hands[0].insurance = human_stake;
        }

        let dealer_natural = self.dealer.hand.is_natural();
        if dealer_natural {
            self.dealer.hole_card_hidden = false;
            for player in &mut self.players {
                for hand in &player.hands {
                    if hand.insurance == 0 {
                        continue;
                    }
                    let profit = (hand.insurance as f64 * self.rule.payout_insurance) as u32;
                    player.balance += hand.insurance + profit;
                    player.stats.insurance_wins += 1;
                    player.stats.net_gain += profit as i64;
                    self.dealer.bankroll = self.dealer.bankroll.saturating_sub(profit);
                }
            }
            self.turn_queue.clear();
            self.current_game_phase = GamePhase::Settlement;
        } else {
            for player in &mut self.players {
                for hand in &player.hands {
                    if hand.insurance == 0 {
                        continue;
                    }
                    player.stats.net_gain -= hand.insurance as i64;
                    self.dealer.bankroll += hand.insurance;
                }
            }
            self.current_game_phase = {
                if self.turn_queue.is_empty() {
                    GamePhase::DealerTurn
                } else {
                    GamePhase::PlayerTurns
                }
            };
        }
        Ok(dealer_natural)
    }

    /// Can be called at PlayerTurns phase.
    /// Call this to draw a card for the hand at the front of the turn queue.
    /// A hand that reaches 21 stands automatically.
    /// Returns true if the hand is finished with its turn.
    #[allowed_phase(PlayerTurns)]
    pub fn play_hit(&mut self) -> Result<bool, EngineError> {
        let (player_index, hand_index) = self.current_turn_or_err()?;
        let card = self.shoe.deal_card();
        let hand = &mut self.players[player_index].hands[hand_index];
        hand.receive_card(card);
        if hand.is_bust() {
            hand.state = HandState::Busted;
            self.advance_turn();
            return Ok(true);
        }
        if hand.total() == 21 {
            hand.state = HandState::Stood;
            self.advance_turn();
            return Ok(true);
        }
        Ok(false)
    }

    /// Can be called at PlayerTurns phase.
    /// Returns true, as standing always finishes the hand.
    #[allowed_phase(PlayerTurns)]
    pub fn play_stand(&mut self) -> Result<bool, EngineError> {
        let (player_index, hand_index) = self.current_turn_or_err()?;
        self.players[player_index].hands[hand_index].state = HandState::Stood;
        self.advance_turn();
        Ok(true)
    }

    /// Can be called at PlayerTurns phase.
    /// Call this to double the bet on the current hand and draw exactly one
    /// card, after which the hand stands or busts.
    /// Returns true, as a doubled hand is always finished.
    #[allowed_phase(PlayerTurns)]
    pub fn play_double(&mut self) -> Result<bool, EngineError> {
        let (player_index, hand_index) = self.current_turn_or_err()?;
        let player = &self.players[player_index];
        let hand = &player.hands[hand_index];
        if hand.cards.len() != 2 {
            return Err(EngineError::precondition(
                "double down is only allowed on the first two cards",
            ));
        }
        if player.balance < hand.bet {
            return Err(EngineError::precondition(
                "balance cannot cover doubling the bet",
            ));
        }

        let card = self.shoe.deal_card();
        let player = &mut self.players[player_index];
        let bet = player.hands[hand_index].bet;
        player.balance -= bet;
        let hand = &mut player.hands[hand_index];
        hand.double_down();
        hand.receive_card(card);
        hand.state = {
            if hand.is_bust() {
                HandState::Busted
            } else {
                HandState::Stood
            }
        };
        player.stats.doubles += 1;
        self.advance_turn();
        Ok(true)
    }

    /// Can be called at PlayerTurns phase.
    /// Call this to split the current pair into two hands. Each hand draws
    /// its replacement card right away, and the new hand queues up right
    /// behind the current one so it is played in table order.
    /// Returns true if the current hand is finished with its turn, which
    /// happens when its replacement card makes 21.
    #[allowed_phase(PlayerTurns)]
    pub fn play_split(&mut self) -> Result<bool, EngineError> {
        let (player_index, hand_index) = self.current_turn_or_err()?;
        let player = &self.players[player_index];
        let hand = &player.hands[hand_index];
        if !hand.is_pair() {
            return Err(EngineError::precondition(
                "only a pair of equal-valued cards can be split",
            ));
        }
        if player.hands.len() >= self.rule.max_split_hands as usize {
            return Err(EngineError::precondition(format!(
                "a player can have at most {} hands",
                self.rule.max_split_hands
            )));
        }
        if player.balance < hand.bet {
            return Err(EngineError::precondition(
                "balance cannot cover the bet on the split hand",
            ));
        }

        let first_draw = self.shoe.deal_card();
        let second_draw = self.shoe.deal_card();

        let player = &mut self.players[player_index];
        let mut new_hand = player.hands[hand_index].split();
        player.balance -= new_hand.bet;

        let hand = &mut player.hands[hand_index];
        hand.receive_card(first_draw);
        if hand.total() == 21 {
            hand.state = HandState::Stood;
        }
        let original_finished = hand.state != HandState::Playing;

        new_hand.receive_card(second_draw);
        if new_hand.total() == 21 {
            new_hand.state = HandState::Stood;
        }
        let new_hand_playing = new_hand.state == HandState::Playing;
        player.hands.push(new_hand);
        let new_index = player.hands.len() - 1;
        player.stats.splits += 1;

        if new_hand_playing {
            self.turn_queue.insert(1, (player_index, new_index));
        }
        if original_finished {
            self.advance_turn();
        }
        Ok(original_finished)
    }

    /// Can be called at PlayerTurns phase.
    /// Call this to surrender the current hand, keeping half the bet rounded
    /// down. Only an untouched dealt hand can surrender.
    /// Returns true, as a surrendered hand is finished.
    #[allowed_phase(PlayerTurns)]
    pub fn play_surrender(&mut self) -> Result<bool, EngineError> {
        let (player_index, hand_index) = self.current_turn_or_err()?;
        let hand = &self.players[player_index].hands[hand_index];
        if hand.cards.len() != 2 || hand.from_split {
            return Err(EngineError::precondition(
                "surrender is only allowed as the first decision of a dealt hand",
            ));
        }

        let player = &mut self.players[player_index];
        let hand = &mut player.hands[hand_index];
        hand.state = HandState::Surrendered;
        let bet = hand.bet;
        let refund = bet / 2;
        player.balance += refund;
        player.stats.surrenders += 1;
        self.dealer.bankroll += bet - refund;
        self.advance_turn();
        Ok(true)
    }

    /// Can be called at DealerTurn phase.
    /// Call this to reveal the hole card and play out the dealer hand. The
    /// dealer draws up to 17 and stands on any higher total; whether a soft
    /// 17 is hit is the one knob the rule controls.
    #[allowed_phase(DealerTurn)]
    pub fn dealer_plays(&mut self) -> Result<(), EngineError> {
        self.dealer.hole_card_hidden = false;
        loop {
            let must_stand = {
                let actual_sum = self.dealer.hand.total();
                let is_soft = self.dealer.hand.is_soft();
                if actual_sum > 17 {
                    true
                } else if actual_sum < 17 {
                    false
                } else {
                    if !is_soft {
                        true
                    } else {
                        !self.rule.dealer_hit_on_soft17
                    }
                }
            };
            if must_stand {
                break;
            }
            let card = self.shoe.deal_card();
            self.dealer.hand.receive_card(card);
        }
        self.current_game_phase = GamePhase::Settlement;
        Ok(())
    }

    /// Can be called at Settlement phase.
    /// Call this to pay out every hand against the dealer total, update the
    /// statistics and balances, bench broke computer players and close the
    /// round. The round counter advances here and nowhere else.
    /// Returns a summary covering every player that took part.
    #[allowed_phase(Settlement)]
    pub fn settle_bets(&mut self) -> Result<RoundSummary, EngineError> {
        let dealer_total = self.dealer.hand.total();
        let dealer_bust = self.dealer.hand.is_bust();
        let dealer_natural = self.dealer.hand.is_natural();

        let mut results = Vec::new();
        for player in &mut self.players {
            if player.hands[0].bet == 0 {
                continue;
            }
            let mut outcomes = Vec::with_capacity(player.hands.len());
            let mut round_net: i64 = 0;
            for hand in &player.hands {
                player.stats.hands_played += 1;
                if hand.is_natural() {
                    player.stats.naturals += 1;
                }
                if hand.insurance > 0 {
                    // Insurance money already moved; fold it into the summary.
                    if dealer_natural {
                        round_net += (hand.insurance as f64 * self.rule.payout_insurance) as i64;
                    } else {
                        round_net -= hand.insurance as i64;
                    }
                }

                let (outcome, credit) = match hand.state {
                    HandState::Surrendered => {
                        let refund = hand.bet / 2;
                        player.stats.net_gain += refund as i64 - hand.bet as i64;
                        round_net += refund as i64 - hand.bet as i64;
                        (HandOutcome::Surrender, 0)
                    }
                    HandState::Busted => {
                        player.stats.busts += 1;
                        player.stats.losses += 1;
                        player.stats.net_gain -= hand.bet as i64;
                        round_net -= hand.bet as i64;
                        self.dealer.bankroll += hand.bet;
                        (HandOutcome::Loss, 0)
                    }
                    _ => {
                        let total = hand.total();
                        if dealer_bust || total > dealer_total {
                            let profit = {
                                if hand.is_natural() {
                                    (hand.bet as f64 * self.rule.payout_blackjack) as u32
                                } else {
                                    hand.bet
                                }
                            };
                            player.stats.wins += 1;
                            player.stats.net_gain += profit as i64;
                            round_net += profit as i64;
                            self.dealer.bankroll = self.dealer.bankroll.saturating_sub(profit);
                            let outcome = {
                                if hand.is_natural() {
                                    HandOutcome::NaturalWin
                                } else {
                                    HandOutcome::Win
                                }
                            };
                            (outcome, hand.bet + profit)
                        } else if total == dealer_total {
                            player.stats.pushes += 1;
                            (HandOutcome::Push, hand.bet)
                        } else {
                            player.stats.losses += 1;
                            player.stats.net_gain -= hand.bet as i64;
                            round_net -= hand.bet as i64;
                            self.dealer.bankroll += hand.bet;
                            (HandOutcome::Loss, 0)
                        }
                    }
                };
                player.balance += credit;
                outcomes.push(outcome);
            }
            results.push(PlayerRoundResult {
                name: player.name.clone(),
                outcomes,
                net: round_net,
                balance: player.balance,
            });
        }

        self.rounds_played += 1;

        for player in &mut self.players {
            if player.active && !player.is_human() && player.balance == 0 {
                player.active = false;
                log::info!("{} ran out of money and leaves the table", player.name);
            }
        }

        self.game_over_reason = {
            if self.players[HUMAN_INDEX].balance == 0 {
                Some(GameOverReason::HouseWins)
            } else if self.dealer.bankroll == 0 {
                Some(GameOverReason::PlayerWins)
            } else {
                None
            }
        };
        self.current_game_phase = {
            if self.game_over_reason.is_some() {
                GamePhase::GameOver
            } else {
                GamePhase::PlaceBets
            }
        };

        Ok(RoundSummary {
            rounds_played: self.rounds_played,
            results,
            game_over: self.game_over_reason,
        })
    }

    pub fn get_current_game_phase(&self) -> GamePhase {
        self.current_game_phase
    }

    pub fn get_players(&self) -> &[Player] {
        &self.players
    }

    pub fn get_dealer(&self) -> &Dealer {
        &self.dealer
    }

    pub fn get_rounds_played(&self) -> u32 {
        self.rounds_played
    }

    pub fn get_game_over_reason(&self) -> Option<GameOverReason> {
        self.game_over_reason
    }

    /// The (player index, hand index) pair whose turn it is, if any.
    pub fn get_current_turn(&self) -> Option<(usize, usize)> {
        self.turn_queue.front().copied()
    }

    /// Lists the actions open to the hand at the front of the turn queue.
    /// Hit and stand are always in; the rest depend on the hand and balance.
    pub fn get_available_actions(&self) -> Vec<Action> {
        let mut actions = vec![Action::Hit, Action::Stand];
        let (player_index, hand_index) = match self.turn_queue.front() {
            Some(&turn) => turn,
            None => return actions,
        };
        let player = &self.players[player_index];
        let hand = &player.hands[hand_index];
        if hand.cards.len() == 2 && player.balance >= hand.bet {
            actions.push(Action::Double);
        }
        if hand.is_pair()
            && player.hands.len() < self.rule.max_split_hands as usize
            && player.balance >= hand.bet
        {
            actions.push(Action::Split);
        }
        if hand.cards.len() == 2 && !hand.from_split {
            actions.push(Action::Surrender);
        }
        actions
    }

    fn max_insurance_stake(&self) -> u32 {
        let human = &self.players[HUMAN_INDEX];
        (human.hands[0].bet / 2).min(human.balance)
    }

    fn apply_action(&mut self, action: Action) -> Result<bool, EngineError> {
        match action {
            Action::Hit => self.play_hit(),
            Action::Stand => self.play_stand(),
            Action::Double => self.play_double(),
            Action::Split => self.play_split(),
            Action::Surrender => self.play_surrender(),
        }
    }

    fn current_turn_or_err(&self) -> Result<(usize, usize), EngineError> {
        match self.turn_queue.front() {
            Some(&turn) => Ok(turn),
            None => Err(EngineError::precondition("no hand is waiting to act")),
        }
    }

    /// Drops the front hand off the turn queue. When the queue runs out the
    /// dealer is up.
    fn advance_turn(&mut self) {
        self.turn_queue.pop_front();
        if self.turn_queue.is_empty() {
            self.current_game_phase = GamePhase::DealerTurn;
        }
    }
}

/// Decisions for the human seat. `play_round` asks again after a rejection,
/// so implementations can re-prompt freely.
pub trait PlayerInput {
    /// Picks the bet for the coming round.
    fn place_bet(&mut self, game: &Game) -> u32;
    /// Picks the insurance stake, anything from zero up to `max_stake`.
    fn insurance_stake(&mut self, game: &Game, max_stake: u32) -> u32;
    /// Picks one of the offered actions for the hand under play.
    fn choose_action(&mut self, game: &Game, options: &[Action]) -> Action;
    /// Called when the previous answer was not acceptable.
    fn reject(&mut self, reason: &str);
}

/// Observes a round as it unfolds. `on_commit` fires after every state
/// change and is the hook persistence hangs off.
pub trait GameEventHandler {
    fn on_round_started(&mut self, round_number: u32);
    fn on_shoe_rebuilt(&mut self, remaining_cards: usize);
    fn on_cards_dealt(&mut self, game: &Game);
    fn on_insurance_resolved(&mut self, game: &Game, dealer_natural: bool);
    fn on_action(&mut self, game: &Game, player_index: usize, hand_index: usize, action: Action);
    fn on_dealer_played(&mut self, game: &Game);
    fn on_round_settled(&mut self, summary: &RoundSummary);
    fn on_game_over(&mut self, reason: GameOverReason);
    fn on_commit(&mut self, game: &Game);
}
