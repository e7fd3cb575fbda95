mod error;
pub mod game;
pub mod snapshot;
pub mod strategy;

pub use error::EngineError;

/// House configuration for a table. Every knob the engine honors lives here;
/// anything else about the game is fixed by the rules of play.
#[derive(Clone, Copy, Debug)]
pub struct Rule {
    pub number_of_decks: u8,
    /// The cut card is placed at a proportion of the shoe sampled uniformly
    /// from this closed range at every build. Equal bounds give a fixed cut.
    pub cut_card_min_proportion: f64,
    pub cut_card_max_proportion: f64,
    pub dealer_hit_on_soft17: bool,
    pub max_split_hands: u8,

    pub payout_blackjack: f64,
    pub payout_insurance: f64,
}

impl Default for Rule {
    fn default() -> Self {
        Rule {
            number_of_decks: 6,
            cut_card_min_proportion: 0.70,
            cut_card_max_proportion: 0.80,
            dealer_hit_on_soft17: false,
            max_split_hands: 4,
            payout_blackjack: 1.5,
            payout_insurance: 2.0,
        }
    }
}

/// Who sits at the table and with how much money.
#[derive(Clone, Debug)]
pub struct TableConfig {
    pub human_name: String,
    pub cpu_players: u8,
    pub starting_balance: u32,
    pub house_bankroll: u32,
}

impl Default for TableConfig {
    fn default() -> Self {
        TableConfig {
            human_name: String::from("Player"),
            cpu_players: 20,
            starting_balance: 500,
            house_bankroll: 10_000,
        }
    }
}

/// A decision a player can take on the hand currently awaiting action.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Action {
    Hit,
    Stand,
    Double,
    Split,
    Surrender,
}
