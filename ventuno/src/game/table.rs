use super::hand::Hand;
use crate::strategy::SkillTier;

use rand::seq::SliceRandom;
use rand::RngCore;
use serde::{Deserialize, Serialize};

/// Names handed out to the table computer players, in shuffled order.
pub(crate) static ROSTER: [&str; 48] = [
    "John",
    "Francesco",
    "Michael",
    "Luca",
    "David",
    "Marco",
    "James",
    "Giovanni",
    "Robert",
    "Matteo",
    "William",
    "Alessandro",
    "Anthony",
    "Federico",
    "Daniel",
    "Stefano",
    "Joseph",
    "Angelo",
    "Christopher",
    "Antonio",
    "Paul",
    "Mario",
    "Thomas",
    "Giorgio",
    "Andrew",
    "Riccardo",
    "Nicholas",
    "Enrico",
    "Frank",
    "Simone",
    "Alberto",
    "Christian",
    "Giuseppe",
    "Benjamin",
    "Massimo",
    "Peter",
    "Michele",
    "Leonardo",
    "Patrick",
    "Samuel",
    "Alex",
    "Diego",
    "Jacob",
    "Carlo",
    "Kevin",
    "Nathan",
    "Gabriel",
    "Edward",
];

/// Skill tiers assigned to seats in blocks of five.
static TIER_BLOCK: [SkillTier; 4] = [
    SkillTier::Conservative,
    SkillTier::Aggressive,
    SkillTier::Calculator,
    SkillTier::Unpredictable,
];

/// A seat at the table. The human sits at index 0 and has no skill tier;
/// every computer player carries the tier that drives its strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub balance: u32,
    pub skill: Option<SkillTier>,
    pub hands: Vec<Hand>,
    pub stats: Statistics,
    pub active: bool,
}

impl Player {
    pub fn new_human(name: String, balance: u32) -> Player {
        Player {
            name,
            balance,
            skill: None,
            hands: vec![Hand::new(0)],
            stats: Default::default(),
            active: true,
        }
    }

    pub fn new_cpu(name: String, balance: u32, skill: SkillTier) -> Player {
        Player {
            name,
            balance,
            skill: Some(skill),
            hands: vec![Hand::new(0)],
            stats: Default::default(),
            active: true,
        }
    }

    pub fn is_human(&self) -> bool {
        self.skill.is_none()
    }
}

/// The dealer hand plus the house bankroll it plays for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dealer {
    pub hand: Hand,
    pub hole_card_hidden: bool,
    pub bankroll: u32,
}

impl Dealer {
    pub fn new(bankroll: u32) -> Dealer {
        Dealer {
            hand: Hand::new(0),
            hole_card_hidden: true,
            bankroll,
        }
    }
}

/// Lifetime counters for one player. `wins`, `losses`, `pushes` and
/// `surrenders` sum to `hands_played`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub hands_played: u32,
    pub wins: u32,
    pub losses: u32,
    pub pushes: u32,
    pub busts: u32,
    pub naturals: u32,
    pub doubles: u32,
    pub splits: u32,
    pub surrenders: u32,
    pub insurance_wins: u32,
    pub net_gain: i64,
}

/// Seats `count` computer players with shuffled roster names and skill tiers
/// dealt out in blocks of five.
pub(crate) fn seat_cpus(count: u8, balance: u32, rng: &mut dyn RngCore) -> Vec<Player> {
    let mut names = ROSTER.to_vec();
    names.shuffle(rng);

    let mut players = Vec::with_capacity(count as usize);
    for i in 0..count as usize {
        let name = {
            if i < names.len() {
                names[i].to_string()
            } else {
                format!("CPU-{:02}", i + 1)
            }
        };
        let skill = TIER_BLOCK[(i / 5) % TIER_BLOCK.len()];
        players.push(Player::new_cpu(name, balance, skill));
    }
    players
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::thread_rng;

    #[test]
    fn seats_requested_number_of_cpus() {
        let players = seat_cpus(20, 500, &mut thread_rng());
        assert_eq!(players.len(), 20);
        for player in &players {
            assert_eq!(player.balance, 500);
            assert!(player.active);
            assert!(!player.is_human());
        }
    }

    #[test]
    fn tiers_come_in_blocks_of_five() {
        let players = seat_cpus(20, 500, &mut thread_rng());
        for (i, player) in players.iter().enumerate() {
            let expected = TIER_BLOCK[(i / 5) % TIER_BLOCK.len()];
            assert_eq!(player.skill, Some(expected));
        }

        // A 21st seat wraps around to the first tier again.
        let more = seat_cpus(21, 500, &mut thread_rng());
        assert_eq!(more[20].skill, Some(SkillTier::Conservative));
    }

    #[test]
    fn roster_names_are_unique() {
        let players = seat_cpus(20, 500, &mut thread_rng());
        for i in 0..players.len() {
            for j in (i + 1)..players.len() {
                assert_ne!(players[i].name, players[j].name);
            }
        }
    }

    #[test]
    fn overflow_seats_get_numbered_names() {
        let players = seat_cpus(50, 500, &mut thread_rng());
        assert_eq!(players[48].name, "CPU-49");
        assert_eq!(players[49].name, "CPU-50");
    }
}
