use std::fs;

use anyhow::Context;
use serde::{Deserialize, Serialize};
use ventuno;

/// Everything the terminal game reads from its YAML config file. Every
/// section and every field is optional, missing pieces fall back to the
/// defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub rule: ConfigRule,
    pub table: ConfigTable,
    pub game: ConfigGame,
}

/// The table rules, mirroring `ventuno::Rule` field by field.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigRule {
    pub number_of_decks: u8,
    pub cut_card_min_proportion: f64,
    pub cut_card_max_proportion: f64,
    pub dealer_hit_on_soft17: bool,
    pub max_split_hands: u8,
    pub payout_blackjack: f64,
    pub payout_insurance: f64,
}

impl Default for ConfigRule {
    fn default() -> ConfigRule {
        let rule = ventuno::Rule::default();
        ConfigRule {
            number_of_decks: rule.number_of_decks,
            cut_card_min_proportion: rule.cut_card_min_proportion,
            cut_card_max_proportion: rule.cut_card_max_proportion,
            dealer_hit_on_soft17: rule.dealer_hit_on_soft17,
            max_split_hands: rule.max_split_hands,
            payout_blackjack: rule.payout_blackjack,
            payout_insurance: rule.payout_insurance,
        }
    }
}

impl TryInto<ventuno::Rule> for ConfigRule {
    type Error = anyhow::Error;

    fn try_into(self) -> Result<ventuno::Rule, Self::Error> {
        if self.number_of_decks == 0 || self.number_of_decks > 8 {
            anyhow::bail!("number_of_decks must be between 1 and 8");
        }
        if self.cut_card_min_proportion <= 0.0
            || self.cut_card_min_proportion > self.cut_card_max_proportion
            || self.cut_card_max_proportion > 1.0
        {
            anyhow::bail!("cut card proportions must satisfy 0 < min <= max <= 1");
        }
        if self.max_split_hands == 0 {
            anyhow::bail!("max_split_hands must be at least 1");
        }
        if self.payout_blackjack <= 0.0 || self.payout_insurance <= 0.0 {
            anyhow::bail!("payouts must be positive");
        }

        Ok(ventuno::Rule {
            number_of_decks: self.number_of_decks,
            cut_card_min_proportion: self.cut_card_min_proportion,
            cut_card_max_proportion: self.cut_card_max_proportion,
            dealer_hit_on_soft17: self.dealer_hit_on_soft17,
            max_split_hands: self.max_split_hands,
            payout_blackjack: self.payout_blackjack,
            payout_insurance: self.payout_insurance,
        })
    }
}

/// Who sits at the table and with how much money. The human's name is only
/// taken from here when set, otherwise the game asks for it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigTable {
    pub human_name: Option<String>,
    pub cpu_players: u8,
    pub starting_balance: u32,
    pub house_bankroll: u32,
}

impl Default for ConfigTable {
    fn default() -> ConfigTable {
        let table = ventuno::TableConfig::default();
        ConfigTable {
            human_name: None,
            cpu_players: table.cpu_players,
            starting_balance: table.starting_balance,
            house_bankroll: table.house_bankroll,
        }
    }
}

impl ConfigTable {
    pub fn to_table_config(&self, human_name: String) -> anyhow::Result<ventuno::TableConfig> {
        if self.starting_balance == 0 {
            anyhow::bail!("starting_balance must be at least 1");
        }
        if self.house_bankroll == 0 {
            anyhow::bail!("house_bankroll must be at least 1");
        }
        Ok(ventuno::TableConfig {
            human_name,
            cpu_players: self.cpu_players,
            starting_balance: self.starting_balance,
            house_bankroll: self.house_bankroll,
        })
    }
}

/// Where the game keeps its files.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigGame {
    pub save_file: String,
    pub hall_of_fame_file: String,
}

impl Default for ConfigGame {
    fn default() -> ConfigGame {
        ConfigGame {
            save_file: String::from("ventuno_save.json"),
            hall_of_fame_file: String::from("hall_of_fame.txt"),
        }
    }
}

/// Reads the content of a given config file and parses it to a Config.
pub fn parse_config_from_file(filename: &str) -> anyhow::Result<Config> {
    let file_content = fs::read_to_string(filename)
        .with_context(|| format!("cannot read config file {}", filename))?;
    let config = serde_yaml::from_str(&file_content)
        .with_context(|| format!("cannot parse config file {}", filename))?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_typical_config_rule() -> ConfigRule {
        ConfigRule {
            number_of_decks: 6,
            cut_card_min_proportion: 0.7,
            cut_card_max_proportion: 0.8,
            dealer_hit_on_soft17: false,
            max_split_hands: 4,
            payout_blackjack: 1.5,
            payout_insurance: 2.0,
        }
    }

    #[test]
    fn can_convert_rule() {
        let config_rule = get_typical_config_rule();
        let converted_rule: ventuno::Rule = config_rule.try_into().unwrap();
        assert_eq!(converted_rule.number_of_decks, 6);
        assert_eq!(converted_rule.cut_card_min_proportion, 0.7);
        assert_eq!(converted_rule.cut_card_max_proportion, 0.8);
        assert_eq!(converted_rule.max_split_hands, 4);
    }

    #[test]
    fn should_return_error_when_converting_rule() {
        let mut config_rule = get_typical_config_rule();
        config_rule.number_of_decks = 9;
        let convert_result: Result<ventuno::Rule, anyhow::Error> = config_rule.try_into();
        assert!(convert_result.is_err());

        let mut config_rule = get_typical_config_rule();
        config_rule.cut_card_min_proportion = 0.9;
        let convert_result: Result<ventuno::Rule, anyhow::Error> = config_rule.try_into();
        assert!(convert_result.is_err());

        let mut config_rule = get_typical_config_rule();
        config_rule.payout_blackjack = 0.0;
        let convert_result: Result<ventuno::Rule, anyhow::Error> = config_rule.try_into();
        assert!(convert_result.is_err());
    }

    #[test]
    fn table_config_takes_the_prompted_name() {
        let config_table = ConfigTable::default();
        let table = config_table
            .to_table_config(String::from("Giulia"))
            .unwrap();
        assert_eq!(table.human_name, "Giulia");
        assert_eq!(table.cpu_players, 20);
        assert_eq!(table.starting_balance, 500);
    }

    #[test]
    fn table_config_rejects_empty_purses() {
        let mut config_table = ConfigTable::default();
        config_table.starting_balance = 0;
        assert!(config_table.to_table_config(String::from("X")).is_err());

        let mut config_table = ConfigTable::default();
        config_table.house_bankroll = 0;
        assert!(config_table.to_table_config(String::from("X")).is_err());
    }

    #[test]
    fn default_config_round_trips_through_yaml() {
        let config = Config::default();
        let text = serde_yaml::to_string(&config).unwrap();
        let parsed: Config = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.rule.number_of_decks, 6);
        assert_eq!(parsed.table.cpu_players, 20);
        assert_eq!(parsed.game.save_file, "ventuno_save.json");
    }

    #[test]
    fn partial_config_falls_back_to_defaults() {
        let parsed: Config = serde_yaml::from_str("table:\n  cpu_players: 5\n").unwrap();
        assert_eq!(parsed.table.cpu_players, 5);
        assert_eq!(parsed.table.starting_balance, 500);
        assert_eq!(parsed.rule.number_of_decks, 6);
        assert_eq!(parsed.game.hall_of_fame_file, "hall_of_fame.txt");
    }
}
