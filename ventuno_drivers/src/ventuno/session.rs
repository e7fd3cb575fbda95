use std::io::{self, Write};

use ventuno::game::hand::{Hand, HandState};
use ventuno::game::{
    Game, GameEventHandler, GameOverReason, GamePhase, HandOutcome, PlayerInput, RoundSummary,
};
use ventuno::{Action, Rule};
use ventuno_drivers::Config;

use crate::store::{HallOfFame, SaveStore};

/// Runs the whole terminal session, from the start menu to the last round.
pub fn run(config: &Config) -> anyhow::Result<()> {
    let rule: Rule = config.rule.clone().try_into()?;
    let store = SaveStore::new(&config.game.save_file);
    let hall_of_fame = HallOfFame::new(&config.game.hall_of_fame_file);

    println!("================================");
    println!("         V E N T U N O          ");
    println!("================================");

    let mut game = match start_menu(&rule, config, &store, &hall_of_fame)? {
        Some(game) => game,
        None => return Ok(()),
    };

    loop {
        let summary = {
            let mut input = TerminalInput;
            let mut handler = TerminalHandler { store: &store };
            game.play_round(&mut input, &mut handler)?
        };
        print_round_summary(&summary);

        if let Some(reason) = summary.game_over {
            finish_game(&game, reason, &store, &hall_of_fame);
            return Ok(());
        }

        if !prompt_yes_no("Play another round?") {
            store.write(&game);
            println!("Game saved. See you at the table!");
            return Ok(());
        }
    }
}

fn start_menu(
    rule: &Rule,
    config: &Config,
    store: &SaveStore,
    hall_of_fame: &HallOfFame,
) -> anyhow::Result<Option<Game>> {
    loop {
        println!();
        if store.exists() {
            println!("[1] Continue the saved game");
        }
        println!("[2] Start a new game");
        println!("[3] Show the hall of fame");
        if store.exists() {
            println!("[4] Delete the saved game");
        }
        println!("[5] Quit");

        match prompt_line("> ").trim() {
            "1" if store.exists() => match store.load(rule) {
                Some(game) => {
                    if game.get_current_game_phase() == GamePhase::GameOver {
                        println!("The saved game is already finished, start a new one.");
                        store.delete();
                    } else {
                        println!("Welcome back, {}!", game.get_players()[0].name);
                        return Ok(Some(game));
                    }
                }
                None => println!("The save file cannot be used, start a new game instead."),
            },
            "2" => {
                let name = match &config.table.human_name {
                    Some(name) => name.clone(),
                    None => prompt_name(),
                };
                let table = config.table.to_table_config(name)?;
                println!(
                    "Taking a seat with {} other players. Good luck, {}!",
                    table.cpu_players, table.human_name
                );
                return Ok(Some(Game::new(rule, &table)));
            }
            "3" => match hall_of_fame.read() {
                Some(text) if !text.trim().is_empty() => {
                    println!();
                    println!("-------- Hall of fame --------");
                    print!("{}", text);
                }
                _ => println!("The hall of fame is still empty."),
            },
            "4" if store.exists() => {
                if prompt_yes_no("Really delete the saved game?") {
                    store.delete();
                    println!("Saved game deleted.");
                }
            }
            "5" => return Ok(None),
            _ => println!("Please pick one of the listed options."),
        }
    }
}

struct TerminalInput;

impl PlayerInput for TerminalInput {
    fn place_bet(&mut self, game: &Game) -> u32 {
        let human = &game.get_players()[0];
        println!();
        println!(
            "Round {} - your balance is {}",
            game.get_rounds_played() + 1,
            human.balance
        );
        prompt_number("Your bet: ")
    }

    fn insurance_stake(&mut self, _game: &Game, max_stake: u32) -> u32 {
        println!("The dealer shows an ace.");
        if !prompt_yes_no("Buy insurance?") {
            return 0;
        }
        prompt_number(&format!("Insurance stake (up to {}): ", max_stake))
    }

    fn choose_action(&mut self, game: &Game, options: &[Action]) -> Action {
        if let Some((player_index, hand_index)) = game.get_current_turn() {
            let hand = &game.get_players()[player_index].hands[hand_index];
            println!();
            println!("Your hand: {} ({})", format_hand(hand), hand.total());
        }
        loop {
            let mut legend = String::new();
            for action in options {
                if !legend.is_empty() {
                    legend.push_str(", ");
                }
                legend.push_str(action_legend(*action));
            }
            let line = prompt_line(&format!("Your move ({}): ", legend));
            let action = match line.trim().to_lowercase().as_str() {
                "h" => Some(Action::Hit),
                "s" => Some(Action::Stand),
                "d" => Some(Action::Double),
                "p" => Some(Action::Split),
                "r" => Some(Action::Surrender),
                _ => None,
            };
            match action {
                Some(action) if options.contains(&action) => return action,
                _ => println!("That is not one of the offered moves."),
            }
        }
    }

    fn reject(&mut self, reason: &str) {
        println!("{}", reason);
    }
}

struct TerminalHandler<'a> {
    store: &'a SaveStore,
}

impl GameEventHandler for TerminalHandler<'_> {
    fn on_round_started(&mut self, round_number: u32) {
        println!();
        println!("========== Round {} ==========", round_number);
    }

    fn on_shoe_rebuilt(&mut self, remaining_cards: usize) {
        println!(
            "The cut card came up, a fresh shoe of {} cards is in play.",
            remaining_cards
        );
    }

    fn on_cards_dealt(&mut self, game: &Game) {
        render_table(game);
    }

    fn on_insurance_resolved(&mut self, _game: &Game, dealer_natural: bool) {
        if dealer_natural {
            println!("The dealer has a natural.");
        } else {
            println!("No dealer natural, insurance stakes are gone.");
        }
    }

    fn on_action(&mut self, game: &Game, player_index: usize, hand_index: usize, action: Action) {
        let player = &game.get_players()[player_index];
        let hand = &player.hands[hand_index];
        println!(
            "{} {}: {} ({}){}",
            player.name,
            action_verb(action),
            format_hand(hand),
            hand.total(),
            hand_note(hand)
        );
    }

    fn on_dealer_played(&mut self, game: &Game) {
        let dealer = game.get_dealer();
        println!(
            "Dealer: {} ({})",
            format_hand(&dealer.hand),
            dealer.hand.total()
        );
    }

    fn on_round_settled(&mut self, _summary: &RoundSummary) {}

    fn on_game_over(&mut self, _reason: GameOverReason) {}

    fn on_commit(&mut self, game: &Game) {
        self.store.write(game);
    }
}

fn render_table(game: &Game) {
    println!();
    let dealer = game.get_dealer();
    if dealer.hole_card_hidden && dealer.hand.cards.len() >= 2 {
        println!("Dealer: {} ??", dealer.hand.cards[0]);
    } else {
        println!(
            "Dealer: {} ({})",
            format_hand(&dealer.hand),
            dealer.hand.total()
        );
    }

    let current_turn = game.get_current_turn();
    for (player_index, player) in game.get_players().iter().enumerate() {
        if player.hands[0].bet == 0 {
            continue;
        }
        for (hand_index, hand) in player.hands.iter().enumerate() {
            let marker = {
                if current_turn == Some((player_index, hand_index)) {
                    ">"
                } else {
                    " "
                }
            };
            println!(
                "{} {:<12} {} ({}) bet {}{}",
                marker,
                player.name,
                format_hand(hand),
                hand.total(),
                hand.bet,
                hand_note(hand)
            );
        }
    }
}

fn format_hand(hand: &Hand) -> String {
    let mut text = String::new();
    for card in &hand.cards {
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(&card.to_string());
    }
    text
}

fn hand_note(hand: &Hand) -> &'static str {
    if hand.is_natural() {
        " - natural!"
    } else {
        match hand.state {
            HandState::Busted => " - busted",
            HandState::Surrendered => " - surrendered",
            _ => "",
        }
    }
}

fn action_legend(action: Action) -> &'static str {
    match action {
        Action::Hit => "[h]it",
        Action::Stand => "[s]tand",
        Action::Double => "[d]ouble",
        Action::Split => "s[p]lit",
        Action::Surrender => "su[r]render",
    }
}

fn action_verb(action: Action) -> &'static str {
    match action {
        Action::Hit => "hits",
        Action::Stand => "stands",
        Action::Double => "doubles down",
        Action::Split => "splits",
        Action::Surrender => "surrenders",
    }
}

fn outcome_text(outcome: HandOutcome) -> &'static str {
    match outcome {
        HandOutcome::Win => "won",
        HandOutcome::NaturalWin => "won with a natural",
        HandOutcome::Push => "pushed",
        HandOutcome::Loss => "lost",
        HandOutcome::Surrender => "surrendered",
    }
}

fn print_round_summary(summary: &RoundSummary) {
    println!();
    println!("-------- Round {} results --------", summary.rounds_played);
    for result in &summary.results {
        let outcomes = {
            let mut text = String::new();
            for outcome in &result.outcomes {
                if !text.is_empty() {
                    text.push_str(", ");
                }
                text.push_str(outcome_text(*outcome));
            }
            text
        };
        println!(
            "{:<12} {:<24} {:>+5}  balance {}",
            result.name, outcomes, result.net, result.balance
        );
    }
}

fn finish_game(game: &Game, reason: GameOverReason, store: &SaveStore, hall_of_fame: &HallOfFame) {
    println!();
    match reason {
        GameOverReason::HouseWins => {
            println!("Your balance is empty. The house wins this one.");
            hall_of_fame.append(
                "the house cleaned out the table",
                game.get_dealer().bankroll,
                game.get_rounds_played(),
            );
        }
        GameOverReason::PlayerWins => {
            let name = &game.get_players()[0].name;
            println!("The house is broke. {} beat the casino!", name);
            hall_of_fame.append(
                &format!("{} broke the bank", name),
                game.get_players()[0].balance,
                game.get_rounds_played(),
            );
        }
    }
    print_final_statistics(game);
    store.delete();
}

fn print_final_statistics(game: &Game) {
    println!();
    println!("-------- Final statistics --------");
    println!(
        "{:<12} {:>6} {:>6} {:>7} {:>7} {:>7} {:>8}",
        "Player", "Hands", "Wins", "Losses", "Pushes", "Win %", "Net"
    );
    for player in game.get_players() {
        let stats = &player.stats;
        if stats.hands_played == 0 {
            continue;
        }
        let win_rate = stats.wins as f64 / stats.hands_played as f64 * 100.0;
        println!(
            "{:<12} {:>6} {:>6} {:>7} {:>7} {:>6.1}% {:>8}",
            player.name,
            stats.hands_played,
            stats.wins,
            stats.losses,
            stats.pushes,
            win_rate,
            stats.net_gain
        );
    }
    println!("Rounds played: {}", game.get_rounds_played());
}

fn prompt_line(prompt: &str) -> String {
    print!("{}", prompt);
    io::stdout().flush().unwrap();
    let mut line = String::new();
    io::stdin().read_line(&mut line).unwrap();
    line
}

fn prompt_number(prompt: &str) -> u32 {
    loop {
        let line = prompt_line(prompt);
        match line.trim().parse() {
            Ok(number) => return number,
            Err(_) => println!("Please enter a whole number."),
        }
    }
}

fn prompt_yes_no(question: &str) -> bool {
    loop {
        let line = prompt_line(&format!("{} [y/n] ", question));
        match line.trim().to_lowercase().as_str() {
            "y" | "yes" => return true,
            "n" | "no" => return false,
            _ => println!("Please answer y or n."),
        }
    }
}

fn prompt_name() -> String {
    loop {
        let line = prompt_line("What is your name? ");
        let name = line.trim();
        if !name.is_empty() {
            return String::from(name);
        }
        println!("A name cannot be empty.");
    }
}
