use std::fs;
use std::io::Write;
use std::path::PathBuf;

use chrono::Local;
use ventuno::game::Game;
use ventuno::snapshot::GameSnapshot;
use ventuno::Rule;

/// Loads and writes the save file. Read problems are logged and treated as
/// no save, so a damaged file costs the saved game and nothing else.
pub struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub fn new(path: &str) -> SaveStore {
        SaveStore {
            path: PathBuf::from(path),
        }
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub fn load(&self, rule: &Rule) -> Option<Game> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(error) => {
                log::warn!("Cannot read save file {}: {}", self.path.display(), error);
                return None;
            }
        };
        let snapshot: GameSnapshot = match serde_json::from_str(&text) {
            Ok(snapshot) => snapshot,
            Err(error) => {
                log::warn!(
                    "Discarding unreadable save file {}: {}",
                    self.path.display(),
                    error
                );
                return None;
            }
        };
        match Game::restore(rule, snapshot) {
            Ok(game) => Some(game),
            Err(error) => {
                log::warn!("Discarding save file {}: {}", self.path.display(), error);
                None
            }
        }
    }

    pub fn write(&self, game: &Game) {
        let text = match serde_json::to_string_pretty(&game.snapshot()) {
            Ok(text) => text,
            Err(error) => {
                log::warn!("Cannot serialize the game: {}", error);
                return;
            }
        };
        if let Err(error) = fs::write(&self.path, text) {
            log::warn!("Cannot write save file {}: {}", self.path.display(), error);
        }
    }

    pub fn delete(&self) {
        if self.path.exists() {
            if let Err(error) = fs::remove_file(&self.path) {
                log::warn!(
                    "Cannot delete save file {}: {}",
                    self.path.display(),
                    error
                );
            }
        }
    }
}

/// One line per finished game, appended to a plain text file.
pub struct HallOfFame {
    path: PathBuf,
}

impl HallOfFame {
    pub fn new(path: &str) -> HallOfFame {
        HallOfFame {
            path: PathBuf::from(path),
        }
    }

    pub fn append(&self, outcome: &str, winner_balance: u32, rounds: u32) {
        let line = format!(
            "Date: [{}] - Outcome: {} - Winner balance: [{}] - Rounds: [{}]\n",
            Local::now().format("%d-%m-%Y %H:%M"),
            outcome,
            winner_balance,
            rounds
        );
        let result = fs::OpenOptions::new()
            .append(true)
            .create(true)
            .open(&self.path)
            .and_then(|mut file| file.write_all(line.as_bytes()));
        if let Err(error) = result {
            log::warn!(
                "Cannot update the hall of fame {}: {}",
                self.path.display(),
                error
            );
        }
    }

    pub fn read(&self) -> Option<String> {
        fs::read_to_string(&self.path).ok()
    }
}
