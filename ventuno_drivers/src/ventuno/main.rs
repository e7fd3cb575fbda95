use anyhow::Context;
use clap::Parser;
use ventuno_drivers::{parse_config_from_file, Config};

mod session;
mod store;

const DEFAULT_CONFIG_PATH: &str = "~/.ventuno.yml";

#[derive(Debug, Parser)]
#[command(author, about, long_about = None)]
struct CommandLineArgs {
    /// The path of the config file
    #[arg(short, long, default_value_t = String::from(DEFAULT_CONFIG_PATH))]
    config: String,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = CommandLineArgs::parse();
    let config = {
        if args.config == DEFAULT_CONFIG_PATH {
            let home_dir = home::home_dir().context("cannot find the home directory")?;
            let config_file_path = home_dir.join(".ventuno.yml");
            if config_file_path.exists() {
                let config_file_path = config_file_path
                    .to_str()
                    .context("the home directory path is not valid UTF-8")?;
                parse_config_from_file(config_file_path)?
            } else {
                log::info!(
                    "No config file at {}, playing with the default settings",
                    config_file_path.display()
                );
                Config::default()
            }
        } else {
            parse_config_from_file(&args.config)?
        }
    };

    session::run(&config)
}
