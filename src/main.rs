use clap::Parser;
use codebot::core::config::{self, CliOverrides};
use simplelog::{ConfigBuilder, LevelFilter, WriteLogger};
use std::fs::File;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "codebot", about = "Terminal chat client for an AI coding assistant")]
struct Args {
    /// Unlock the Pro plan affordances
    #[arg(long)]
    premium: bool,

    /// Keep conversations in ~/.codebot/chats/ between runs
    #[arg(long)]
    persist_history: bool,

    /// Delay of the simulated assistant, in milliseconds
    #[arg(long, value_name = "MS")]
    reply_delay_ms: Option<u64>,

    /// Where to write the debug log
    #[arg(long, default_value = "codebot.log")]
    log_file: PathBuf,
}

impl Args {
    /// Flags left off the command line don't override lower layers.
    fn overrides(&self) -> CliOverrides {
        CliOverrides {
            premium: self.premium.then_some(true),
            persist_history: self.persist_history.then_some(true),
            reply_delay_ms: self.reply_delay_ms,
        }
    }
}

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();
    dotenv::dotenv().ok();

    let log_config = ConfigBuilder::new()
        .set_time_format_rfc3339()
        .build();

    if let Ok(log_file) = File::create(&args.log_file) {
        let _ = WriteLogger::init(LevelFilter::Debug, log_config, log_file);
    }

    let file_config = match config::load_config() {
        Ok(file_config) => file_config,
        Err(e) => {
            eprintln!("codebot: {e}");
            eprintln!("Fix or remove ~/.codebot/config.toml and try again.");
            std::process::exit(2);
        }
    };
    let resolved = config::resolve(&file_config, &args.overrides());

    log::info!(
        "CodeBot starting up (premium: {}, persist history: {}, reply delay: {:?})",
        resolved.premium,
        resolved.persist_history,
        resolved.reply_delay
    );

    codebot::tui::run(resolved)
}
