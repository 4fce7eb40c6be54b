use std::fs::File;
use std::thread::sleep;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rand::rngs::StdRng;
use rand::SeedableRng;
use simplelog::{Config as LogConfig, WriteLogger};

use tick_snake::config::{Cli, Config};
use tick_snake::game::{SnakeGame, TickOutcome};
use tick_snake::input::InputTranslator;
use tick_snake::term::{run_on, TermManager};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.config()?;

    // The terminal is in raw mode while playing, so logs go to a file
    let log_file = File::create(&cli.log_file)
        .with_context(|| format!("Error creating log file {}", cli.log_file.display()))?;
    WriteLogger::init(cli.log_level, LogConfig::default(), log_file).context("Error initializing logger")?;

    info!("Starting with {:?}", config);

    let mut term = TermManager::new(&config)?;
    run_on(&mut term, |term| play(term, config))
}

fn play(term: &mut TermManager, config: Config) -> Result<()> {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let tick = Duration::from_secs(1) / config.ticks_per_second;
    let mut game = SnakeGame::new(config, rng);
    let mut input = InputTranslator::new();

    term.render(&game.view())?;

    loop {
        let started = Instant::now();

        input.refresh(term.read_raw_events()?);
        if game.update(&input) == TickOutcome::Quit {
            info!("Quit requested");
            return Ok(());
        }
        term.render(&game.view())?;

        // An overrun just starts the next tick late
        sleep(tick.saturating_sub(started.elapsed()));
    }
}
