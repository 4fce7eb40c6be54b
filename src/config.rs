use std::path::PathBuf;

use clap::Parser;
use log::LevelFilter;
use thiserror::Error;

use crate::Coords;

pub const TICKS_PER_SECOND: u32 = 10;
pub const WINDOW_SIZE: (i32, i32) = (640, 480);
pub const CELL_SIZE: i32 = 32;
pub const START_LOCATION: Coords = (320, 224);
pub const LOG_FILE: &str = "tick-snake.log";
/// Terminal columns drawn per grid cell, so cells come out roughly square.
pub const TERM_COLUMNS_PER_CELL: u16 = 2;
/// Largest grid whose frame, border included, still fits in terminal coordinates.
pub const MAX_COLUMNS: i32 = (u16::MAX as i32 - 2) / TERM_COLUMNS_PER_CELL as i32;
pub const MAX_ROWS: i32 = u16::MAX as i32 - 2;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("tick rate must be at least 1 tick per second")]
    ZeroTickRate,
    #[error("cell size must be positive, got {0}")]
    BadCellSize(i32),
    #[error("window size {width}x{height} is not a positive multiple of the cell size {cell}")]
    MisalignedWindow { width: i32, height: i32, cell: i32 },
    #[error("start location ({x}, {y}) is not a grid cell inside the window")]
    BadStart { x: i32, y: i32 },
    #[error("a {columns}x{rows} grid is too large to draw, at most {MAX_COLUMNS}x{MAX_ROWS} cells")]
    BoardTooLarge { columns: i32, rows: i32 },
}

/// Fixed parameters of a session. Nothing here changes once the game starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub ticks_per_second: u32,
    pub width: i32,
    pub height: i32,
    pub cell_size: i32,
    pub start: Coords,
    pub seed: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            ticks_per_second: TICKS_PER_SECOND,
            width: WINDOW_SIZE.0,
            height: WINDOW_SIZE.1,
            cell_size: CELL_SIZE,
            start: START_LOCATION,
            seed: None,
        }
    }
}

impl Config {
    pub fn validate(self) -> Result<Self, ConfigError> {
        let cell = self.cell_size;

        if self.ticks_per_second == 0 {
            return Err(ConfigError::ZeroTickRate);
        }
        if cell <= 0 {
            return Err(ConfigError::BadCellSize(cell));
        }
        if self.width <= 0 || self.height <= 0 || self.width % cell != 0 || self.height % cell != 0 {
            return Err(ConfigError::MisalignedWindow { width: self.width, height: self.height, cell });
        }

        if self.columns() > MAX_COLUMNS || self.rows() > MAX_ROWS {
            return Err(ConfigError::BoardTooLarge { columns: self.columns(), rows: self.rows() });
        }

        let (x, y) = self.start;
        if x % cell != 0 || y % cell != 0 || !self.contains((x, y)) {
            return Err(ConfigError::BadStart { x, y });
        }

        Ok(self)
    }

    pub fn columns(&self) -> i32 {
        self.width / self.cell_size
    }

    pub fn rows(&self) -> i32 {
        self.height / self.cell_size
    }

    pub fn contains(&self, (x, y): Coords) -> bool {
        x >= 0 && y >= 0 && x < self.width && y < self.height
    }

    /// Every grid-aligned position in the window, row by row.
    pub fn cells(&self) -> Vec<Coords> {
        let cell = self.cell_size as usize;
        (0..self.height).step_by(cell)
            .flat_map(|y| (0..self.width).step_by(cell).map(move |x| (x, y)))
            .collect()
    }
}

#[derive(Debug, Parser)]
#[command(name = "tick-snake")]
#[command(about = "Grid snake in the terminal. Arrow keys or WASD to steer, q or CTRL+C to quit")]
pub struct Cli {
    #[arg(long, default_value_t = TICKS_PER_SECOND)]
    pub fps: u32,
    #[arg(long, default_value_t = WINDOW_SIZE.0)]
    pub width: i32,
    #[arg(long, default_value_t = WINDOW_SIZE.1)]
    pub height: i32,
    #[arg(long, default_value_t = CELL_SIZE)]
    pub cell_size: i32,
    #[arg(long, default_value_t = START_LOCATION.0, allow_negative_numbers = true)]
    pub start_x: i32,
    #[arg(long, default_value_t = START_LOCATION.1, allow_negative_numbers = true)]
    pub start_y: i32,
    /// Seed for food placement; random when omitted
    #[arg(long)]
    pub seed: Option<u64>,
    #[arg(long, default_value = LOG_FILE)]
    pub log_file: PathBuf,
    #[arg(long, default_value_t = LevelFilter::Info)]
    pub log_level: LevelFilter,
}

impl Cli {
    pub fn config(&self) -> Result<Config, ConfigError> {
        Config {
            ticks_per_second: self.fps,
            width: self.width,
            height: self.height,
            cell_size: self.cell_size,
            start: (self.start_x, self.start_y),
            seed: self.seed,
        }.validate()
    }
}
