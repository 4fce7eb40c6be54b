use std::io::{Stdout, Write, stdout};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use crossterm::{cursor, execute, queue, style, terminal};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::event::{poll, read, KeyCode, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags};
use log::{debug, info};

use crate::config::{Config, TERM_COLUMNS_PER_CELL as CELL_COLUMNS};
use crate::game::GameView;
use crate::input::RawEvent;
use crate::snake::{Direction::{*, self}, Rect};

const SNAKE_BODY_CHAR: char = '█';
const FOOD_CHAR: char = 'O';
const BACKGROUND_CHAR: char = ' ';

/// Character grid holding one whole frame, border included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u16,
    height: u16,
    cells: Vec<char>,
}

impl Canvas {
    pub fn new(width: u16, height: u16) -> Self {
        Canvas { width, height, cells: vec![BACKGROUND_CHAR; width as usize * height as usize] }
    }

    /// Size needed to show the whole board of `config`, or `None` if it
    /// does not fit in terminal coordinates.
    pub fn for_board(config: &Config) -> Option<Self> {
        let columns = u16::try_from(config.columns()).ok()?;
        let rows = u16::try_from(config.rows()).ok()?;
        let width = columns.checked_mul(CELL_COLUMNS)?.checked_add(2)?;
        let height = rows.checked_add(2)?;
        Some(Canvas::new(width, height))
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn get(&self, (x, y): (u16, u16)) -> char {
        self.cells[self.width as usize * y as usize + x as usize]
    }

    pub fn set(&mut self, (x, y): (u16, u16), ch: char) {
        if x < self.width && y < self.height {
            self.cells[self.width as usize * y as usize + x as usize] = ch;
        }
    }

    pub fn fill(&mut self, ch: char) {
        self.cells.iter_mut().for_each(|c| *c = ch);
    }

    pub fn draw_borders(&mut self) {
        let (width, height) = (self.width, self.height);
        let end_x = width - 1;
        let end_y = height - 1;

        for x in 0..width {
            let ch = if x == 0 || x == end_x {'+'} else {'-'};
            self.set((x, 0), ch);
            self.set((x, end_y), ch);
        }

        for y in 1..end_y {
            self.set((0, y), '|');
            self.set((end_x, y), '|');
        }
    }

    /// Paints the grid cell under `rect`. Boxes off the board are skipped.
    pub fn draw_box(&mut self, rect: &Rect, cell: i32, chars: [char; 2]) {
        let (col, row) = (rect.x.div_euclid(cell), rect.y.div_euclid(cell));
        let max_col = ((self.width - 2) / CELL_COLUMNS) as i32;
        let max_row = (self.height - 2) as i32;

        if col < 0 || row < 0 || col >= max_col || row >= max_row {
            return;
        }

        let x = 1 + col as u16 * CELL_COLUMNS;
        let y = 1 + row as u16;
        self.set((x, y), chars[0]);
        self.set((x + 1, y), chars[1]);
    }

    /// Full frame: background, then body, then food.
    pub fn compose(&mut self, view: &GameView<'_>, cell: i32) {
        self.fill(BACKGROUND_CHAR);
        self.draw_borders();

        for (i, segment) in view.snake.iter().enumerate().rev() {
            let chars = if i == 0 {
                let ch = head_char(segment.direction);
                [ch, ch]
            } else {
                [SNAKE_BODY_CHAR; 2]
            };
            self.draw_box(&segment.rect, cell, chars);
        }

        if let Some(food) = view.extender {
            self.draw_box(food, cell, [FOOD_CHAR; 2]);
        }
    }

    /// Positions whose character differs from `other`, row by row.
    pub fn diff<'a>(&'a self, other: &'a Canvas) -> impl Iterator<Item = ((u16, u16), char)> + 'a {
        let width = self.width as usize;
        self.cells.iter().zip(other.cells.iter()).enumerate()
            .filter(|(_, (new, old))| new != old)
            .map(move |(i, (new, _))| (((i % width) as u16, (i / width) as u16), *new))
    }
}

fn head_char(direction: Option<Direction>) -> char {
    match direction {
        Some(Up) => '^',
        Some(Down) => 'v',
        Some(Left) => '<',
        Some(Right) => '>',
        None => '@',
    }
}

/// Something that has to be put into a special mode before play and back afterwards.
pub trait Screen {
    fn setup(&mut self) -> Result<()>;
    fn restore(&mut self) -> Result<()>;
}

/// Runs `body` on a set-up screen. The screen is restored whatever happens,
/// including when `setup` fails halfway. The first error wins.
pub fn run_on<S, T, F>(screen: &mut S, body: F) -> Result<T>
where
    S: Screen,
    F: FnOnce(&mut S) -> Result<T>,
{
    let res = screen.setup().and_then(|_| body(screen));
    let restored = screen.restore();

    let out = res?;
    restored?;
    Ok(out)
}

/// Emulates key releases for terminals that only report presses: every key
/// goes up at the start of the tick after it went down, so a press is a tap.
#[derive(Debug, Default, Clone)]
pub struct TapEmulator {
    pending_releases: Vec<KeyCode>,
}

impl TapEmulator {
    pub fn translate<I>(&mut self, polled: I) -> Vec<RawEvent>
    where
        I: IntoIterator<Item = RawEvent>,
    {
        let mut events: Vec<RawEvent> = self.pending_releases.drain(..).map(RawEvent::Up).collect();

        for raw in polled {
            if let RawEvent::Down(code) = raw {
                // A second press in the same tick is the same tap
                if self.pending_releases.contains(&code) {
                    continue;
                }
                self.pending_releases.push(code);
            }
            events.push(raw);
        }

        events
    }
}

pub struct TermManager {
    stdout: Stdout,
    cell: i32,
    screen: Canvas,
    frame: Canvas,
    active: bool,
    release_events: bool,
    taps: TapEmulator,
}

impl TermManager {
    pub fn new(config: &Config) -> Result<Self> {
        let (width, height) = terminal::size().context("Error reading terminal size")?;
        let screen = Canvas::for_board(config).context("Board is too large for a terminal")?;

        if width < screen.width() || height < screen.height() {
            bail!(
                "Terminal is {}x{} but the board needs {}x{}",
                width, height, screen.width(), screen.height()
            );
        }

        Ok(TermManager {
            stdout: stdout(),
            cell: config.cell_size,
            frame: screen.clone(),
            screen,
            active: false,
            release_events: false,
            taps: TapEmulator::default(),
        })
    }

    /// Drains every pending terminal event without blocking.
    pub fn read_raw_events(&mut self) -> Result<Vec<RawEvent>> {
        let mut polled = vec![];

        while poll(Duration::from_millis(0)).context("Error polling events")? {
            let event = read().context("Error reading event")?;
            polled.extend(RawEvent::from_crossterm(&event));
        }

        if self.release_events {
            Ok(polled)
        } else {
            Ok(self.taps.translate(polled))
        }
    }

    /// Draws `view`, writing only the characters that changed since the last frame.
    pub fn render(&mut self, view: &GameView<'_>) -> Result<()> {
        self.frame.compose(view, self.cell);

        let mut changed = 0;
        for ((x, y), ch) in self.frame.diff(&self.screen) {
            queue!(self.stdout, cursor::MoveTo(x, y), style::Print(ch)).context("Error drawing")?;
            changed += 1;
        }

        std::mem::swap(&mut self.screen, &mut self.frame);
        self.flush()?;

        if changed > 0 {
            debug!("Redrew {} cells", changed);
        }
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush().context("Error flushing")
    }
}

impl Screen for TermManager {
    fn setup(&mut self) -> Result<()> {
        self.active = true;
        execute!(self.stdout, EnterAlternateScreen).context("Error entering alt screen")?;
        terminal::enable_raw_mode().context("Error setting raw mode")?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking, terminal::Clear(ClearType::All))
            .context("Error preparing screen")?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(self.stdout, PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES))
                .context("Error enabling key release events")?;
            self.release_events = true;
        }
        info!("Key release events {}", if self.release_events {"reported"} else {"emulated"});

        // Force the first frame to be drawn in full
        self.screen.fill('\0');
        Ok(())
    }

    /// Undoes whatever `setup` got through. Every step is attempted; the first error is returned.
    fn restore(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        self.active = false;

        let popped = if self.release_events {
            self.release_events = false;
            execute!(self.stdout, PopKeyboardEnhancementFlags).context("Error disabling key release events")
        } else {
            Ok(())
        };
        let raw = terminal::disable_raw_mode().context("Error resetting raw mode");
        let screen = execute!(self.stdout, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)
            .context("Error leaving alt screen");

        popped.and(raw).and(screen)
    }
}

impl Drop for TermManager {
    // Covers panics and early returns that skipped `restore`
    fn drop(&mut self) {
        let _ = self.restore();
    }
}
