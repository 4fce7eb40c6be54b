use log::{debug, info};
use rand::seq::SliceRandom;
use rand::Rng;

use crate::config::Config;
use crate::input::InputTranslator;
use crate::snake::{Direction, Rect, Segment, Snake};
use crate::Coords;

/// What a call to [`SnakeGame::update`] did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// A quit was requested; the state was left untouched.
    Quit,
    Moved,
    Ate,
    Reset(ResetCause),
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ResetCause {
    Crashed,
    /// The snake covers the whole board, leaving nowhere to put food.
    BoardFilled,
}

/// Read-only picture of the board handed to the renderer between updates.
#[derive(Debug, Copy, Clone)]
pub struct GameView<'a> {
    pub snake: &'a [Segment],
    pub extender: Option<&'a Rect>,
}

pub struct SnakeGame<R> {
    config: Config,
    cells: Vec<Coords>,
    snake: Snake,
    extender: Option<Rect>,
    direction: Option<Direction>,
    rng: R,
}

impl<R: Rng> SnakeGame<R> {
    pub fn new(config: Config, rng: R) -> Self {
        let cells = config.cells();
        let snake = Snake::new(config.start, config.cell_size);
        SnakeGame { config, cells, snake, extender: None, direction: None, rng }
    }

    /// Advances the game by one tick.
    pub fn update(&mut self, input: &InputTranslator) -> TickOutcome {
        if input.quit() {
            return TickOutcome::Quit;
        }

        self.handle_input(input);
        self.snake.update_direction(self.direction);
        self.snake.move_segments();

        if self.extender.is_none() {
            match self.spawn_extender() {
                Some(rect) => self.extender = Some(rect),
                None => {
                    info!("Board filled at length {}, starting over", self.snake.len());
                    self.reset();
                    return TickOutcome::Reset(ResetCause::BoardFilled);
                }
            }
        }

        let mut outcome = TickOutcome::Moved;
        if self.head_collided_with_extender() {
            self.consume_extender();
            outcome = TickOutcome::Ate;
        }

        if self.game_over() {
            info!("Game over at length {}", self.snake.len());
            self.reset();
            return TickOutcome::Reset(ResetCause::Crashed);
        }

        outcome
    }

    /// Picks up this tick's direction key, refusing to turn straight back.
    /// Nothing blocks the first turn, while the direction is still unset.
    pub fn handle_input(&mut self, input: &InputTranslator) {
        let turn = Direction::ALL.iter().copied().find(|&dir| {
            input.pressed_direction(dir) && self.direction != Some(dir.opposite())
        });

        if let Some(dir) = turn {
            if self.direction != Some(dir) {
                debug!("Heading {:?}", dir);
            }
            self.direction = Some(dir);
        }
    }

    /// Chooses a free cell for the food, or `None` when the snake covers every cell.
    pub fn spawn_extender(&mut self) -> Option<Rect> {
        let snake = &self.snake;
        let choices: Vec<&Coords> = self.cells.iter().filter(|pos| !snake.occupies(**pos)).collect();
        let res = choices.choose(&mut self.rng).copied().copied();

        res.map(|pos| {
            debug!("Food placed at {:?}", pos);
            Rect::new(pos, self.config.cell_size)
        })
    }

    pub fn head_collided_with_extender(&self) -> bool {
        self.extender.map_or(false, |food| self.snake.head_collided_with(&food))
    }

    /// Eats the food and grows by one segment. Fresh food appears next tick.
    pub fn consume_extender(&mut self) {
        self.extender = None;
        self.snake.grow();
        debug!("Grew to length {}", self.snake.len());
    }

    pub fn head_out_of_bounds(&self) -> bool {
        !self.config.contains(self.snake.head().rect.top_left())
    }

    pub fn game_over(&self) -> bool {
        self.snake.head_collided_with_self() || self.head_out_of_bounds()
    }

    pub fn reset(&mut self) {
        self.snake = Snake::new(self.config.start, self.config.cell_size);
        self.extender = None;
        self.direction = None;
    }

    pub fn view(&self) -> GameView<'_> {
        GameView { snake: self.snake.segments(), extender: self.extender.as_ref() }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn snake(&self) -> &Snake {
        &self.snake
    }

    pub fn snake_mut(&mut self) -> &mut Snake {
        &mut self.snake
    }

    pub fn extender(&self) -> Option<Rect> {
        self.extender
    }

    pub fn set_extender(&mut self, extender: Option<Rect>) {
        self.extender = extender;
    }

    pub fn direction(&self) -> Option<Direction> {
        self.direction
    }

    pub fn set_direction(&mut self, direction: Option<Direction>) {
        self.direction = direction;
    }
}
