//! Per-tick keyboard state.
//!
//! Raw down/up events are folded into three sets so the game can tell a key
//! that was just pressed (edge) from one that is being held (level).

use std::collections::HashSet;

use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::snake::Direction;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RawEvent {
    Down(KeyCode),
    Up(KeyCode),
    Quit,
}

impl RawEvent {
    /// Translates a terminal event. Anything that is not a key is ignored.
    pub fn from_crossterm(event: &Event) -> Option<RawEvent> {
        match event {
            Event::Key(key) if is_quit(key) && key.kind != KeyEventKind::Release => Some(RawEvent::Quit),
            Event::Key(KeyEvent { code, kind, .. }) => match kind {
                KeyEventKind::Press | KeyEventKind::Repeat => Some(RawEvent::Down(*code)),
                KeyEventKind::Release => Some(RawEvent::Up(*code)),
            },
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct InputTranslator {
    pressed: HashSet<KeyCode>,
    held: HashSet<KeyCode>,
    released: HashSet<KeyCode>,
    quit: bool,
}

impl InputTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a new tick: last tick's releases are forgotten.
    pub fn begin_tick(&mut self) {
        self.released.clear();
    }

    pub fn process<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = RawEvent>,
    {
        for event in events {
            match event {
                RawEvent::Down(key) => {
                    if self.pressed.remove(&key) {
                        // Still down from an earlier tick, so it stops counting as a fresh press
                        self.held.insert(key);
                    } else if !self.held.contains(&key) {
                        self.pressed.insert(key);
                    }
                }
                RawEvent::Up(key) => {
                    if !self.pressed.remove(&key) {
                        self.held.remove(&key);
                    }
                    self.released.insert(key);
                }
                RawEvent::Quit => self.quit = true,
            }
        }
    }

    pub fn refresh<I>(&mut self, events: I)
    where
        I: IntoIterator<Item = RawEvent>,
    {
        self.begin_tick();
        self.process(events);
    }

    pub fn pressed(&self, key: KeyCode) -> bool {
        self.pressed.contains(&key)
    }

    pub fn held(&self, key: KeyCode) -> bool {
        self.held.contains(&key)
    }

    pub fn released(&self, key: KeyCode) -> bool {
        self.released.contains(&key)
    }

    pub fn quit(&self) -> bool {
        self.quit
    }

    /// Whether any key bound to `dir` went down this tick.
    pub fn pressed_direction(&self, dir: Direction) -> bool {
        keys_for(dir).iter().any(|key| self.pressed(*key))
    }
}

pub fn keys_for(dir: Direction) -> &'static [KeyCode] {
    match dir {
        Direction::Up => &[KeyCode::Up, KeyCode::Char('w')],
        Direction::Down => &[KeyCode::Down, KeyCode::Char('s')],
        Direction::Left => &[KeyCode::Left, KeyCode::Char('a')],
        Direction::Right => &[KeyCode::Right, KeyCode::Char('d')],
    }
}

fn is_quit(ev: &KeyEvent) -> bool {
    matches!(ev.code, KeyCode::Char('q'))
        || (ev.code == KeyCode::Char('c') && ev.modifiers.contains(KeyModifiers::CONTROL))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventState, MouseButton, MouseEvent, MouseEventKind};
    use RawEvent::*;

    const K: KeyCode = KeyCode::Up;

    fn key(code: KeyCode, kind: KeyEventKind) -> Event {
        Event::Key(KeyEvent { code, modifiers: KeyModifiers::NONE, kind, state: KeyEventState::NONE })
    }

    #[test]
    fn first_down_is_a_press() {
        let mut input = InputTranslator::new();
        input.refresh([Down(K)]);

        assert!(input.pressed(K));
        assert!(!input.held(K));
        assert!(!input.released(K));
    }

    #[test]
    fn repeated_down_promotes_to_held() {
        let mut input = InputTranslator::new();
        input.refresh([Down(K)]);
        input.refresh([Down(K)]);

        assert!(!input.pressed(K));
        assert!(input.held(K));

        // Further repeats keep it held and never re-press it
        input.refresh([Down(K)]);
        assert!(!input.pressed(K));
        assert!(input.held(K));
    }

    #[test]
    fn press_survives_quiet_ticks() {
        let mut input = InputTranslator::new();
        input.refresh([Down(K)]);
        input.refresh([]);
        assert!(input.pressed(K));
    }

    #[test]
    fn up_releases_for_one_tick() {
        let mut input = InputTranslator::new();
        input.refresh([Down(K)]);
        input.refresh([Down(K)]);
        input.refresh([Up(K)]);

        assert!(!input.pressed(K));
        assert!(!input.held(K));
        assert!(input.released(K));

        input.refresh([]);
        assert!(!input.released(K));
    }

    #[test]
    fn tap_within_one_tick() {
        let mut input = InputTranslator::new();
        input.refresh([Down(K), Up(K)]);
        assert!(!input.pressed(K));
        assert!(input.released(K));

        input.refresh([Down(K)]);
        assert!(input.pressed(K));
    }

    #[test]
    fn keys_are_tracked_independently() {
        let mut input = InputTranslator::new();
        input.refresh([Down(KeyCode::Left), Down(KeyCode::Char('w'))]);
        input.refresh([Down(KeyCode::Left)]);

        assert!(input.held(KeyCode::Left));
        assert!(input.pressed(KeyCode::Char('w')));
        assert!(input.pressed_direction(Direction::Up));
        assert!(!input.pressed_direction(Direction::Left));
    }

    #[test]
    fn quit_sticks() {
        let mut input = InputTranslator::new();
        assert!(!input.quit());
        input.refresh([Quit]);
        input.refresh([]);
        assert!(input.quit());
    }

    #[test]
    fn translates_terminal_events() {
        assert_eq!(RawEvent::from_crossterm(&key(K, KeyEventKind::Press)), Some(Down(K)));
        assert_eq!(RawEvent::from_crossterm(&key(K, KeyEventKind::Repeat)), Some(Down(K)));
        assert_eq!(RawEvent::from_crossterm(&key(K, KeyEventKind::Release)), Some(Up(K)));
        assert_eq!(RawEvent::from_crossterm(&key(KeyCode::Char('q'), KeyEventKind::Press)), Some(Quit));

        let ctrl_c = Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert_eq!(RawEvent::from_crossterm(&ctrl_c), Some(Quit));
    }

    #[test]
    fn ignores_non_key_events() {
        let click = Event::Mouse(MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 4,
            modifiers: KeyModifiers::NONE,
        });
        assert_eq!(RawEvent::from_crossterm(&click), None);
        assert_eq!(RawEvent::from_crossterm(&Event::Resize(80, 24)), None);
        assert_eq!(RawEvent::from_crossterm(&Event::FocusLost), None);
    }
}
