use std::time::Duration;
use tracing::trace;

use crate::model::Model;
use chantrack::domain::{CTError, Config, Message};
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &Config) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, _model: &Model) -> Result<Option<Message>, CTError> {
        if event::poll(Duration::from_millis(self.event_poll_time))?
            && let Event::Key(key) = event::read()?
            && key.kind == event::KeyEventKind::Press
        {
            return Ok(self.handle_key(key));
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent) -> Option<Message> {
        let message = match key.code {
            KeyCode::Char('q') => Some(Message::Quit),
            KeyCode::Up | KeyCode::Char('k') => Some(Message::MoveUp),
            KeyCode::Down | KeyCode::Char('j') => Some(Message::MoveDown),
            KeyCode::Left | KeyCode::Char('h') => Some(Message::MoveLeft),
            KeyCode::Right | KeyCode::Char('l') => Some(Message::MoveRight),
            KeyCode::Home | KeyCode::Char('g') => Some(Message::MoveBeginning),
            KeyCode::End | KeyCode::Char('G') => Some(Message::MoveEnd),
            KeyCode::Enter | KeyCode::Char('s') => Some(Message::SortColumn),
            KeyCode::Char('v') => Some(Message::MarkViewed),
            KeyCode::Char('A') => Some(Message::MarkAllViewed),
            KeyCode::Char('a') => Some(Message::ShowAll),
            KeyCode::Char('f') => Some(Message::ShowFiltered),
            KeyCode::Char('?') => Some(Message::Help),
            KeyCode::Esc => Some(Message::Exit),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}
