use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tracing::{debug, info, trace};
use url::Url;

use chantrack::Dashboard;
use chantrack::domain::{CTError, HELP_TEXT, Message};
use chantrack::filter::{FilterController, FilterTarget};
use chantrack::marker::MarkOutcome;
use chantrack::page::lock;

pub const MAX_COLUMN_WIDTH: usize = 40;
const ACTION_LABEL: &str = "✓ mark as viewed";

#[derive(Debug, PartialEq)]
pub enum Status {
    READY,
    NAVIGATING,
    QUITTING,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Modus {
    TABLE,
    POPUP,
}

/// Everything the ui needs for one frame.
#[derive(Debug, Clone, Default)]
pub struct UIData {
    pub username: String,
    pub show_all_active: bool,
    pub show_filtered_active: bool,
    pub info_label: String,
    pub counter: String,
    pub bulk_available: bool,
    pub headers: Vec<String>,
    pub widths: Vec<usize>,
    pub rows: Vec<Vec<String>>,
    pub selected_row: usize,
    pub selected_column: usize,
    pub status_message: String,
    pub pending: usize,
    pub show_popup: bool,
    pub popup_message: String,
}

pub struct Model {
    dashboard: Dashboard,
    runtime: Handle,
    pub status: Status,
    modus: Modus,
    curser_row: usize,
    curser_column: usize,
    navigation: Option<Url>,
    pending: usize,
    outcome_tx: UnboundedSender<MarkOutcome>,
    outcome_rx: UnboundedReceiver<MarkOutcome>,
    status_message: String,
}

impl Model {
    pub fn init(dashboard: Dashboard, runtime: Handle) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        let mut model = Self {
            dashboard,
            runtime,
            status: Status::READY,
            modus: Modus::TABLE,
            curser_row: 0,
            curser_column: 0,
            navigation: None,
            pending: 0,
            outcome_tx,
            outcome_rx,
            status_message: String::new(),
        };
        let total = lock(&model.dashboard.page).counter.get();
        model.set_status_message(format!("Loaded {total} channels. Press ? for help."));
        model
    }

    /// Target of a filter switch, once the model is `NAVIGATING`.
    pub fn navigation(&self) -> Option<&Url> {
        self.navigation.as_ref()
    }

    pub fn get_uidata(&self) -> UIData {
        let page = lock(&self.dashboard.page);
        let table = &page.table;

        let headers: Vec<String> = table.columns.iter().map(|c| c.header()).collect();
        let rows: Vec<Vec<String>> = table
            .body
            .iter()
            .map(|row| {
                let mut cells: Vec<String> = row.cells.iter().map(|c| c.text.clone()).collect();
                if let Some(last) = cells.last_mut() {
                    *last = if row.action.is_some() {
                        ACTION_LABEL.to_string()
                    } else {
                        String::new()
                    };
                }
                cells
            })
            .collect();

        let widths = headers
            .iter()
            .enumerate()
            .map(|(cidx, h)| {
                let data_width = rows
                    .iter()
                    .filter_map(|r| r.get(cidx))
                    .map(|c| c.chars().count())
                    .max()
                    .unwrap_or(0);
                std::cmp::min(
                    std::cmp::max(h.chars().count(), data_width),
                    MAX_COLUMN_WIDTH,
                )
            })
            .collect();

        UIData {
            username: page.username.clone(),
            show_all_active: page.filter_bar.show_all.active,
            show_filtered_active: page.filter_bar.show_filtered.active,
            info_label: page.info_label.clone(),
            counter: page.counter.to_string(),
            bulk_available: page.bulk_button.as_ref().is_some_and(|b| b.listening),
            headers,
            widths,
            rows,
            selected_row: self.curser_row,
            selected_column: self.curser_column,
            status_message: self.status_message.clone(),
            pending: self.pending,
            show_popup: self.modus == Modus::POPUP,
            popup_message: HELP_TEXT.to_string(),
        }
    }

    pub fn update(&mut self, message: Option<Message>) -> Result<(), CTError> {
        self.collect_outcomes();

        if let Some(msg) = message {
            match self.modus {
                Modus::TABLE => match msg {
                    Message::Quit => self.quit(),
                    Message::MoveUp => self.curser_row = self.curser_row.saturating_sub(1),
                    Message::MoveDown => self.move_down(),
                    Message::MoveLeft => {
                        self.curser_column = self.curser_column.saturating_sub(1)
                    }
                    Message::MoveRight => self.move_right(),
                    Message::MoveBeginning => self.curser_row = 0,
                    Message::MoveEnd => self.curser_row = self.nrows().saturating_sub(1),
                    Message::SortColumn => self.sort_current_column()?,
                    Message::MarkViewed => self.mark_current_row(),
                    Message::MarkAllViewed => self.mark_all(),
                    Message::ShowAll => self.navigate(FilterTarget::ShowAll),
                    Message::ShowFiltered => self.navigate(FilterTarget::ShowFiltered),
                    Message::Help => self.modus = Modus::POPUP,
                    Message::Exit => (),
                },
                Modus::POPUP => match msg {
                    Message::Quit => self.quit(),
                    Message::Exit | Message::Help => self.modus = Modus::TABLE,
                    _ => (),
                },
            }
        }
        Ok(())
    }

    pub fn quit(&mut self) {
        self.status = Status::QUITTING;
    }

    fn nrows(&self) -> usize {
        lock(&self.dashboard.page).table.body.len()
    }

    fn move_down(&mut self) {
        if self.curser_row + 1 < self.nrows() {
            self.curser_row += 1;
        }
    }

    fn move_right(&mut self) {
        let ncolumns = lock(&self.dashboard.page).table.columns.len();
        if self.curser_column + 1 < ncolumns {
            self.curser_column += 1;
        }
    }

    fn set_status_message(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
    }

    fn collect_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.pending = self.pending.saturating_sub(1);
            trace!("Outcome {:?}", outcome);
            let message = match outcome {
                MarkOutcome::Removed {
                    channel_id,
                    remaining,
                } => format!("Marked {channel_id} as viewed, {remaining} left"),
                MarkOutcome::Cleared { marked } => {
                    format!("Marked all {marked} channels as viewed")
                }
                MarkOutcome::Failed { channel_id, .. } => {
                    format!("Could not mark {channel_id} as viewed")
                }
                MarkOutcome::Ignored => continue,
            };
            self.set_status_message(message);
        }
        // Rows may have disappeared underneath the cursor
        self.curser_row = std::cmp::min(self.curser_row, self.nrows().saturating_sub(1));
    }

    fn sort_current_column(&mut self) -> Result<(), CTError> {
        let column_id = {
            let page = lock(&self.dashboard.page);
            match page.table.columns.get(self.curser_column) {
                Some(column) => column.id.clone(),
                None => return Ok(()),
            }
        };
        if let Some(direction) = self.dashboard.sorter.sort(&column_id)? {
            debug!("Sorted {column_id} {:?}", direction);
            self.set_status_message(format!("Sorted by {column_id} {}", direction.arrow()));
        }
        Ok(())
    }

    fn mark_current_row(&mut self) {
        let row_id = {
            let page = lock(&self.dashboard.page);
            match page.table.body.get(self.curser_row) {
                Some(row) => row.id.clone(),
                None => return,
            }
        };
        let marker = self.dashboard.marker.clone();
        let tx = self.outcome_tx.clone();
        self.pending += 1;
        self.runtime.spawn(async move {
            let outcome = marker.activate_row(&row_id).await;
            if let Err(e) = tx.send(outcome) {
                debug!("Dropped outcome {:?}, model is gone", e.0);
            }
        });
    }

    fn mark_all(&mut self) {
        let marker = self.dashboard.marker.clone();
        let tx = self.outcome_tx.clone();
        self.pending += 1;
        self.set_status_message("Marking all channels as viewed ...");
        self.runtime.spawn(async move {
            let outcome = marker.activate_bulk().await;
            if let Err(e) = tx.send(outcome) {
                debug!("Dropped outcome {:?}, model is gone", e.0);
            }
        });
    }

    fn navigate(&mut self, target: FilterTarget) {
        let current = lock(&self.dashboard.page).url.clone();
        let next = FilterController::navigate(&current, target);
        info!("Navigating to {next}");
        self.navigation = Some(next);
        self.status = Status::NAVIGATING;
    }
}
