use std::fmt;

pub const ARROW_NEUTRAL: &str = "⇅";
pub const ARROW_UP: &str = "↑";
pub const ARROW_DOWN: &str = "↓";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortIndicator {
    #[default]
    Neutral,
    Ascending,
    Descending,
}

impl SortIndicator {
    // Neutral -> Ascending -> Descending -> Ascending ...
    pub fn next(self) -> Self {
        match self {
            SortIndicator::Ascending => SortIndicator::Descending,
            SortIndicator::Neutral | SortIndicator::Descending => SortIndicator::Ascending,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            SortIndicator::Neutral => ARROW_NEUTRAL,
            SortIndicator::Ascending => ARROW_UP,
            SortIndicator::Descending => ARROW_DOWN,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub id: String,
    pub title: String,
    pub sortable: bool,
    pub indicator: SortIndicator,
}

impl Column {
    pub fn sortable(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            sortable: true,
            indicator: SortIndicator::Neutral,
        }
    }

    pub fn plain(id: &str, title: &str) -> Self {
        Self {
            id: id.to_string(),
            title: title.to_string(),
            sortable: false,
            indicator: SortIndicator::Neutral,
        }
    }

    pub fn header(&self) -> String {
        if self.sortable {
            format!("{} {}", self.title, self.indicator.arrow())
        } else {
            self.title.clone()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub text: String,
    /// Machine readable instant, rendered separately from `text`
    pub timestamp: Option<String>,
}

impl Cell {
    pub fn text(text: &str) -> Self {
        Self {
            text: text.to_string(),
            timestamp: None,
        }
    }

    pub fn timestamp(ts: &str) -> Self {
        Self {
            text: ts.to_string(),
            timestamp: Some(ts.to_string()),
        }
    }
}

/// The "mark as viewed" control of a single row.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActionControl {
    pub listening: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub id: String,
    pub channel_id: String,
    pub cells: Vec<Cell>,
    pub action: Option<ActionControl>,
}

impl Row {
    pub fn new(channel_id: &str, cells: Vec<Cell>) -> Self {
        Self {
            id: Row::id_for(channel_id),
            channel_id: channel_id.to_string(),
            cells,
            action: Some(ActionControl::default()),
        }
    }

    pub fn id_for(channel_id: &str) -> String {
        format!("row-{channel_id}")
    }
}

/// Number of channels currently displayed. The text shown on the page is
/// derived from the value, never the other way around.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counter {
    value: usize,
}

impl Counter {
    pub fn new(value: usize) -> Self {
        Self { value }
    }

    pub fn get(&self) -> usize {
        self.value
    }

    pub fn decrement(&mut self) {
        self.value = self.value.saturating_sub(1);
    }

    pub fn reset(&mut self) {
        self.value = 0;
    }
}

impl fmt::Display for Counter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChannelTable {
    pub columns: Vec<Column>,
    pub body: Vec<Row>,
}

impl ChannelTable {
    pub fn new(columns: Vec<Column>, body: Vec<Row>) -> Self {
        Self { columns, body }
    }

    pub fn column_index(&self, column_id: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.id == column_id)
    }

    pub fn row(&self, row_id: &str) -> Option<&Row> {
        self.body.iter().find(|r| r.id == row_id)
    }

    pub fn row_mut(&mut self, row_id: &str) -> Option<&mut Row> {
        self.body.iter_mut().find(|r| r.id == row_id)
    }

    pub fn remove_row(&mut self, row_id: &str) -> Option<Row> {
        let idx = self.body.iter().position(|r| r.id == row_id)?;
        Some(self.body.remove(idx))
    }

    pub fn clear_body(&mut self) {
        self.body.clear();
    }

    /// Replaces the whole body. Used after sorting, rows keep their identity.
    pub fn rewrite_body(&mut self, rows: Vec<Row>) {
        self.body = rows;
    }

    pub fn channel_ids(&self) -> Vec<String> {
        self.body.iter().map(|r| r.channel_id.clone()).collect()
    }
}
