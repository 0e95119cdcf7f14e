use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::cmp::Ordering;
use std::time::Instant;
use tracing::{debug, trace};

use crate::domain::CTError;
use crate::marker::ViewedMarker;
use crate::page::{SharedPage, lock};
use crate::table::{Cell, SortIndicator};
use crate::timestamps::parse_timestamp;

/// Value part of a sort key. Variant order is significant: every parsed
/// timestamp sorts before any text, so rows with an empty or unparsable
/// timestamp come last when ascending and first when descending.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum KeyValue {
    Timestamp(DateTime<Utc>),
    Text(String),
}

/// Sort key of one row for one column. The pre-sort position breaks ties so
/// the order is total.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct SortKey {
    pub value: KeyValue,
    pub index: usize,
}

impl SortKey {
    pub fn for_cell(cell: Option<&Cell>, index: usize) -> Self {
        let value = match cell {
            Some(cell) => match cell.timestamp.as_deref() {
                Some(ts) => match parse_timestamp(ts) {
                    Some(instant) => KeyValue::Timestamp(instant),
                    None => KeyValue::Text(ts.to_lowercase()),
                },
                None => KeyValue::Text(cell.text.to_lowercase()),
            },
            None => KeyValue::Text(String::new()),
        };
        SortKey { value, index }
    }
}

pub fn compare(a: &SortKey, b: &SortKey, direction: SortIndicator) -> Ordering {
    match direction {
        SortIndicator::Descending => b.cmp(a),
        _ => a.cmp(b),
    }
}

/// Reorders the table when a sortable column header is clicked.
#[derive(Clone)]
pub struct SortEngine {
    page: SharedPage,
    marker: ViewedMarker,
}

impl SortEngine {
    pub fn bind(page: SharedPage, marker: ViewedMarker) -> Self {
        let sortable = lock(&page).table.columns.iter().filter(|c| c.sortable).count();
        debug!("Sorting enabled on {sortable} columns");
        Self { page, marker }
    }

    /// Returns the new indicator of the column, `None` when the column is not
    /// sortable.
    pub fn sort(&self, column_id: &str) -> Result<Option<SortIndicator>, CTError> {
        let start_time = Instant::now();
        let direction = {
            let mut page = lock(&self.page);
            let table = &mut page.table;
            let cidx = table
                .column_index(column_id)
                .ok_or_else(|| CTError::MissingElement(column_id.to_string()))?;
            if !table.columns[cidx].sortable {
                trace!("{column_id} is not sortable");
                return Ok(None);
            }
            let direction = table.columns[cidx].indicator.next();

            let mut keys: Vec<SortKey> = table
                .body
                .par_iter()
                .enumerate()
                .map(|(idx, row)| SortKey::for_cell(row.cells.get(cidx), idx))
                .collect();
            keys.par_sort_unstable_by(|a, b| compare(a, b, direction));

            for (idx, column) in table.columns.iter_mut().enumerate() {
                if idx == cidx {
                    column.indicator = direction;
                } else if column.sortable {
                    column.indicator = SortIndicator::Neutral;
                }
            }

            let mut slots: Vec<_> = table.body.drain(..).map(Some).collect();
            let rows = keys
                .iter()
                .filter_map(|key| slots[key.index].take())
                .collect();
            table.rewrite_body(rows);
            direction
        };

        // Any row that lost its listener in the rewrite gets it back
        self.marker.bind_rows();

        trace!(
            "Sorted by {column_id} {:?} in {}ms",
            direction,
            start_time.elapsed().as_millis()
        );
        Ok(Some(direction))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamps_compare_by_instant() {
        // Lexicographically "2024-01-01T09:00:00+05:00" > "2024-01-01T08:00:00Z"
        let a = SortKey::for_cell(Some(&Cell::timestamp("2024-01-01T09:00:00+05:00")), 0);
        let b = SortKey::for_cell(Some(&Cell::timestamp("2024-01-01T08:00:00Z")), 1);
        assert_eq!(a.cmp(&b), Ordering::Less);
    }

    #[test]
    fn text_keys_ignore_case_and_tie_on_index() {
        let a = SortKey::for_cell(Some(&Cell::text("Beta")), 3);
        let b = SortKey::for_cell(Some(&Cell::text("alpha")), 4);
        let c = SortKey::for_cell(Some(&Cell::text("beta")), 1);
        assert_eq!(b.cmp(&a), Ordering::Less);
        assert_eq!(c.cmp(&a), Ordering::Less);
        assert_eq!(compare(&c, &a, SortIndicator::Descending), Ordering::Greater);
    }

    #[test]
    fn unparsable_timestamp_falls_back_to_lowercase_text() {
        let soon = SortKey::for_cell(Some(&Cell::timestamp("Soon")), 0);
        let later = SortKey::for_cell(Some(&Cell::text("later")), 1);
        assert_eq!(soon.value, KeyValue::Text("soon".to_string()));
        assert_eq!(soon.cmp(&later), Ordering::Greater);
    }

    #[test]
    fn timestamps_sort_before_text() {
        let empty = SortKey::for_cell(Some(&Cell::text("")), 0);
        let dated = SortKey::for_cell(Some(&Cell::timestamp("2024-01-01")), 1);
        assert_eq!(dated.cmp(&empty), Ordering::Less);
        assert_eq!(compare(&dated, &empty, SortIndicator::Descending), Ordering::Greater);
    }

    #[test]
    fn missing_cell_sorts_as_empty_text() {
        let key = SortKey::for_cell(None, 0);
        assert_eq!(key.value, KeyValue::Text(String::new()));
    }
}
