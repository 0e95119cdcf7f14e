use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info};
use url::Url;

use crate::domain::CTError;
use crate::table::{Cell, ChannelTable, Column, Counter, Row};

pub const SHOW_ALL_ID: &str = "show-all-btn";
pub const SHOW_FILTERED_ID: &str = "show-filtered-btn";

pub type SharedPage = Arc<Mutex<Page>>;

pub fn shared(page: Page) -> SharedPage {
    Arc::new(Mutex::new(page))
}

// A poisoned page only means an earlier holder panicked, the data is still usable.
pub fn lock(page: &SharedPage) -> MutexGuard<'_, Page> {
    page.lock().unwrap_or_else(PoisonError::into_inner)
}

/// One channel as delivered by the server template.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ChannelEntry {
    pub title: String,
    pub channel_id: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub latest_video_id: String,
    #[serde(default)]
    pub latest_video_url: String,
    #[serde(default)]
    pub latest_video_title: String,
    #[serde(default)]
    pub latest_video_published_at: String,
    #[serde(default)]
    pub latest_video_duration: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PageSnapshot {
    #[serde(default)]
    pub username: String,
    pub server_basepath: String,
    #[serde(default)]
    pub channels: Vec<ChannelEntry>,
}

impl PageSnapshot {
    pub fn load(path: &Path) -> Result<Self, CTError> {
        let raw = fs::read_to_string(path)?;
        let snapshot = Self::parse(&raw)?;
        info!(
            "Loaded page snapshot {:?} with {} channels",
            path,
            snapshot.channels.len()
        );
        Ok(snapshot)
    }

    pub fn parse(raw: &str) -> Result<Self, CTError> {
        Ok(serde_json::from_str(raw)?)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSwitch {
    pub id: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterBar {
    pub show_all: FilterSwitch,
    pub show_filtered: FilterSwitch,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkButton {
    pub listening: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub url: Url,
    pub base_path: String,
    pub username: String,
    pub filter_bar: FilterBar,
    pub info_label: String,
    pub counter: Counter,
    pub bulk_button: Option<BulkButton>,
    pub table: ChannelTable,
}

impl Page {
    /// Builds the page the way the server template lays it out.
    pub fn render(snapshot: &PageSnapshot, url: Url) -> Self {
        let columns = vec![
            Column::sortable("channel-th", "Channel"),
            Column::sortable("video-th", "Last video"),
            Column::sortable("published-th", "Published"),
            Column::sortable("duration-th", "Duration"),
            Column::plain("actions-th", "Actions"),
        ];
        let rows: Vec<Row> = snapshot
            .channels
            .iter()
            .map(|c| {
                let published = if c.latest_video_published_at.is_empty() {
                    Cell::text("")
                } else {
                    Cell::timestamp(&c.latest_video_published_at)
                };
                Row::new(
                    &c.channel_id,
                    vec![
                        Cell::text(&c.title),
                        Cell::text(&c.latest_video_title),
                        published,
                        Cell::text(&c.latest_video_duration),
                        Cell::text("mark as viewed"),
                    ],
                )
            })
            .collect();
        debug!("Rendered {} rows for {}", rows.len(), url);

        Page {
            url,
            base_path: snapshot.server_basepath.trim_end_matches('/').to_string(),
            username: snapshot.username.clone(),
            filter_bar: FilterBar {
                show_all: FilterSwitch {
                    id: SHOW_ALL_ID.to_string(),
                    active: false,
                },
                show_filtered: FilterSwitch {
                    id: SHOW_FILTERED_ID.to_string(),
                    active: false,
                },
            },
            info_label: String::new(),
            counter: Counter::new(rows.len()),
            bulk_button: Some(BulkButton::default()),
            table: ChannelTable::new(columns, rows),
        }
    }

    pub fn with_base_path(mut self, base_path: &str) -> Self {
        self.base_path = base_path.trim_end_matches('/').to_string();
        self
    }

    /// Number of "mark as viewed" elements, per-row controls and the bulk button.
    pub fn viewed_action_count(&self) -> usize {
        let rows = self.table.body.iter().filter(|r| r.action.is_some()).count();
        rows + usize::from(self.bulk_button.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SNAPSHOT: &str = r#"{
        "username": "someone",
        "server_basepath": "http://localhost:8900/",
        "channels": [
            {"title": "Alpha", "channel_id": "UCa", "latest_video_title": "First",
             "latest_video_published_at": "2024-01-01T10:00:00Z", "latest_video_duration": "10:00"},
            {"title": "Beta", "channel_id": "UCb"}
        ]
    }"#;

    #[test]
    fn render_lays_out_rows_and_counter() {
        let snapshot = PageSnapshot::parse(SNAPSHOT).unwrap();
        let page = Page::render(&snapshot, Url::parse("http://localhost:8900/check-youtube").unwrap());

        assert_eq!(page.base_path, "http://localhost:8900");
        assert_eq!(page.username, "someone");
        assert_eq!(page.counter.get(), 2);
        assert_eq!(page.table.columns.len(), 5);
        assert!(!page.table.columns[4].sortable);

        let alpha = page.table.row("row-UCa").unwrap();
        assert_eq!(alpha.cells[2].timestamp.as_deref(), Some("2024-01-01T10:00:00Z"));
        let beta = page.table.row("row-UCb").unwrap();
        assert_eq!(beta.cells[2].timestamp, None);

        // Two row controls plus the bulk button
        assert_eq!(page.viewed_action_count(), 3);
    }

    #[test]
    fn snapshot_without_base_path_is_rejected() {
        assert!(matches!(
            PageSnapshot::parse(r#"{"channels": []}"#),
            Err(CTError::JsonError(_))
        ));
    }
}
