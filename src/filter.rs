use tracing::{debug, trace};
use url::Url;

use crate::page::Page;

pub const LABEL_ALL: &str = "# of channels:";
pub const LABEL_FILTERED: &str = "# of channels with new videos:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterMode {
    All,
    Filtered,
}

impl FilterMode {
    pub fn from_url(url: &Url) -> Self {
        let filtered = url
            .query_pairs()
            .any(|(k, v)| k == "filtered" && v == "true");
        if filtered {
            FilterMode::Filtered
        } else {
            FilterMode::All
        }
    }
}

/// Which filter control was clicked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterTarget {
    ShowAll,
    ShowFiltered,
}

pub struct FilterController;

impl FilterController {
    pub fn apply(page: &mut Page, mode: FilterMode) {
        let all = mode == FilterMode::All;
        page.filter_bar.show_all.active = all;
        page.filter_bar.show_filtered.active = !all;

        if all {
            page.info_label = LABEL_ALL.to_string();
            // Marking only makes sense on the filtered view
            for row in page.table.body.iter_mut() {
                row.action = None;
            }
            page.bulk_button = None;
        } else {
            page.info_label = LABEL_FILTERED.to_string();
        }
        debug!("Applied filter mode {:?}", mode);
    }

    /// URL the page navigates to when a filter control is clicked.
    pub fn navigate(current: &Url, target: FilterTarget) -> Url {
        let mut next = current.clone();
        match target {
            FilterTarget::ShowAll => next.set_query(None),
            FilterTarget::ShowFiltered => next.set_query(Some("filtered=true")),
        }
        trace!("Navigate {} => {}", current, next);
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::PageSnapshot;

    fn page(url: &str) -> Page {
        let snapshot = PageSnapshot::parse(
            r#"{"server_basepath": "http://localhost:8900",
                "channels": [{"title": "A", "channel_id": "UCa"}, {"title": "B", "channel_id": "UCb"}]}"#,
        )
        .unwrap();
        Page::render(&snapshot, Url::parse(url).unwrap())
    }

    #[test]
    fn mode_is_read_from_query() {
        let url = Url::parse("http://localhost:8900/check-youtube?filtered=true").unwrap();
        assert_eq!(FilterMode::from_url(&url), FilterMode::Filtered);
        let url = Url::parse("http://localhost:8900/check-youtube?filtered=false").unwrap();
        assert_eq!(FilterMode::from_url(&url), FilterMode::All);
        let url = Url::parse("http://localhost:8900/check-youtube").unwrap();
        assert_eq!(FilterMode::from_url(&url), FilterMode::All);
    }

    #[test]
    fn all_mode_strips_viewed_actions() {
        let mut p = page("http://localhost:8900/check-youtube");
        FilterController::apply(&mut p, FilterMode::All);

        assert!(p.filter_bar.show_all.active);
        assert!(!p.filter_bar.show_filtered.active);
        assert_eq!(p.info_label, LABEL_ALL);
        assert_eq!(p.viewed_action_count(), 0);
        assert_eq!(p.table.body.len(), 2);
    }

    #[test]
    fn filtered_mode_keeps_viewed_actions() {
        let mut p = page("http://localhost:8900/check-youtube?filtered=true");
        FilterController::apply(&mut p, FilterMode::Filtered);

        assert!(p.filter_bar.show_filtered.active);
        assert!(!p.filter_bar.show_all.active);
        assert_eq!(p.info_label, LABEL_FILTERED);
        assert!(p.table.body.iter().all(|r| r.action.is_some()));
        assert!(p.bulk_button.is_some());
    }

    #[test]
    fn navigation_rewrites_query() {
        let url = Url::parse("http://localhost:8900/check-youtube?filtered=true&x=1").unwrap();
        let all = FilterController::navigate(&url, FilterTarget::ShowAll);
        assert_eq!(all.as_str(), "http://localhost:8900/check-youtube");

        let filtered = FilterController::navigate(&all, FilterTarget::ShowFiltered);
        assert_eq!(
            filtered.as_str(),
            "http://localhost:8900/check-youtube?filtered=true"
        );
    }
}
