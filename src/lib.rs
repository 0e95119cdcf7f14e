pub mod domain;
pub mod effects;
pub mod filter;
pub mod marker;
pub mod page;
pub mod sort;
pub mod table;
pub mod timestamps;

use std::sync::Arc;
use tracing::info;

use domain::CTError;
use effects::MarkViewed;
use filter::{FilterController, FilterMode};
use marker::ViewedMarker;
use page::{Page, SharedPage, shared};
use sort::SortEngine;

/// A page with all of its behavior attached.
#[derive(Clone)]
pub struct Dashboard {
    pub page: SharedPage,
    pub mode: FilterMode,
    pub marker: ViewedMarker,
    pub sorter: SortEngine,
}

/// Page load entry point. The order matters: sorting rebinds rows through the
/// marker, so the marker has to exist first.
pub fn init_page<F>(mut page: Page, make_effect: F) -> Result<Dashboard, CTError>
where
    F: FnOnce(&str) -> Result<Arc<dyn MarkViewed>, CTError>,
{
    let effect = make_effect(&page.base_path)?;

    let mode = FilterMode::from_url(&page.url);
    FilterController::apply(&mut page, mode);
    timestamps::localize(&mut page);

    let page = shared(page);
    let marker = ViewedMarker::new(page.clone(), effect);
    marker.bind_rows();
    marker.bind_bulk_action();

    let sorter = SortEngine::bind(page.clone(), marker.clone());
    info!("Page ready in {:?} mode", mode);

    Ok(Dashboard {
        page,
        mode,
        marker,
        sorter,
    })
}
