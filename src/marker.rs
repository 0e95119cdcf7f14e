use std::sync::Arc;
use tracing::{debug, error, info, trace};

use crate::effects::MarkViewed;
use crate::page::{SharedPage, lock};

/// Result of activating a "mark as viewed" control.
#[derive(Debug, Clone, PartialEq)]
pub enum MarkOutcome {
    /// The row is gone, `remaining` is the counter afterwards.
    Removed { channel_id: String, remaining: usize },
    /// Every channel was marked and the table body cleared.
    Cleared { marked: usize },
    /// The side effect failed, nothing on the page changed.
    Failed { channel_id: String, reason: String },
    /// The control had no listener, or its row was already removed.
    Ignored,
}

/// Binds the per-row and bulk "mark as viewed" controls and runs them.
#[derive(Clone)]
pub struct ViewedMarker {
    page: SharedPage,
    effect: Arc<dyn MarkViewed>,
}

impl ViewedMarker {
    pub fn new(page: SharedPage, effect: Arc<dyn MarkViewed>) -> Self {
        Self { page, effect }
    }

    /// Attaches the listener to one row's control. A control holds at most one
    /// listener, so binding again is harmless.
    pub fn bind_row_action(&self, row_id: &str) -> bool {
        let mut page = lock(&self.page);
        match page.table.row_mut(row_id).and_then(|r| r.action.as_mut()) {
            Some(control) => {
                if control.listening {
                    trace!("{row_id} is already bound");
                }
                control.listening = true;
                true
            }
            None => false,
        }
    }

    /// Binds every row currently in the table body.
    pub fn bind_rows(&self) -> usize {
        let row_ids: Vec<String> = lock(&self.page)
            .table
            .body
            .iter()
            .map(|r| r.id.clone())
            .collect();
        let bound = row_ids
            .iter()
            .filter(|id| self.bind_row_action(id))
            .count();
        debug!("Bound {bound} row actions");
        bound
    }

    /// The bulk control stays inert when there is nothing to mark.
    pub fn bind_bulk_action(&self) -> bool {
        let mut page = lock(&self.page);
        if page.table.body.is_empty() {
            debug!("No rows, bulk action left unbound");
            return false;
        }
        match page.bulk_button.as_mut() {
            Some(button) => {
                button.listening = true;
                true
            }
            None => false,
        }
    }

    pub async fn activate_row(&self, row_id: &str) -> MarkOutcome {
        let (channel_id, total) = {
            let page = lock(&self.page);
            match page.table.row(row_id) {
                Some(row) if row.action.as_ref().is_some_and(|a| a.listening) => {
                    (row.channel_id.clone(), page.counter.get())
                }
                _ => return MarkOutcome::Ignored,
            }
        };
        trace!("Marking {channel_id} as viewed, {total} channels displayed");

        if let Err(e) = self.effect.mark_viewed(&channel_id).await {
            error!("Failed to mark {channel_id} as viewed: {e}");
            return MarkOutcome::Failed {
                channel_id,
                reason: e.to_string(),
            };
        }

        // Removal and decrement happen together so the counter follows the body
        let mut page = lock(&self.page);
        if page.table.remove_row(row_id).is_none() {
            debug!("{row_id} was removed while {channel_id} was being marked");
            return MarkOutcome::Ignored;
        }
        page.counter.decrement();
        info!("Marked {channel_id} as viewed");
        MarkOutcome::Removed {
            channel_id,
            remaining: page.counter.get(),
        }
    }

    /// Marks every channel one after the other, the next visit only starts
    /// once the previous one settled. The body is only cleared when all of
    /// them succeeded.
    pub async fn activate_bulk(&self) -> MarkOutcome {
        let channel_ids = {
            let page = lock(&self.page);
            if !page.bulk_button.as_ref().is_some_and(|b| b.listening) {
                return MarkOutcome::Ignored;
            }
            page.table.channel_ids()
        };

        for (step, channel_id) in channel_ids.iter().enumerate() {
            if let Err(e) = self.effect.mark_viewed(channel_id).await {
                error!(
                    "Marking all as viewed stopped at {}/{} ({channel_id}): {e}",
                    step + 1,
                    channel_ids.len()
                );
                return MarkOutcome::Failed {
                    channel_id: channel_id.clone(),
                    reason: e.to_string(),
                };
            }
        }

        let mut page = lock(&self.page);
        page.table.clear_body();
        page.counter.reset();
        info!("Marked {} channels as viewed", channel_ids.len());
        MarkOutcome::Cleared {
            marked: channel_ids.len(),
        }
    }
}
