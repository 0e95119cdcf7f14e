#![allow(dead_code)]

use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use chantrack::domain::CTError;
use chantrack::effects::MarkViewed;
use chantrack::page::{Page, PageSnapshot};
use chantrack::{Dashboard, init_page};

pub const ALL_URL: &str = "http://localhost:8900/check-youtube";
pub const FILTERED_URL: &str = "http://localhost:8900/check-youtube?filtered=true";

/// Records every call, tracks how many run at once and fails on a chosen
/// (1 based) call.
pub struct ScriptedEffect {
    calls: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    fail_on_call: Option<usize>,
    delay: Duration,
}

impl ScriptedEffect {
    pub fn ok() -> Arc<Self> {
        Arc::new(Self::build(None))
    }

    pub fn failing_on(call: usize) -> Arc<Self> {
        Arc::new(Self::build(Some(call)))
    }

    fn build(fail_on_call: Option<usize>) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            fail_on_call,
            delay: Duration::from_millis(2),
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl MarkViewed for ScriptedEffect {
    async fn mark_viewed(&self, channel_id: &str) -> Result<(), CTError> {
        let call = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(channel_id.to_string());
            calls.len()
        };
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_on_call == Some(call) {
            return Err(CTError::EffectFailed(format!("could not visit {channel_id}")));
        }
        Ok(())
    }
}

pub fn fixture() -> PageSnapshot {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/channels.json");
    PageSnapshot::load(&path).unwrap()
}

pub fn empty_snapshot() -> PageSnapshot {
    PageSnapshot::parse(r#"{"server_basepath": "http://localhost:8900", "channels": []}"#).unwrap()
}

pub fn render(snapshot: &PageSnapshot, url: &str) -> Page {
    Page::render(snapshot, Url::parse(url).unwrap())
}

pub fn dashboard(page: Page, effect: Arc<ScriptedEffect>) -> Dashboard {
    init_page(page, move |_| {
        let effect: Arc<dyn MarkViewed> = effect;
        Ok(effect)
    })
    .unwrap()
}
