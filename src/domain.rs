use std::fmt;
use std::io::Error;
use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use derive_setters::Setters;
use url::Url;

// Crate wide error type. Effect failures are logged where they happen, only
// precondition and loading errors are propagated to the caller.
#[derive(Debug)]
pub enum CTError {
    IoError(Error),
    JsonError(serde_json::Error),
    HttpError(reqwest::Error),
    UrlError(url::ParseError),
    MissingElement(String),
    EffectFailed(String),
}

impl fmt::Display for CTError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CTError::IoError(e) => write!(f, "io error: {e}"),
            CTError::JsonError(e) => write!(f, "invalid page snapshot: {e}"),
            CTError::HttpError(e) => write!(f, "request failed: {e}"),
            CTError::UrlError(e) => write!(f, "invalid url: {e}"),
            CTError::MissingElement(id) => write!(f, "page element \"{id}\" is missing"),
            CTError::EffectFailed(msg) => write!(f, "mark as viewed failed: {msg}"),
        }
    }
}

impl std::error::Error for CTError {}

impl From<Error> for CTError {
    fn from(err: Error) -> Self {
        CTError::IoError(err)
    }
}

impl From<serde_json::Error> for CTError {
    fn from(err: serde_json::Error) -> Self {
        CTError::JsonError(err)
    }
}

impl From<reqwest::Error> for CTError {
    fn from(err: reqwest::Error) -> Self {
        CTError::HttpError(err)
    }
}

impl From<url::ParseError> for CTError {
    fn from(err: url::ParseError) -> Self {
        CTError::UrlError(err)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum EffectKind {
    /// POST to the server's mark-as-viewed endpoint
    Server,
    /// Visit the channel page in the browser
    Visit,
}

#[derive(Parser, Debug)]
#[command(version, about = "Dashboard for tracked channels with new videos")]
pub struct Args {
    /// Page snapshot (JSON) as rendered by the server
    #[arg(short, long, env = "CHANTRACK_PAGE")]
    pub page: String,

    /// URL of the dashboard page, its query selects the view
    #[arg(
        short,
        long,
        env = "CHANTRACK_URL",
        default_value = "http://localhost:8900/check-youtube"
    )]
    pub url: String,

    /// Overrides the server base path found in the snapshot
    #[arg(long, env = "CHANTRACK_BASEPATH")]
    pub base_path: Option<String>,

    #[arg(long, value_enum, default_value_t = EffectKind::Visit)]
    pub effect: EffectKind,

    /// Delay after visiting a channel before it counts as viewed
    #[arg(long, default_value_t = 1)]
    pub settle_ms: u64,

    #[arg(long, default_value = "chantrack.log")]
    pub log_file: String,

    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, default_value_t = 100)]
    pub event_poll_time: u64,
}

#[derive(Debug, Clone, Setters)]
#[setters(prefix = "with_")]
pub struct Config {
    pub page: PathBuf,
    pub url: Url,
    #[setters(strip_option)]
    pub base_path: Option<String>,
    pub effect: EffectKind,
    pub settle: Duration,
    pub log_file: PathBuf,
    pub log_level: String,
    pub event_poll_time: u64,
}

impl Config {
    pub fn new(page: PathBuf, url: Url) -> Self {
        Self {
            page,
            url,
            base_path: None,
            effect: EffectKind::Visit,
            settle: Duration::from_millis(1),
            log_file: PathBuf::from("chantrack.log"),
            log_level: "info".to_string(),
            event_poll_time: 100,
        }
    }

    pub fn from_args(args: Args) -> Result<Self, CTError> {
        let page = shellexpand::full(&args.page)
            .map_err(|e| CTError::IoError(Error::other(e.to_string())))?;
        let log_file = shellexpand::full(&args.log_file)
            .map_err(|e| CTError::IoError(Error::other(e.to_string())))?;
        let url = Url::parse(&args.url)?;

        let mut config = Config::new(PathBuf::from(page.as_ref()), url)
            .with_effect(args.effect)
            .with_settle(Duration::from_millis(args.settle_ms))
            .with_log_file(PathBuf::from(log_file.as_ref()))
            .with_log_level(args.log_level)
            .with_event_poll_time(args.event_poll_time);
        if let Some(base_path) = args.base_path {
            config = config.with_base_path(base_path);
        }
        Ok(config)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Quit,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveBeginning,
    MoveEnd,
    SortColumn,
    MarkViewed,
    MarkAllViewed,
    ShowAll,
    ShowFiltered,
    Help,
    Exit,
}

pub const HELP_TEXT: &str = "
q         Quit
↑/k ↓/j   Move between channels
←/h →/l   Move between columns
g / G     First / last channel
s, Enter  Sort by the selected column (↑ ascending, ↓ descending)
v         Mark selected channel as viewed
A         Mark all channels as viewed
a         Show all channels
f         Show only channels with new videos
?         Show this help
Esc       Close popup
";
