use clap::Parser;
use std::fs::File;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use tracing::{error, info};
use tracing_error::ErrorLayer;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use url::Url;

mod controller;
mod model;
mod ui;

use chantrack::domain::{Args, CTError, Config, EffectKind};
use chantrack::effects::{ChannelVisitor, MarkViewed, ServerMarker};
use chantrack::page::{Page, PageSnapshot};
use chantrack::{Dashboard, init_page};
use controller::Controller;
use model::{Model, Status};
use ui::TableUI;

fn main() -> ExitCode {
    match run(Args::parse()) {
        Err(e) => {
            error!("{e}");
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
        Ok(_) => ExitCode::SUCCESS,
    }
}

fn init_logging(config: &Config) -> Result<(), CTError> {
    let log_file = File::create(&config.log_file)?;
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(Mutex::new(log_file))
                .with_ansi(false),
        )
        .with(ErrorLayer::default())
        .init();
    Ok(())
}

fn run(args: Args) -> Result<(), CTError> {
    let config = Config::from_args(args)?;
    init_logging(&config)?;
    info!("Starting chantrack on {}", config.url);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let mut terminal = ratatui::init();
    let mut url = config.url.clone();
    let result = loop {
        let outcome = load_dashboard(&config, url.clone()).and_then(|dashboard| {
            let mut model = Model::init(dashboard, runtime.handle().clone());
            let controller = Controller::new(&config);
            let mut ui = TableUI::new();

            while model.status == Status::READY {
                let data = model.get_uidata();
                terminal.draw(|f| ui.draw(&data, f))?;

                let message = controller.handle_event(&model)?;
                model.update(message)?;
            }
            Ok(model)
        });

        match outcome {
            Ok(model) if model.status == Status::NAVIGATING => {
                // A filter switch reloads the whole page
                if let Some(next) = model.navigation() {
                    url = next.clone();
                }
            }
            Ok(_) => break Ok(()),
            Err(e) => break Err(e),
        }
    };
    ratatui::restore();
    result
}

fn load_dashboard(config: &Config, url: Url) -> Result<Dashboard, CTError> {
    let snapshot = PageSnapshot::load(&config.page)?;
    let mut page = Page::render(&snapshot, url);
    if let Some(base_path) = &config.base_path {
        page = page.with_base_path(base_path);
    }

    let kind = config.effect;
    let settle = config.settle;
    init_page(page, |base_path| {
        let effect: Arc<dyn MarkViewed> = match kind {
            EffectKind::Server => Arc::new(ServerMarker::new(base_path)?),
            EffectKind::Visit => Arc::new(ChannelVisitor::new(settle)),
        };
        Ok(effect)
    })
}
