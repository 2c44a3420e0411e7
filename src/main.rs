mod card;
mod chart;
mod command;
mod config;
mod dashboard;
mod dataset;
mod error;
mod error_log;
mod metrics;
mod selector;
mod tui;

use std::sync::Arc;

use anyhow::{Context, anyhow};
use clap::Parser;

use crate::command::Command;
use crate::dashboard::Dashboard;
use crate::dataset::Dataset;
use crate::tui::TuiApp;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let param = config::CliParams::parse();
    let _log_guard = param.init_logging()?;

    let dataset = Dataset::load(&param.data)
        .with_context(|| format!("failed to load {}", param.data.display()))?;
    let dashboard = Dashboard::new(Arc::new(dataset));

    if param.snapshot {
        let view = dashboard
            .render(Some(param.month.as_str()))?
            .ok_or_else(|| anyhow!("no month selected"))?;
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    use tokio::sync::broadcast;

    let (tx, mut rx) = broadcast::channel::<Command>(16);
    let mut app = TuiApp::new(dashboard, &param.month, tx.clone(), param.error_log_store());
    let app_result = tokio::select! {
        result = app.run(&mut rx) => result,
        _ = tokio::signal::ctrl_c() => Ok(()),
    };
    let _ = tx.send(Command::Exit);
    app.dispose();
    app_result.map_err(|err| anyhow!(err.to_string()))?;
    Ok(())
}
