// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use fabstir_ocr_node::{
    api::{start_server, AppState},
    config::ServiceConfig,
    vision::EngineSet,
};
use std::env;
use tokio::signal;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = ServiceConfig::parse();

    println!("🚀 Starting Fabstir OCR Node...\n");
    println!("📦 BUILD VERSION: {}", fabstir_ocr_node::version::VERSION);
    println!("📅 Build Date: {}", fabstir_ocr_node::version::BUILD_DATE);
    println!();

    let state = AppState::from_config(&config, EngineSet::from_config(&config.engine_config())?)?;

    // Leftovers of a previous run are never needed again
    state.scratch.prepare()?;

    let engines = state.engines.availability();
    let reachable = state.engines.check_health().await;
    for (name, configured, healthy) in [
        ("OCR", engines.ocr, reachable.ocr),
        ("Layout", engines.layout, reachable.layout),
        ("Table", engines.table, reachable.table),
    ] {
        if configured && !healthy {
            tracing::warn!("⚠️ {} engine sidecar is not answering its health check", name);
        }
    }
    let addr = config.listen_addr()?;

    let separator = "=".repeat(60);
    println!("\n{}", separator);
    println!("🎉 Fabstir OCR Node is running!");
    println!("{}", separator);
    println!("Language:       {}", config.ocr_language);
    println!("Scratch dir:    {}", config.scratch_dir.display());
    println!("OCR engine:     {}", status(engines.ocr));
    println!("Layout engine:  {}", status(engines.layout));
    println!("Table engine:   {}", status(engines.table));
    println!("\nAPI Endpoints:");
    println!("  Health:       http://localhost:{}/health", config.port);
    println!("  OCR:          http://localhost:{}/ocr/predict-by-*", config.port);
    println!("  Layout:       http://localhost:{}/layout/predict-by-*", config.port);
    println!("  Table:        http://localhost:{}/table/predict-by-*", config.port);
    println!("\nPress Ctrl+C to shutdown...");
    println!("{}\n", separator);

    start_server(addr, state, async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for shutdown signal: {}", e);
        }
        println!("\n⏹️  Shutting down...");
    })
    .await?;

    println!("👋 Goodbye!");
    Ok(())
}

fn status(available: bool) -> &'static str {
    if available {
        "connected"
    } else {
        "disabled"
    }
}
