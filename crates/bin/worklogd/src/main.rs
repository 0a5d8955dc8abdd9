//! # worklogd: workflow automation daemon
//!
//! Composition root that wires all adapters together and starts the server.
//!
//! ## Responsibilities
//! - Parse configuration (`worklog.toml`, env vars)
//! - Initialise logging
//! - Initialize the `SQLite` connection pool and run migrations
//! - Construct the action registry against the workspace collaborators
//! - Construct the rule engine, dispatcher, scanner and event listener
//! - Build the axum router, injecting application services
//! - Bind to a TCP port and serve
//! - Handle graceful shutdown (SIGTERM/SIGINT)
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer; no domain logic belongs here.

mod config;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use worklog_adapter_http_axum::state::AppState;
use worklog_adapter_storage_sqlite_sqlx::{
    Config as StorageConfig, SqliteExecutionLog, SqliteRuleRepository,
};
use worklog_adapter_virtual::VirtualWorkspace;
use worklog_app::actions::{ActionExecutor, ActionRegistry};
use worklog_app::dispatcher::EventDispatcher;
use worklog_app::event_bus::InProcessEventBus;
use worklog_app::rule_engine::RuleEngine;
use worklog_app::scanner::{BudgetScan, DeadlineScan, Scanner};
use worklog_app::services::{ExecutionService, RuleService};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.logging.filter)?)
        .init();

    // Database
    let db = StorageConfig {
        database_url: config.database_url().to_string(),
    }
    .build()
    .await?;
    let pool = db.pool().clone();

    // Repositories
    let rules = Arc::new(SqliteRuleRepository::new(pool.clone()));
    let executions = Arc::new(SqliteExecutionLog::new(pool));

    // Collaborators
    let workspace = Arc::new(VirtualWorkspace::demo());
    let registry = ActionRegistry::with_builtins(
        Arc::clone(&workspace),
        Arc::clone(&workspace),
        Arc::clone(&workspace),
        Arc::clone(&workspace),
    );
    let action_kinds = registry.kinds();

    // Engine
    let executor = ActionExecutor::new(registry).with_default_timeout(config.action_timeout());
    let engine = RuleEngine::new(Arc::clone(&rules), Arc::clone(&executions), executor);
    let dispatcher = EventDispatcher::new(engine);

    // Background work
    let (bus, queue) = InProcessEventBus::channel(256);
    let listener = queue.listen(dispatcher.clone());
    let scanner = config.scanner.enabled.then(|| {
        Scanner::new(dispatcher.clone(), config.scan_interval())
            .with_source(DeadlineScan::new(
                Arc::clone(&workspace),
                config.deadline_window(),
            ))
            .with_source(BudgetScan::new(
                Arc::clone(&workspace),
                config.scanner.budget_threshold_percent,
            ))
            .start()
    });

    // HTTP
    let state = AppState::from_arcs(
        Arc::new(RuleService::new(rules).with_action_kinds(action_kinds)),
        Arc::new(ExecutionService::new(executions)),
        dispatcher.clone(),
        Arc::new(bus),
    );
    let app = worklog_adapter_http_axum::router::build(state);

    let bind_addr = config.bind_addr();
    let tcp = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(%bind_addr, "worklogd listening");

    axum::serve(tcp, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            tracing::info!("shutting down");
            if let Some(scanner) = scanner {
                scanner.stop().await;
            }
            listener.stop().await;
            dispatcher.drain().await;
        })
        .await?;

    db.close().await;
    tracing::info!("worklogd stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "cannot listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
}
