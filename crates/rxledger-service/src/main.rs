//! Ledger Server Binary
//!
//! Runs the rxledger HTTP server over an in-memory ledger.

use std::env;
use std::sync::Arc;

use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use rxledger_core::Identity;
use rxledger_service::{
    create_router, AppState, IdentityVerifier, Ledger, MockVerifier, ServiceConfig,
    StaticTokenVerifier,
};

#[tokio::main]
async fn main() {
    // Initialize logging
    let log_level = env::var("RXLEDGER_LOG_LEVEL")
        .unwrap_or_else(|_| "info".into())
        .parse()
        .unwrap_or(Level::INFO);

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(true)
        .with_thread_ids(true)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    // Configuration
    let port: u16 = env::var("RXLEDGER_PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("RXLEDGER_PORT must be a valid port number");

    let issuer = env::var("RXLEDGER_ISSUER")
        .map(|s| Identity::parse(&s))
        .unwrap_or_else(|_| Identity::custom(format!("issuer-{}", uuid::Uuid::new_v4())));

    let signers: Vec<Identity> = env::var("RXLEDGER_SIGNERS")
        .unwrap_or_default()
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(|s| Identity::parse(s.trim()))
        .collect();

    let threshold: usize = env::var("RXLEDGER_THRESHOLD")
        .unwrap_or_else(|_| "1".into())
        .parse()
        .expect("RXLEDGER_THRESHOLD must be a number");

    let service_name = env::var("RXLEDGER_NAME").ok();

    // Fall back to a single-signer set owned by the issuer so a bare
    // development start still has working governance
    let signers = if signers.is_empty() {
        vec![issuer.clone()]
    } else {
        signers
    };

    // Identity verification: static token table when configured, mock
    // tokens otherwise (development only)
    let verifier: Arc<dyn IdentityVerifier> = match env::var("RXLEDGER_API_TOKENS") {
        Ok(spec) => {
            let verifier = StaticTokenVerifier::parse_spec(&spec)
                .expect("RXLEDGER_API_TOKENS must be 'token=identity,token=identity'");
            info!(tokens = verifier.token_count(), "Using static token verifier");
            Arc::new(verifier)
        }
        Err(_) => {
            info!("RXLEDGER_API_TOKENS not set - accepting mock:<name> tokens");
            Arc::new(MockVerifier)
        }
    };

    let ledger = Ledger::new(issuer.clone(), signers, threshold)
        .expect("Signer set must be at least as large as the threshold");

    info!(
        issuer = %issuer,
        name = ?service_name,
        port = port,
        "Starting rxledger server"
    );

    // Create application state
    let state = Arc::new(AppState {
        ledger: Arc::new(ledger),
        verifier,
        config: ServiceConfig { service_name },
    });

    // Build router
    let app = create_router(state);

    // Start server
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    info!(addr = %addr, "Ledger server listening");

    axum::serve(listener, app)
        .await
        .expect("Server error");
}
