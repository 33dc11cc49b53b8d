//! Wallet checkout dev server.
//!
//! Serves the checkout page from the public directory and mocks the payment
//! gateway behind it.
//!
//! Endpoints:
//! - `POST /api/rapyd/payment` - Accept a tokenized wallet payment
//! - `POST /api/apple-pay/validate-merchant` - Return a mock Apple Pay merchant session
//! - `GET /livereload` - Live reload WebSocket, with `--live-reload` only
//! - `GET /*` - Static files, `index.html` for anything else
//!
//! Environment:
//! - `.env` values loaded at startup
//! - `HOST`, `PORT` control binding address
//! - `PUBLIC_DIR`, `LIVE_RELOAD` control what is served
//! - `RUST_LOG` controls log verbosity

use std::process;

use wallet_checkout::run::run;

#[tokio::main]
async fn main() {
    let result = run().await;
    if let Err(e) = result {
        println!("{e}");
        process::exit(1)
    }
}
