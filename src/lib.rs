//! Dev server and mock payment gateway for the wallet checkout page.
//!
//! The checkout page offers Google Pay and Apple Pay for a single
//! [`PaymentIntent`](checkout_types::PaymentIntent). This crate is the server
//! side of that page:
//!
//! - [`handlers`] - `POST /api/rapyd/payment` and `POST /api/apple-pay/validate-merchant`,
//!   answering with canned success payloads.
//! - [`static_files`] - The public directory, with `index.html` as the fallback for
//!   every unmatched `GET`.
//! - [`live_reload`] - Optional browser reload on file changes, for development.
//! - [`config`] - Command line and environment configuration.
//! - [`run`] - Router assembly and the server entrypoint.
//! - [`util`] - Tracing setup and graceful shutdown.
//!
//! The client side of the flow, the wallet adapters and the session state
//! machine, lives in the `checkout-wallets` crate.

pub mod config;
pub mod handlers;
pub mod live_reload;
pub mod run;
pub mod static_files;
pub mod util;
