//! Wire types for the wallet checkout demo.
//!
//! This crate holds everything that crosses the boundary between the browser-side
//! wallet adapters and the mock payment gateway. Both sides depend on it, so a
//! request built by `checkout-wallets` deserializes byte-for-byte in the server.
//!
//! # Modules
//!
//! - [`intent`] - The [`PaymentIntent`](intent::PaymentIntent) read by both wallet adapters.
//! - [`money_amount`] - Decimal amounts parsed from human-readable strings.
//! - [`payment_id`] - Time-based identifiers issued by the mock gateway.
//! - [`proto`] - Request and response bodies of the two backend endpoints.
//!
//! # Wire Format
//!
//! Request bodies use camelCase field names (`paymentMethod`, `validationURL`).
//! The gateway's `data` object keeps snake_case (`payment_id`) because that is
//! what the upstream gateway emits.

pub mod intent;
pub mod money_amount;
pub mod payment_id;
pub mod proto;

pub use intent::*;
pub use money_amount::*;
pub use payment_id::*;
pub use proto::*;
