//! Browser-side checkout logic for the two wallet integrations.
//!
//! The wallet SDKs themselves are injected by vendor scripts and are out of reach
//! here; they are modelled as traits ([`google_pay::GooglePayClient`],
//! [`apple_pay::ApplePayVendor`]) so the checkout flow can be driven and tested
//! without a browser.
//!
//! # Modules
//!
//! - [`backend`] - [`CheckoutBackend`](backend::CheckoutBackend) and its HTTP implementation.
//! - [`google_pay`] - Readiness check, button and tokenization flow.
//! - [`apple_pay`] - Capability check, session construction and the session state machine.
//! - [`handler`] - [`PaymentHandler`](handler::PaymentHandler), which owns both adapters and the status element.
//! - [`in_flight`] - One-attempt-at-a-time guard shared by the adapters.
//! - [`status`] - UI state values: status message, button visibility, click outcome.
//!
//! # Flow
//!
//! ```text
//! Google Pay: is_ready_to_pay -> button -> load_payment_data -> POST /api/rapyd/payment
//! Apple Pay:  can_make_payments -> button -> begin
//!               -> onvalidatemerchant -> POST /api/apple-pay/validate-merchant
//!               -> onpaymentauthorized -> POST /api/rapyd/payment
//! ```

pub mod apple_pay;
pub mod backend;
pub mod google_pay;
pub mod handler;
pub mod in_flight;
pub mod status;

pub use backend::{BackendClient, BackendClientError, CheckoutBackend};
pub use handler::PaymentHandler;
pub use status::{ButtonState, ClickOutcome, StatusClass, StatusReporter, StatusView};

/// Boxed error produced by a vendor SDK.
pub type VendorError = Box<dyn std::error::Error + Send + Sync + 'static>;
