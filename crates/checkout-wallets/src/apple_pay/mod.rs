//! Apple Pay: capability check, session construction, merchant validation.
//!
//! Unlike Google Pay, Apple Pay drives the flow through callbacks on a session
//! object. [`ApplePayAdapter::handle_click`] builds and begins an
//! [`ApplePaySession`]; whoever receives the vendor events then forwards them to
//! [`ApplePaySession::on_validate_merchant`] and
//! [`ApplePaySession::on_payment_authorized`], in that order, or to
//! [`ApplePaySession::on_cancel`] when the shopper dismisses the sheet.

mod session;

pub use session::*;

use checkout_types::{CurrencyCode, MerchantSession, MoneyAmount, PaymentIntent};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::backend::CheckoutBackend;
use crate::in_flight::InFlight;
use crate::status::ButtonState;

/// Apple Pay JS API version the session is created with.
pub const APPLE_PAY_VERSION: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SupportedNetwork {
    #[serde(rename = "visa")]
    Visa,
    #[serde(rename = "masterCard")]
    MasterCard,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MerchantCapability {
    #[serde(rename = "supports3DS")]
    Supports3ds,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub label: String,
    pub amount: MoneyAmount,
}

/// `ApplePayPaymentRequest` handed to the session constructor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplePayPaymentRequest {
    pub country_code: String,
    pub currency_code: CurrencyCode,
    pub supported_networks: Vec<SupportedNetwork>,
    pub merchant_capabilities: Vec<MerchantCapability>,
    pub total: LineItem,
}

impl ApplePayPaymentRequest {
    pub const COUNTRY_CODE: &'static str = "US";

    pub fn new(intent: &PaymentIntent) -> Self {
        Self {
            country_code: Self::COUNTRY_CODE.to_string(),
            currency_code: intent.currency,
            supported_networks: vec![SupportedNetwork::Visa, SupportedNetwork::MasterCard],
            merchant_capabilities: vec![MerchantCapability::Supports3ds],
            total: LineItem {
                label: intent.merchant_name.clone(),
                amount: intent.amount,
            },
        }
    }
}

/// Payload of the `validatemerchant` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidateMerchantEvent {
    #[serde(rename = "validationURL")]
    pub validation_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplePayPayment {
    /// Opaque `ApplePayPaymentToken`.
    pub token: serde_json::Value,
}

/// Payload of the `paymentauthorized` event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaymentAuthorizedEvent {
    pub payment: ApplePayPayment,
}

/// `ApplePaySession.STATUS_SUCCESS` / `STATUS_FAILURE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum AuthorizationStatus {
    Success = 0,
    Failure = 1,
}

/// The `ApplePaySession` class injected by Safari.
pub trait ApplePayVendor {
    type Session: ApplePayVendorSession;

    /// `window.ApplePaySession` exists.
    fn is_available(&self) -> bool;

    /// `ApplePaySession.canMakePayments()`.
    fn can_make_payments(&self) -> bool;

    fn create_session(&self, version: u32, request: &ApplePayPaymentRequest) -> Self::Session;
}

/// An `ApplePaySession` instance.
pub trait ApplePayVendorSession {
    fn begin(&mut self);
    fn complete_merchant_validation(&mut self, merchant_session: MerchantSession);
    fn complete_payment(&mut self, status: AuthorizationStatus);
    fn abort(&mut self);
}

/// Apple Pay button and session factory.
pub struct ApplePayAdapter<V, B> {
    vendor: V,
    backend: B,
    intent: Arc<PaymentIntent>,
    button: ButtonState,
    in_flight: InFlight,
}

impl<V, B> ApplePayAdapter<V, B>
where
    V: ApplePayVendor,
    B: CheckoutBackend + Clone,
{
    pub fn new(vendor: V, backend: B, intent: Arc<PaymentIntent>) -> Self {
        Self {
            vendor,
            backend,
            intent,
            button: ButtonState::Hidden,
            in_flight: InFlight::new(),
        }
    }

    pub fn button(&self) -> ButtonState {
        self.button
    }

    /// Renders the button when Apple Pay is present and usable. Synchronous, never fails.
    pub fn initialize(&mut self) -> ButtonState {
        self.button = if self.vendor.is_available() && self.vendor.can_make_payments() {
            ButtonState::Rendered
        } else {
            ButtonState::Hidden
        };
        tracing::info!(button = ?self.button, "Apple Pay availability");
        self.button
    }

    pub fn payment_request(&self) -> ApplePayPaymentRequest {
        ApplePayPaymentRequest::new(&self.intent)
    }

    /// Button click: creates and begins a session.
    ///
    /// Returns `None` while the button is hidden or a previous session has not
    /// reached a terminal state yet.
    ///
    /// The returned session keeps the button locked until it completes, fails,
    /// is aborted or is dropped. Callers must forward the sheet's `oncancel` to
    /// [`ApplePaySession::on_cancel`] or drop the session, otherwise every later
    /// click is ignored.
    pub fn handle_click(&self) -> Option<ApplePaySession<V::Session, B>> {
        if !self.button.is_rendered() {
            return None;
        }
        let Some(guard) = self.in_flight.try_acquire() else {
            tracing::debug!("Apple Pay session already live, click ignored");
            return None;
        };
        let vendor_session = self
            .vendor
            .create_session(APPLE_PAY_VERSION, &self.payment_request());
        let mut session = ApplePaySession::new(vendor_session, self.backend.clone(), Some(guard));
        session.begin().ok()?;
        Some(session)
    }
}
