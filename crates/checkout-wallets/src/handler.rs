//! The checkout page: one payment intent, two wallet buttons, one status element.

use checkout_types::PaymentIntent;
use std::sync::Arc;

use crate::apple_pay::{
    ApplePayAdapter, ApplePaySession, ApplePayVendor, PaymentAuthorizedEvent, SessionError,
    ValidateMerchantEvent,
};
use crate::backend::CheckoutBackend;
use crate::google_pay::{GooglePayAdapter, GooglePayClient};
use crate::status::{ButtonState, ClickOutcome, StatusReporter, StatusView};

/// Button visibility after page load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Buttons {
    pub google_pay: ButtonState,
    pub apple_pay: ButtonState,
}

/// Wires both wallet adapters to a single [`PaymentIntent`] and the status element.
///
/// Adapters return UI state; the handler is the only place that writes it to
/// the [`StatusReporter`].
pub struct PaymentHandler<G, A, B> {
    intent: Arc<PaymentIntent>,
    status: StatusReporter,
    google_pay: GooglePayAdapter<G, B>,
    apple_pay: ApplePayAdapter<A, B>,
}

impl<G, A, B> PaymentHandler<G, A, B>
where
    G: GooglePayClient,
    A: ApplePayVendor,
    B: CheckoutBackend + Clone,
{
    pub fn new(intent: PaymentIntent, google_pay: G, apple_pay: A, backend: B) -> Self {
        let intent = Arc::new(intent);
        Self {
            google_pay: GooglePayAdapter::new(google_pay, backend.clone(), intent.clone()),
            apple_pay: ApplePayAdapter::new(apple_pay, backend, intent.clone()),
            intent,
            status: StatusReporter::new(),
        }
    }

    pub fn intent(&self) -> &PaymentIntent {
        &self.intent
    }

    pub fn status(&self) -> &StatusReporter {
        &self.status
    }

    pub fn google_pay(&self) -> &GooglePayAdapter<G, B> {
        &self.google_pay
    }

    pub fn apple_pay(&self) -> &ApplePayAdapter<A, B> {
        &self.apple_pay
    }

    /// Page load: readiness check for Google Pay, capability check for Apple Pay.
    pub async fn initialize(&mut self) -> Buttons {
        let google_pay = self.google_pay.initialize().await;
        let apple_pay = self.apple_pay.initialize();
        Buttons {
            google_pay,
            apple_pay,
        }
    }

    pub async fn click_google_pay(&self) -> ClickOutcome {
        let outcome = self.google_pay.handle_click().await;
        if let ClickOutcome::Finished(view) = &outcome {
            self.status.show(view.clone());
        }
        outcome
    }

    pub fn click_apple_pay(&self) -> Option<ApplePaySession<A::Session, B>> {
        self.apple_pay.handle_click()
    }

    /// Forwards `onvalidatemerchant`. Failures are logged by the session, never shown.
    pub async fn apple_pay_validate_merchant(
        &self,
        session: &mut ApplePaySession<A::Session, B>,
        event: &ValidateMerchantEvent,
    ) -> Result<(), SessionError> {
        session.on_validate_merchant(event).await
    }

    /// Forwards `oncancel`. Nothing is shown.
    pub fn apple_pay_cancel(
        &self,
        session: &mut ApplePaySession<A::Session, B>,
    ) -> Result<(), SessionError> {
        session.on_cancel()
    }

    /// Forwards `onpaymentauthorized` and shows the outcome.
    pub async fn apple_pay_authorize(
        &self,
        session: &mut ApplePaySession<A::Session, B>,
        event: PaymentAuthorizedEvent,
    ) -> Result<StatusView, SessionError> {
        let result = session.on_payment_authorized(event).await;
        match &result {
            Ok(view) => self.status.show(view.clone()),
            Err(error) if error.is_user_facing() => self.status.show(StatusView::payment_failed()),
            Err(_) => {}
        }
        result
    }
}
