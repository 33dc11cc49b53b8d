//! Apple Pay session state machine.
//!
//! ```text
//! Created --begin--> Begun --validated--> MerchantValidated --authorized--> Authorized --ok--> Completed
//!                      |                        |                                 |
//!                      +--validation failed--+  +--cancel--+                      +--failed--> Failed
//!                      +--cancel-------------+--------------+--> Aborted
//! ```
//!
//! A session holds the adapter's in-flight flag until it is terminal, so the
//! sheet's `oncancel` has to reach [`ApplePaySession::on_cancel`] (or the
//! session has to be dropped) before the button responds again.
//!
//! Every vendor callback is checked against the current state before anything
//! else happens. An out-of-order callback (authorization before validation, a
//! second validation, ...) is rejected with [`SessionError::InvalidTransition`]
//! and leaves both the state and the vendor session untouched.

use checkout_types::{MerchantValidationRequest, PaymentMethod};
use std::fmt::{Display, Formatter};

use super::{
    ApplePayVendorSession, AuthorizationStatus, PaymentAuthorizedEvent, ValidateMerchantEvent,
};
use crate::backend::{BackendClientError, CheckoutBackend, submit_payment};
use crate::in_flight::InFlightGuard;
use crate::status::StatusView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Created,
    Begun,
    MerchantValidated,
    /// Payment authorized by the shopper, gateway call in flight.
    Authorized,
    Completed,
    Failed,
    Aborted,
}

impl SessionState {
    /// Terminal states accept no further events.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionState::Completed | SessionState::Failed | SessionState::Aborted
        )
    }

    /// The state `event` leads to, or `None` if it is not allowed here.
    pub fn next(self, event: SessionEvent) -> Option<SessionState> {
        use SessionEvent as E;
        use SessionState as S;
        match (self, event) {
            (S::Created, E::Begin) => Some(S::Begun),
            (S::Begun, E::MerchantValidated) => Some(S::MerchantValidated),
            (S::Begun, E::MerchantValidationFailed) => Some(S::Aborted),
            (S::Begun | S::MerchantValidated, E::Cancelled) => Some(S::Aborted),
            (S::MerchantValidated, E::PaymentAuthorized) => Some(S::Authorized),
            (S::Authorized, E::PaymentSucceeded) => Some(S::Completed),
            (S::Authorized, E::PaymentFailed) => Some(S::Failed),
            _ => None,
        }
    }
}

impl Display for SessionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Begin,
    MerchantValidated,
    MerchantValidationFailed,
    PaymentAuthorized,
    PaymentSucceeded,
    PaymentFailed,
    /// Sheet dismissed by the shopper.
    Cancelled,
}

impl Display for SessionEvent {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        std::fmt::Debug::fmt(self, f)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid Apple Pay session transition: {event} in state {from}")]
    InvalidTransition {
        from: SessionState,
        event: SessionEvent,
    },
    #[error("Merchant validation failed: {0}")]
    MerchantValidation(#[source] BackendClientError),
    #[error("Apple Pay payment error: {0}")]
    Payment(#[source] BackendClientError),
}

impl SessionError {
    /// Only payment-stage failures reach the status element.
    pub fn is_user_facing(&self) -> bool {
        matches!(self, SessionError::Payment(_))
    }
}

/// One Apple Pay session, from construction to a terminal state.
///
/// Owns the vendor session exclusively. Holds the adapter's in-flight flag
/// until it reaches a terminal state or is dropped.
pub struct ApplePaySession<S, B> {
    state: SessionState,
    vendor: S,
    backend: B,
    in_flight: Option<InFlightGuard>,
}

impl<S, B> ApplePaySession<S, B>
where
    S: ApplePayVendorSession,
    B: CheckoutBackend,
{
    pub(crate) fn new(vendor: S, backend: B, in_flight: Option<InFlightGuard>) -> Self {
        Self {
            state: SessionState::Created,
            vendor,
            backend,
            in_flight,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn vendor(&self) -> &S {
        &self.vendor
    }

    fn ensure_allowed(&self, event: SessionEvent) -> Result<SessionState, SessionError> {
        self.state.next(event).ok_or_else(|| {
            let error = SessionError::InvalidTransition {
                from: self.state,
                event,
            };
            tracing::error!(error = %error, "Apple Pay session callback out of order");
            error
        })
    }

    fn advance(&mut self, event: SessionEvent) -> Result<SessionState, SessionError> {
        let next = self.ensure_allowed(event)?;
        tracing::debug!(from = %self.state, to = %next, %event, "Apple Pay session transition");
        self.state = next;
        if next.is_terminal() {
            self.in_flight = None;
        }
        Ok(next)
    }

    /// Shows the payment sheet.
    pub fn begin(&mut self) -> Result<(), SessionError> {
        self.advance(SessionEvent::Begin)?;
        self.vendor.begin();
        Ok(())
    }

    /// `onvalidatemerchant`: exchange the validation URL for a merchant session.
    ///
    /// On backend failure the vendor session is aborted.
    pub async fn on_validate_merchant(
        &mut self,
        event: &ValidateMerchantEvent,
    ) -> Result<(), SessionError> {
        self.ensure_allowed(SessionEvent::MerchantValidated)?;
        let request = MerchantValidationRequest {
            validation_url: event.validation_url.clone(),
        };
        match self.backend.validate_merchant(&request).await {
            Ok(merchant_session) => {
                self.advance(SessionEvent::MerchantValidated)?;
                self.vendor.complete_merchant_validation(merchant_session);
                Ok(())
            }
            Err(error) => {
                self.advance(SessionEvent::MerchantValidationFailed)?;
                self.vendor.abort();
                let error = SessionError::MerchantValidation(error);
                tracing::error!(error = %error, "Merchant validation failed");
                Err(error)
            }
        }
    }

    /// `oncancel`: the shopper closed the sheet before authorizing.
    ///
    /// The vendor has already torn the sheet down, so nothing is called on it.
    /// Releases the in-flight flag.
    pub fn on_cancel(&mut self) -> Result<(), SessionError> {
        self.advance(SessionEvent::Cancelled)?;
        tracing::info!("Apple Pay sheet dismissed");
        Ok(())
    }

    /// `onpaymentauthorized`: forward the token and complete the payment sheet.
    ///
    /// Rejected without touching the backend unless the merchant was validated first.
    pub async fn on_payment_authorized(
        &mut self,
        event: PaymentAuthorizedEvent,
    ) -> Result<StatusView, SessionError> {
        self.advance(SessionEvent::PaymentAuthorized)?;
        let token = event.payment.token.into();
        match submit_payment(&self.backend, PaymentMethod::ApplePay, token).await {
            Ok(_) => {
                self.advance(SessionEvent::PaymentSucceeded)?;
                self.vendor.complete_payment(AuthorizationStatus::Success);
                Ok(StatusView::payment_successful())
            }
            Err(error) => {
                self.advance(SessionEvent::PaymentFailed)?;
                self.vendor.complete_payment(AuthorizationStatus::Failure);
                let error = SessionError::Payment(error);
                tracing::error!(error = %error, "Apple Pay payment error");
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_transitions() {
        let mut state = SessionState::Created;
        for event in [
            SessionEvent::Begin,
            SessionEvent::MerchantValidated,
            SessionEvent::PaymentAuthorized,
            SessionEvent::PaymentSucceeded,
        ] {
            state = state.next(event).unwrap();
        }
        assert_eq!(state, SessionState::Completed);
        assert!(state.is_terminal());
    }

    #[test]
    fn authorization_requires_validation() {
        assert_eq!(
            SessionState::Begun.next(SessionEvent::PaymentAuthorized),
            None
        );
        assert_eq!(
            SessionState::Created.next(SessionEvent::MerchantValidated),
            None
        );
    }

    #[test]
    fn no_transition_repeats() {
        assert_eq!(
            SessionState::MerchantValidated.next(SessionEvent::MerchantValidated),
            None
        );
        assert_eq!(SessionState::Begun.next(SessionEvent::Begin), None);
    }

    #[test]
    fn terminal_states_are_final() {
        let events = [
            SessionEvent::Begin,
            SessionEvent::MerchantValidated,
            SessionEvent::MerchantValidationFailed,
            SessionEvent::PaymentAuthorized,
            SessionEvent::PaymentSucceeded,
            SessionEvent::PaymentFailed,
            SessionEvent::Cancelled,
        ];
        for state in [
            SessionState::Completed,
            SessionState::Failed,
            SessionState::Aborted,
        ] {
            for event in events {
                assert_eq!(state.next(event), None, "{state} accepted {event}");
            }
        }
    }

    #[test]
    fn validation_failure_aborts() {
        assert_eq!(
            SessionState::Begun.next(SessionEvent::MerchantValidationFailed),
            Some(SessionState::Aborted)
        );
    }

    #[test]
    fn cancel_aborts_before_authorization_only() {
        assert_eq!(
            SessionState::Begun.next(SessionEvent::Cancelled),
            Some(SessionState::Aborted)
        );
        assert_eq!(
            SessionState::MerchantValidated.next(SessionEvent::Cancelled),
            Some(SessionState::Aborted)
        );
        assert_eq!(SessionState::Created.next(SessionEvent::Cancelled), None);
        assert_eq!(SessionState::Authorized.next(SessionEvent::Cancelled), None);
    }
}
