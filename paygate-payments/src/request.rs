//! Outbound payment requests

use crate::{
    config::Credentials,
    error::{PaymentError, PaymentResult},
    field_map::{FieldMap, names},
    profile::Gateway,
    transport::{OutboundMessage, Transport},
    types::{GatewayMode, TransactionType},
};
use paygate_log::{debug, trace};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use uuid::Uuid;

/// Dispatch lifecycle of a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchState {
    Open,
    /// Terminal; the request may not be modified or sent again
    Dispatched,
    /// Terminal; `dispatch` found the request invalid and sent nothing
    Rejected,
}

/// A single gateway request.
///
/// Built from the gateway's defaults and the operation code for its
/// transaction type, then filled by the caller and dispatched once. A request
/// is never reused; create a new one to retry.
pub struct PaymentRequest<G: Gateway> {
    gateway: G,
    transaction_type: TransactionType,
    mode: GatewayMode,
    endpoint: String,
    fields: FieldMap,
    request_id: Uuid,
    state: DispatchState,
}

impl<G: Gateway> PaymentRequest<G> {
    /// Start a request against the endpoint for `mode`.
    ///
    /// # Errors
    ///
    /// `UnsupportedTransactionType` if the gateway has no code for
    /// `transaction_type`.
    pub fn new(gateway: G, transaction_type: TransactionType, mode: GatewayMode) -> PaymentResult<Self> {
        let profile = gateway.profile();
        let code = profile.type_code(transaction_type)?;

        let mut fields = profile.default_fields();
        fields.set(profile.operation_field, code);

        Ok(Self {
            endpoint: profile.endpoint(mode).to_string(),
            gateway,
            transaction_type,
            mode,
            fields,
            request_id: Uuid::new_v4(),
            state: DispatchState::Open,
        })
    }

    /// Send to `endpoint` instead of the profile's endpoint.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> PaymentResult<Self> {
        self.ensure_open()?;
        self.endpoint = endpoint.into();
        Ok(self)
    }

    /// Fill the merchant login fields.
    pub fn with_credentials(mut self, credentials: &Credentials) -> PaymentResult<Self> {
        self.set_field(names::USER, credentials.user.as_str())?;
        self.set_field(names::VENDOR, credentials.vendor.as_str())?;
        if !credentials.partner.is_empty() {
            self.set_field(names::PARTNER, credentials.partner.as_str())?;
        }
        self.set_field(names::PWD, credentials.password())?;
        Ok(self)
    }

    /// Insert or overwrite a field. Values are not checked until dispatch.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) -> PaymentResult<()> {
        self.ensure_open()?;
        self.fields.set(name, value);
        Ok(())
    }

    /// Set `AMT` with two decimal places, rounding half away from zero.
    pub fn set_amount(&mut self, amount: Decimal) -> PaymentResult<()> {
        let mut amount = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
        amount.rescale(2);
        self.set_field(names::AMT, amount.to_string())
    }

    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.transaction_type
    }

    pub fn mode(&self) -> GatewayMode {
        self.mode
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn request_id(&self) -> Uuid {
        self.request_id
    }

    pub fn state(&self) -> DispatchState {
        self.state
    }

    pub fn is_dispatched(&self) -> bool {
        self.state == DispatchState::Dispatched
    }

    /// Check that every required field is present and non-empty, then that
    /// every field can be carried by the gateway's wire format.
    ///
    /// Reports the first missing field in the gateway's declaration order,
    /// or `InvalidField` for a name or value that would break framing.
    pub fn validate(&self) -> PaymentResult<()> {
        let profile = self.gateway.profile();
        if let Some(name) = profile
            .required_fields()
            .iter()
            .find(|name| !self.fields.is_filled(name))
        {
            return Err(PaymentError::MissingRequiredField(name.to_string()));
        }
        profile.format.check(&self.fields)
    }

    /// Fields with sensitive values masked, for logging.
    pub fn redacted_fields(&self) -> FieldMap {
        let profile = self.gateway.profile();
        self.fields
            .iter()
            .map(|(name, value)| {
                if profile.is_sensitive(name) {
                    (name, paygate_log::mask(value))
                } else {
                    (name, value.to_string())
                }
            })
            .collect()
    }

    /// Validate, encode and hand the request to `transport`.
    ///
    /// Returns the raw reply bytes. The request becomes `Dispatched` once the
    /// transport is invoked, even if the transport fails. A failed validation
    /// makes it `Rejected` without contacting the transport; build a new
    /// request to retry.
    pub async fn dispatch<T>(&mut self, transport: &T) -> PaymentResult<Vec<u8>>
    where
        T: Transport + ?Sized,
    {
        self.ensure_open()?;
        if let Err(err) = self.validate() {
            self.state = DispatchState::Rejected;
            debug!(
                target: "paygate::request",
                fields: [("request_id", self.request_id), ("kind", err.kind())],
                "Rejected {} request: {}",
                self.transaction_type,
                err
            );
            return Err(err);
        }

        let body = self.gateway.encode(&self.fields);
        self.state = DispatchState::Dispatched;

        debug!(
            target: "paygate::request",
            fields: [
                ("gateway", self.gateway.name()),
                ("type", self.transaction_type),
                ("mode", self.mode),
                ("request_id", self.request_id),
                ("transport", transport.name())
            ],
            "Dispatching {} request to {}",
            self.transaction_type,
            self.endpoint
        );
        trace!(
            target: "paygate::request",
            "Request fields: {}",
            self.gateway.encode(&self.redacted_fields()).escape_ascii()
        );

        let message = OutboundMessage {
            gateway: self.gateway.name(),
            endpoint: &self.endpoint,
            fields: &self.fields,
            body: &body,
            request_id: self.request_id,
        };
        transport.send(&message).await
    }

    fn ensure_open(&self) -> PaymentResult<()> {
        match self.state {
            DispatchState::Open => Ok(()),
            DispatchState::Dispatched => Err(PaymentError::AlreadyDispatched),
            DispatchState::Rejected => Err(PaymentError::RequestRejected),
        }
    }
}

impl<G: Gateway> fmt::Debug for PaymentRequest<G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRequest")
            .field("gateway", &self.gateway.name())
            .field("transaction_type", &self.transaction_type)
            .field("mode", &self.mode)
            .field("endpoint", &self.endpoint)
            .field("fields", &self.redacted_fields())
            .field("request_id", &self.request_id)
            .field("state", &self.state)
            .finish()
    }
}
