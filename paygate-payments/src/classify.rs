//! Mapping replies to a transaction status

use crate::{response::PaymentResponse, types::TransactionStatus};

/// Gateway-specific success criteria
pub trait Classify {
    fn classify(&self, response: &PaymentResponse) -> TransactionStatus;
}

impl<F> Classify for F
where
    F: Fn(&PaymentResponse) -> TransactionStatus,
{
    fn classify(&self, response: &PaymentResponse) -> TransactionStatus {
        self(response)
    }
}

/// "Field X equals Y" rule.
///
/// Equal is `Passed`, any other value is `Failed`, and a reply without the
/// field is `NotChecked`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultCodeRule {
    field: String,
    success: String,
}

impl ResultCodeRule {
    pub fn new(field: impl Into<String>, success: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            success: success.into(),
        }
    }

    pub fn field(&self) -> &str {
        &self.field
    }
}

impl Classify for ResultCodeRule {
    fn classify(&self, response: &PaymentResponse) -> TransactionStatus {
        match response.field(&self.field) {
            None => TransactionStatus::NotChecked,
            Some(value) if value == self.success => TransactionStatus::Passed,
            Some(_) => TransactionStatus::Failed,
        }
    }
}

impl TransactionStatus {
    /// Status for an optional reply: `Missing` when there is none.
    pub fn of<C: Classify + ?Sized>(response: Option<&PaymentResponse>, classifier: &C) -> Self {
        response.map_or(TransactionStatus::Missing, |r| classifier.classify(r))
    }
}
