//! Parsed gateway replies

use crate::{error::PaymentResult, field_map::FieldMap, wire::WireFormat};
use std::fmt;

/// A gateway reply: parsed fields plus the reply text as received.
///
/// Immutable once parsed. The text keeps every field the gateway sent,
/// including ones this crate does not know about, and is what `Display`
/// prints for audit logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentResponse {
    fields: FieldMap,
    raw: String,
}

impl PaymentResponse {
    /// Parse a CRLF-delimited `NAME=value` reply.
    ///
    /// # Errors
    ///
    /// `MalformedResponse` with the 1-based line number of the first non-empty
    /// line that has no `=` or an empty name. Nothing is returned on failure.
    pub fn parse(raw: &[u8]) -> PaymentResult<Self> {
        Self::parse_with(WireFormat::Lines, raw)
    }

    /// Parse an `&`-joined parmlist reply, honoring `NAME[len]=` tags.
    pub fn parse_parmlist(raw: &[u8]) -> PaymentResult<Self> {
        Self::parse_with(WireFormat::ParmList, raw)
    }

    /// Parse with an explicit wire format.
    pub fn parse_with(format: WireFormat, raw: &[u8]) -> PaymentResult<Self> {
        let text = String::from_utf8_lossy(raw);
        let fields = format.decode(&text)?;
        Ok(Self {
            fields,
            raw: text.replace("\r\n", "\n"),
        })
    }

    /// Field value, or `None` when the gateway did not send it.
    ///
    /// A field sent with an empty value is `Some("")`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name)
    }

    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains(name)
    }

    pub fn fields(&self) -> &FieldMap {
        &self.fields
    }

    /// Reply text with line endings normalized to `\n`.
    pub fn raw(&self) -> &str {
        &self.raw
    }
}

impl fmt::Display for PaymentResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
