//! Flat name/value wire formats
//!
//! Two encodings cover the supported gateways:
//!
//! - [`WireFormat::Lines`]: `NAME=value` per line. Requests are joined with
//!   `\n`; replies arrive CRLF-delimited.
//! - [`WireFormat::ParmList`]: `NAME=value` pairs joined by `&`. A value
//!   containing `&` or `=` is sent with a byte-length tag, `NAME[5]=a&b=c`,
//!   and tagged values are honored when decoding.
//!
//! Neither encoding can carry every string. [`WireFormat::check`] rejects
//! fields that would change the framing, so a caller-supplied value can
//! never introduce a second field.

use crate::{
    error::{PaymentError, PaymentResult},
    field_map::FieldMap,
};

/// Serialization used by a gateway for both directions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireFormat {
    Lines,
    ParmList,
}

impl WireFormat {
    pub fn encode(&self, fields: &FieldMap) -> String {
        match self {
            Self::Lines => fields
                .iter()
                .map(|(name, value)| format!("{}={}", name, value))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::ParmList => fields
                .iter()
                .map(|(name, value)| {
                    if value.contains(['&', '=']) {
                        format!("{}[{}]={}", name, value.len(), value)
                    } else {
                        format!("{}={}", name, value)
                    }
                })
                .collect::<Vec<_>>()
                .join("&"),
        }
    }

    /// Reject any field that `encode` cannot frame unambiguously.
    ///
    /// Fails with `InvalidField` naming the first offending field.
    pub fn check(&self, fields: &FieldMap) -> PaymentResult<()> {
        for (name, value) in fields.iter() {
            let framed = match self {
                Self::Lines => {
                    !name.is_empty()
                        && !name.contains(['=', '\r', '\n'])
                        && !value.contains(['\r', '\n'])
                }
                Self::ParmList => {
                    !name.is_empty() && !name.contains(['&', '=', '[', ']']) && !name.chars().any(char::is_control)
                }
            };
            if !framed {
                return Err(PaymentError::InvalidField(name.to_string()));
            }
        }
        Ok(())
    }

    /// Decode reply text into fields. Later duplicates overwrite earlier ones.
    pub fn decode(&self, text: &str) -> PaymentResult<FieldMap> {
        match self {
            Self::Lines => decode_lines(text),
            Self::ParmList => decode_parmlist(text),
        }
    }
}

/// Replies are CRLF-delimited; a bare `\n` belongs to the value.
fn decode_lines(text: &str) -> PaymentResult<FieldMap> {
    let mut fields = FieldMap::new();

    for (index, line) in text.split("\r\n").enumerate() {
        if line.is_empty() {
            continue;
        }
        let (name, value) = line
            .split_once('=')
            .filter(|(name, _)| !name.is_empty())
            .ok_or(PaymentError::MalformedResponse { line: index + 1 })?;
        fields.set(name, value);
    }

    Ok(fields)
}

fn decode_parmlist(text: &str) -> PaymentResult<FieldMap> {
    let mut fields = FieldMap::new();
    let mut rest = text;
    let mut pair = 0;

    while !rest.is_empty() {
        if let Some(stripped) = rest.strip_prefix('&') {
            rest = stripped;
            continue;
        }
        pair += 1;
        let malformed = PaymentError::MalformedResponse { line: pair };

        let eq = rest.find('=').ok_or(PaymentError::MalformedResponse { line: pair })?;
        if rest[..eq].contains('&') {
            return Err(malformed);
        }
        let (raw_name, after) = (&rest[..eq], &rest[eq + 1..]);

        let (name, value, remaining) = match length_tag(raw_name) {
            Some((name, len)) => {
                let value = after.get(..len).ok_or(PaymentError::MalformedResponse { line: pair })?;
                let remaining = &after[len..];
                if !(remaining.is_empty() || remaining.starts_with('&')) {
                    return Err(malformed);
                }
                (name, value, remaining)
            }
            None => match after.find('&') {
                Some(amp) => (raw_name, &after[..amp], &after[amp..]),
                None => (raw_name, after, ""),
            },
        };

        if name.is_empty() {
            return Err(malformed);
        }
        fields.set(name, value);
        rest = remaining;
    }

    Ok(fields)
}

/// Split `NAME[12]` into `("NAME", 12)`.
fn length_tag(raw_name: &str) -> Option<(&str, usize)> {
    let inner = raw_name.strip_suffix(']')?;
    let (name, len) = inner.split_once('[')?;
    Some((name, len.parse().ok()?))
}
