//! Transaction taxonomy shared by every gateway

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of financial operation a request performs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Authorize and capture in one step
    Pay,
    /// Check the payment method without moving funds
    Verify,
    /// Pay against a previously verified payment method
    VerifiedPay,
    /// Reserve funds for later release
    Hold,
    /// Capture previously held funds
    Release,
    /// Cancel a hold
    Abort,
    /// Cancel a transaction before settlement
    Void,
    /// Return settled funds
    Refund,
    /// Legacy alias: sale
    Normal,
    /// Legacy alias: authorization only
    Auth,
    /// Legacy alias: credit
    Credit,
    /// Legacy alias: capture of a prior authorization
    PostAuth,
}

impl TransactionType {
    /// Primary, gateway-neutral types
    pub const PRIMARY: [TransactionType; 8] = [
        Self::Pay,
        Self::Verify,
        Self::VerifiedPay,
        Self::Hold,
        Self::Release,
        Self::Abort,
        Self::Void,
        Self::Refund,
    ];

    /// Legacy aliases used only by the extension gateway
    pub const LEGACY: [TransactionType; 4] = [Self::Normal, Self::Auth, Self::Credit, Self::PostAuth];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pay => "pay",
            Self::Verify => "verify",
            Self::VerifiedPay => "verified_pay",
            Self::Hold => "hold",
            Self::Release => "release",
            Self::Abort => "abort",
            Self::Void => "void",
            Self::Refund => "refund",
            Self::Normal => "normal",
            Self::Auth => "auth",
            Self::Credit => "credit",
            Self::PostAuth => "post_auth",
        }
    }

    pub fn is_legacy(&self) -> bool {
        Self::LEGACY.contains(self)
    }

    /// Every type, primary set first.
    pub fn all() -> impl Iterator<Item = TransactionType> {
        Self::PRIMARY.into_iter().chain(Self::LEGACY)
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::all()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown transaction type `{}`", s))
    }
}

/// Which gateway environment a request targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GatewayMode {
    #[default]
    Test,
    Live,
}

impl GatewayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Live => "live",
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for GatewayMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GatewayMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "test" | "sandbox" => Ok(Self::Test),
            "live" | "production" => Ok(Self::Live),
            _ => Err(format!("unknown gateway mode `{}`", s)),
        }
    }
}

/// Outcome attached to a persisted transaction record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    /// No response was ever received
    #[default]
    Missing,
    /// A response exists but was not evaluated
    NotChecked,
    /// The gateway declined or rejected the transaction
    Failed,
    /// The gateway approved the transaction
    Passed,
}

impl TransactionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::NotChecked => "not_checked",
            Self::Failed => "failed",
            Self::Passed => "passed",
        }
    }

    pub fn is_passed(&self) -> bool {
        matches!(self, Self::Passed)
    }

    /// Passed and Failed are verdicts; Missing and NotChecked still need
    /// operator attention.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Passed | Self::Failed)
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "missing" => Ok(Self::Missing),
            "not_checked" => Ok(Self::NotChecked),
            "failed" => Ok(Self::Failed),
            "passed" => Ok(Self::Passed),
            _ => Err(format!("unknown transaction status `{}`", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_type_names_round_trip() {
        for ty in TransactionType::all() {
            assert_eq!(ty.as_str().parse::<TransactionType>().unwrap(), ty);
        }
        assert_eq!("VERIFIED_PAY".parse::<TransactionType>().unwrap(), TransactionType::VerifiedPay);
        assert!("capture".parse::<TransactionType>().is_err());
    }

    #[test]
    fn test_legacy_set() {
        assert!(TransactionType::PostAuth.is_legacy());
        assert!(!TransactionType::Refund.is_legacy());
        assert_eq!(TransactionType::all().count(), 12);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("Live".parse::<GatewayMode>().unwrap(), GatewayMode::Live);
        assert_eq!("sandbox".parse::<GatewayMode>().unwrap(), GatewayMode::Test);
        assert!("staging".parse::<GatewayMode>().is_err());
        assert_eq!(GatewayMode::default(), GatewayMode::Test);
    }

    #[test]
    fn test_status_defaults_to_missing() {
        assert_eq!(TransactionStatus::default(), TransactionStatus::Missing);
        assert!(!TransactionStatus::NotChecked.is_final());
        assert!(TransactionStatus::Failed.is_final());
        assert!(TransactionStatus::Passed.is_passed());
    }

    #[test]
    fn test_status_persisted_form() {
        assert_eq!(
            serde_json::to_string(&TransactionStatus::NotChecked).unwrap(),
            "\"not_checked\""
        );
        assert_eq!("passed".parse::<TransactionStatus>().unwrap(), TransactionStatus::Passed);
    }
}
