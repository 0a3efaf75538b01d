//! Integration tests for common paygate workflows.
//!
//! These tests verify that the most common use cases work correctly.

#![cfg(all(feature = "keyvalue", feature = "extension"))]

use paygate::prelude::*;
use paygate::{MockTransport, TransportSettings};
use rust_decimal::Decimal;
use std::sync::Arc;

// =============================================================================
// Card Payment Workflow
// =============================================================================

#[tokio::test]
async fn test_card_payment_approved_then_declined() {
    let transport = MockTransport::new()
        .with_reply("RESULT=0\r\nPNREF=ABC123\r\n")
        .with_reply("RESULT=1\r\n");
    let processor = PaymentProcessor::new(KeyValueGateway::new(), Arc::new(transport.clone()));

    let mut statuses = Vec::new();
    for _ in 0..2 {
        let mut request = processor.request(TransactionType::Pay).unwrap();
        assert_eq!(request.mode(), GatewayMode::Test);
        request.set_amount(Decimal::new(1000, 2)).unwrap();
        request.set_field("ACCT", "4111111111111111").unwrap();

        let outcome = processor.submit(&mut request).await.unwrap();
        statuses.push(outcome.status);
    }

    assert_eq!(statuses, vec![TransactionStatus::Passed, TransactionStatus::Failed]);
    assert!(transport.sent().iter().all(|m| m.fields.get("AMT") == Some("10.00")));
}

#[test]
fn test_refund_references_original() {
    let transport = MockTransport::new().with_reply("RESULT=0\r\nPNREF=REF456\r\nRESPMSG=Approved\r\n");
    let processor = PaymentProcessor::new(KeyValueGateway::new(), Arc::new(transport.clone()));

    let mut refund = processor.request(TransactionType::Refund).unwrap();
    refund.set_field("ORIGID", "ABC123").unwrap();
    refund.set_field("AMT", "10.00").unwrap();
    refund.set_field("ACCT", "4111111111111111").unwrap();

    let outcome = tokio_test::block_on(processor.submit(&mut refund)).unwrap();

    assert!(outcome.is_passed());
    assert_eq!(outcome.response.field("RESPMSG"), Some("Approved"));
    assert!(transport.sent()[0].body_text().contains("ORIGID=ABC123"));
}

// =============================================================================
// Response Handling
// =============================================================================

#[test]
fn test_response_parsing() {
    let response = PaymentResponse::parse(b"A=1\r\nB=2\r\n").unwrap();
    assert!(response.has_field("A"));
    assert_eq!(response.field("A"), Some("1"));
    assert_eq!(response.field("C"), None);
    assert_eq!(response.to_string(), "A=1\nB=2\n");

    assert!(matches!(
        PaymentResponse::parse(b"A=1\r\nBADLINE\r\n"),
        Err(PaymentError::MalformedResponse { line: 2 })
    ));
}

#[test]
fn test_status_persisted_strings() {
    let statuses = [
        TransactionStatus::Missing,
        TransactionStatus::NotChecked,
        TransactionStatus::Failed,
        TransactionStatus::Passed,
    ];
    let names: Vec<&str> = statuses.iter().map(TransactionStatus::as_str).collect();
    assert_eq!(names, vec!["missing", "not_checked", "failed", "passed"]);
    for status in statuses {
        assert_eq!(status.as_str().parse::<TransactionStatus>().unwrap(), status);
    }
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_config_from_environment() {
    // SAFETY: this is the only test in this binary that touches PAYGATE_*.
    unsafe {
        std::env::set_var("PAYGATE_MODE", "live");
        std::env::set_var("PAYGATE_CREDENTIALS__USER", "424242");
        std::env::set_var("PAYGATE_CREDENTIALS__VENDOR", "merchant");
        std::env::set_var("PAYGATE_CREDENTIALS__PASSWORD", "secret");
        std::env::set_var("PAYGATE_TRANSPORT__KIND", "http");
        std::env::set_var("PAYGATE_TRANSPORT__TIMEOUT_SECS", "45");
    }

    let config = ProcessorConfig::from_env().unwrap();

    unsafe {
        for key in [
            "PAYGATE_MODE",
            "PAYGATE_CREDENTIALS__USER",
            "PAYGATE_CREDENTIALS__VENDOR",
            "PAYGATE_CREDENTIALS__PASSWORD",
            "PAYGATE_TRANSPORT__KIND",
            "PAYGATE_TRANSPORT__TIMEOUT_SECS",
        ] {
            std::env::remove_var(key);
        }
    }

    assert_eq!(config.mode, GatewayMode::Live);
    assert_eq!(config.transport, TransportSettings::Http { timeout_secs: 45 });

    let processor = PaymentProcessor::with_config(KeyValueGateway::new(), Arc::new(MockTransport::new()), config);
    let request = processor.request(TransactionType::Verify).unwrap();
    assert_eq!(request.endpoint(), "https://payflowpro.paypal.com");
    assert_eq!(request.field("USER"), Some("424242"));
    assert_eq!(request.field("TRXTYPE"), Some("AUTHENTICATE"));
}

// =============================================================================
// Custom Gateways
// =============================================================================

static HOUSE_PROFILE: paygate::GatewayProfile = paygate::GatewayProfile {
    name: "house",
    operation_field: "ACTION",
    test_endpoint: "https://sandbox.house.invalid",
    live_endpoint: "https://pay.house.invalid",
    type_codes: &[(TransactionType::Pay, "charge")],
    defaults: &[],
    required: &["ACTION", "TOKEN"],
    sensitive: &["TOKEN"],
    format: paygate::WireFormat::Lines,
};

#[derive(Debug, Clone)]
struct HouseGateway;

impl Classify for HouseGateway {
    fn classify(&self, response: &PaymentResponse) -> TransactionStatus {
        match response.field("STATUS") {
            Some("approved") | Some("review") => TransactionStatus::Passed,
            Some(_) => TransactionStatus::Failed,
            None => TransactionStatus::NotChecked,
        }
    }
}

impl Gateway for HouseGateway {
    fn profile(&self) -> &'static paygate::GatewayProfile {
        &HOUSE_PROFILE
    }
}

#[tokio::test]
async fn test_custom_gateway() {
    let transport = MockTransport::new().with_reply("STATUS=review\r\n");
    let processor = PaymentProcessor::new(HouseGateway, Arc::new(transport));

    assert!(matches!(
        processor.request(TransactionType::Refund),
        Err(PaymentError::UnsupportedTransactionType { gateway: "house", .. })
    ));

    let mut request = processor.request(TransactionType::Pay).unwrap();
    request.set_field("TOKEN", "tok_abcdef123456").unwrap();
    assert_eq!(request.redacted_fields().get("TOKEN"), Some("************3456"));

    let outcome = processor.submit(&mut request).await.unwrap();
    assert_eq!(outcome.status, TransactionStatus::Passed);
}
