use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A charge to be authorized before a payment record is written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChargeRequest {
    pub booking_id: i64,
    pub amount: f64,
    pub transaction_ref: String,
}

/// Authorization outcome from the gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    Approved,
    Declined,
}

/// External payment capability. The booking/payment state machine only sees
/// an approve/decline answer, so a real acquirer can be swapped in without
/// touching it.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize(
        &self,
        charge: &ChargeRequest,
    ) -> Result<ChargeOutcome, Box<dyn std::error::Error + Send + Sync>>;
}

/// Gateway used by this build: approves every charge.
pub struct MockCardGateway;

#[async_trait]
impl PaymentGateway for MockCardGateway {
    async fn authorize(
        &self,
        charge: &ChargeRequest,
    ) -> Result<ChargeOutcome, Box<dyn std::error::Error + Send + Sync>> {
        // In a real system this would submit the charge to an acquirer and
        // map its response.
        tracing::info!(
            booking_id = charge.booking_id,
            amount = charge.amount,
            "mock gateway approving charge"
        );
        Ok(ChargeOutcome::Approved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_gateway_approves() {
        let gateway = MockCardGateway;
        let outcome = gateway
            .authorize(&ChargeRequest {
                booking_id: 1,
                amount: 200.0,
                transaction_ref: "tok-1".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(outcome, ChargeOutcome::Approved);
    }
}
