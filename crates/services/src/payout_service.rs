use std::sync::Arc;

use api::PayoutApi;
use course_core::model::{AccountId, PayoutSummary};

use crate::error::PayoutServiceError;

/// Backs the teacher payout dashboard: fetches raw entries and aggregates
/// them for display.
#[derive(Clone)]
pub struct PayoutService {
    payouts: Arc<dyn PayoutApi>,
}

impl PayoutService {
    #[must_use]
    pub fn new(payouts: Arc<dyn PayoutApi>) -> Self {
        Self { payouts }
    }

    /// Total and per-month earnings for a teacher account, newest month
    /// first.
    ///
    /// # Errors
    ///
    /// Returns `PayoutServiceError::Api` if the backend call fails and
    /// `PayoutServiceError::Payout` if the amounts overflow.
    pub async fn summary(&self, account: AccountId) -> Result<PayoutSummary, PayoutServiceError> {
        let entries = self.payouts.payout_entries(account).await?;
        Ok(PayoutSummary::from_entries(&entries)?)
    }
}
