//! Native transaction → canonical [`Purchase`] mapping.
//!
//! Everything here is pure: no I/O, no clock reads (StoreKit takes `now` as an
//! argument), so identical native input always yields an identical record.

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::{
    data::models::{
        google_play_billing::purchase_model::{PurchaseModel, PurchaseStateModel},
        store_kit::{
            common::ProductTypeModel,
            subscription_status_model::{RenewalState, SubscriptionStatusModel},
            transaction_model::TransactionModel,
        },
    },
    domain::entities::purchase::{Purchase, PurchaseState},
    errors::{IapError, Result},
};

impl Purchase {
    pub(crate) fn from_google_play_purchase(m: &PurchaseModel) -> Result<Self> {
        let product_id = m.products.first().ok_or_else(|| {
            IapError::BackendError(format!(
                "purchase {} does not reference any product",
                m.purchase_token
            ))
        })?;
        Ok(Purchase {
            order_id: non_empty(&m.order_id),
            package_name: m.package_name.clone(),
            product_id: product_id.clone(),
            purchase_time: m.purchase_time.timestamp_millis(),
            purchase_token: m.purchase_token.clone(),
            purchase_state: PurchaseState::from_google_play(m.purchase_state),
            is_auto_renewing: m.is_auto_renewing,
            is_acknowledged: m.is_acknowledged,
            original_json: non_empty(&m.original_json),
            signature: non_empty(&m.signature),
            original_id: None,
            jws_representation: None,
        })
    }

    /// `statuses` are the subscription statuses of the transaction's group
    /// (empty for non-subscriptions or when they could not be fetched).
    pub(crate) fn from_store_kit_transaction(
        t: &TransactionModel,
        jws_representation: &str,
        statuses: &[SubscriptionStatusModel],
        bundle_id: &str,
        now: DateTime<Utc>,
    ) -> Self {
        let transaction_id = t.id.to_string();
        Purchase {
            order_id: Some(transaction_id.clone()),
            package_name: bundle_id.to_string(),
            product_id: t.product_id.clone(),
            purchase_time: t.purchase_date.timestamp_millis(),
            purchase_token: transaction_id,
            purchase_state: PurchaseState::from_store_kit(t, statuses, now),
            is_auto_renewing: store_kit_auto_renewing(t, statuses),
            // StoreKit has no acknowledgment step.
            is_acknowledged: true,
            original_json: None,
            signature: None,
            original_id: Some(t.original_id.to_string()),
            jws_representation: Some(jws_representation)
                .filter(|jws| !jws.is_empty())
                .map(str::to_owned),
        }
    }
}

impl PurchaseState {
    fn from_google_play(state: PurchaseStateModel) -> Self {
        match state {
            PurchaseStateModel::Purchased => PurchaseState::Purchased,
            PurchaseStateModel::Pending => PurchaseState::Pending,
            PurchaseStateModel::UnspecifiedState => PurchaseState::Canceled,
        }
    }

    /// StoreKit has no pending transactions (Ask to Buy never produces a
    /// transaction until approved), so this never yields `Pending`.
    fn from_store_kit(
        t: &TransactionModel,
        statuses: &[SubscriptionStatusModel],
        now: DateTime<Utc>,
    ) -> Self {
        if t.revocation_date.is_some() {
            return PurchaseState::Canceled;
        }
        if t.expiration_date.is_some_and(|expiration| expiration <= now) {
            return PurchaseState::Canceled;
        }
        if t.product_type != ProductTypeModel::AutoRenewable {
            return PurchaseState::Purchased;
        }
        match renewal_verdict(statuses) {
            RenewalVerdict::Active(_) | RenewalVerdict::Undetermined => PurchaseState::Purchased,
            RenewalVerdict::Inactive => PurchaseState::Canceled,
            RenewalVerdict::Unrecognized(state) => {
                warn!(
                    product_id = %t.product_id,
                    transaction_id = t.id,
                    renewal_state = state,
                    "unrecognized renewal state, deciding from transaction dates"
                );
                PurchaseState::Purchased
            }
        }
    }
}

enum RenewalVerdict<'a> {
    /// Subscribed or in grace period.
    Active(&'a SubscriptionStatusModel),
    /// Expired, revoked, or in billing retry.
    Inactive,
    Unrecognized(&'a str),
    /// No status available.
    Undetermined,
}

/// An active status anywhere in the group wins (family sharing can report
/// several); otherwise the first recognized inactive state decides.
fn renewal_verdict(statuses: &[SubscriptionStatusModel]) -> RenewalVerdict<'_> {
    if let Some(active) = statuses.iter().find(|s| {
        matches!(
            s.state,
            RenewalState::Subscribed | RenewalState::InGracePeriod
        )
    }) {
        return RenewalVerdict::Active(active);
    }
    let mut verdict = RenewalVerdict::Undetermined;
    for status in statuses {
        match &status.state {
            RenewalState::Expired | RenewalState::Revoked | RenewalState::InBillingRetryPeriod => {
                return RenewalVerdict::Inactive
            }
            RenewalState::Unknown(state) => {
                if matches!(verdict, RenewalVerdict::Undetermined) {
                    verdict = RenewalVerdict::Unrecognized(state);
                }
            }
            RenewalState::Subscribed | RenewalState::InGracePeriod => {}
        }
    }
    verdict
}

fn store_kit_auto_renewing(t: &TransactionModel, statuses: &[SubscriptionStatusModel]) -> bool {
    if t.product_type != ProductTypeModel::AutoRenewable {
        return false;
    }
    match renewal_verdict(statuses) {
        RenewalVerdict::Active(status) => status
            .renewal_info
            .as_ref()
            .map_or(true, |info| info.will_auto_renew),
        RenewalVerdict::Inactive | RenewalVerdict::Unrecognized(_) | RenewalVerdict::Undetermined => {
            false
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_deref().filter(|v| !v.is_empty()).map(str::to_owned)
}
