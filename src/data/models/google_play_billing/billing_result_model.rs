use serde::Deserialize;
use serde_repr::Deserialize_repr;

/// Result of a Play Billing Library call.
///
/// https://developer.android.com/reference/com/android/billingclient/api/BillingResult
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct BillingResultModel {
    pub(crate) response_code: BillingResponseCode,
    /// Debug message from the billing library. Not localized, not meant for
    /// end users.
    #[serde(default)]
    pub(crate) debug_message: String,
}

impl BillingResultModel {
    pub(crate) fn is_ok(&self) -> bool {
        self.response_code == BillingResponseCode::Ok
    }

    pub(crate) fn describe(&self) -> String {
        if self.debug_message.is_empty() {
            format!("{:?}", self.response_code)
        } else {
            format!("{:?} ({})", self.response_code, self.debug_message)
        }
    }
}

/// https://developer.android.com/reference/com/android/billingclient/api/BillingClient.BillingResponseCode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize_repr)]
#[repr(i8)]
pub(crate) enum BillingResponseCode {
    /// The request has reached the maximum timeout before Google Play
    /// responds.
    ServiceTimeout = -3,
    /// The requested feature is not supported by the Play Store on the current
    /// device.
    FeatureNotSupported = -2,
    /// The app is not connected to the Play Store service via the Google Play
    /// Billing Library.
    ServiceDisconnected = -1,
    Ok = 0,
    /// Transaction was canceled by the user.
    UserCanceled = 1,
    /// The service is currently unavailable.
    ServiceUnavailable = 2,
    /// A user billing error occurred during processing.
    BillingUnavailable = 3,
    /// The requested product is not available for purchase.
    ItemUnavailable = 4,
    /// Error resulting from incorrect usage of the API.
    DeveloperError = 5,
    /// Fatal error during the API action.
    Error = 6,
    /// The purchase failed because the item is already owned.
    ItemAlreadyOwned = 7,
    /// Requested action on the item failed since it is not owned by the user.
    ItemNotOwned = 8,
    /// A network error occurred during the operation.
    NetworkError = 12,
}
