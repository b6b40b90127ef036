//! Checkout wire types: cart to purchase conversion

use crate::domain::a003_purchase::aggregate::PurchaseLineView;
use serde::{Deserialize, Serialize};

/// Checkout request. Guest fields are optional; when the caller is
/// authenticated the profile name/email win regardless of what is sent.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfirmRequest {
    #[serde(rename = "guestName")]
    pub guest_name: Option<String>,

    #[serde(rename = "guestEmail")]
    pub guest_email: Option<String>,
}

/// Confirmation view returned after a successful checkout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutConfirmation {
    #[serde(rename = "purchaseId")]
    pub purchase_id: String,

    #[serde(rename = "totalCost")]
    pub total_cost: f64,

    pub lines: Vec<PurchaseLineView>,
}
