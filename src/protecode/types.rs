//! Typed views of Protecode JSON responses
//!
//! Only the fields this crate reads are modelled; everything else in the
//! server's documents is ignored.

use serde::{Deserialize, Serialize};

/// Processing state of an uploaded product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScanStatus {
    /// Scan still running
    #[serde(rename = "B")]
    Busy,
    /// Scan finished
    #[serde(rename = "R")]
    Ready,
    /// Scan failed
    #[serde(rename = "F")]
    Failed,
    /// Any status code this crate does not know
    #[serde(other)]
    Unknown,
}

impl ScanStatus {
    /// Whether the scan will not change state anymore.
    pub fn is_final(&self) -> bool {
        matches!(self, ScanStatus::Ready | ScanStatus::Failed)
    }
}

/// Response envelope of `GET /api/product/{id}/` and the trigger calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultData {
    /// Scan result for the product
    pub results: ProductResult,
}

/// Scan result of a single product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductResult {
    /// Numeric product identifier
    pub product_id: i64,
    /// Current scan state
    pub status: ScanStatus,
    /// Web UI link to the report
    #[serde(default)]
    pub report_url: String,
    /// Name of the scanned file
    #[serde(default)]
    pub filename: String,
}

/// Response of `GET /api/apps/{group}/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProductList {
    /// Products known in the group
    #[serde(default)]
    pub products: Vec<Product>,
}

/// One entry of a [`ProductList`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    /// Numeric product identifier
    pub product_id: i64,
    /// Display name, usually the uploaded file name
    #[serde(default)]
    pub name: String,
}
