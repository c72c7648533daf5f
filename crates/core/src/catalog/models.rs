use serde::{Deserialize, Serialize};

/// A catalogued firmware record, as returned by lookups.
///
/// The identification core treats these as read-only: records are created
/// by catalog imports and administrative tooling, never by the matchers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FirmwareRecord {
    pub id: i64,
    /// Vehicle brand: Toyota, BMW, ...
    pub brand: String,
    /// Model/series: Prius 1.8, X5 3.0d, ...
    pub series: Option<String>,
    /// ECU manufacturer: Bosch, Denso, Siemens, ...
    pub ecu_brand: Option<String>,
    /// Primary lookup key: the vendor software/calibration number.
    pub software_id: Option<String>,
    pub hardware_id: Option<String>,
    pub file_size: Option<i64>,
    pub price: Option<f64>,
}

/// Insertable firmware data (the store assigns the id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewFirmware {
    pub brand: String,
    pub series: Option<String>,
    pub ecu_brand: Option<String>,
    pub software_id: Option<String>,
    pub hardware_id: Option<String>,
    pub file_size: Option<i64>,
    pub price: Option<f64>,
}

/// Terminal state of an identification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    /// A catalog record was matched automatically.
    Matched,
    /// No catalog match; the request needs an operator.
    Manual,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Matched => "matched",
            RequestStatus::Manual => "manual",
        }
    }

    /// Decode from the stored string, defaulting unknown values to `Manual`
    /// (the safe state: a human looks at it).
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "matched" => RequestStatus::Matched,
            _ => RequestStatus::Manual,
        }
    }
}

/// Bookkeeping record for one identification attempt.
///
/// Both outcomes are recorded: matched requests for statistics, manual ones
/// so an operator queue can be built on top of the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestRecord {
    /// Original upload filename, when the caller had one.
    pub filename: Option<String>,
    /// SHA-256 of the uploaded image, when the caller computed one.
    pub file_hash: Option<String>,
    /// Matched catalog record id, for `Matched` requests.
    pub firmware_id: Option<i64>,
    /// The candidate string that produced the hit.
    pub matched_candidate: Option<String>,
    /// Parse confidence, when content parsing ran.
    pub confidence: Option<f64>,
    pub status: RequestStatus,
    /// RFC3339 creation timestamp.
    pub created_at: String,
}

/// Aggregate counts over the firmware catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_firmwares: i64,
    pub total_brands: i64,
    pub total_ecu_types: i64,
}
