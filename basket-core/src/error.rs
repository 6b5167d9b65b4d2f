use crate::types::{ItemName, SellerName};

/// Result alias for the JSON-facing entry points.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Catalog(#[from] CatalogError),

    #[error(transparent)]
    WantList(#[from] WantListError),

    #[error(transparent)]
    Synth(#[from] SynthError),

    #[error("invalid optimizer config: {0}")]
    Config(#[source] serde_json::Error),
}

/// Rejections raised while loading offers or seller fees.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("malformed catalog json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("offer #{index} of '{item}' is missing required field `{field}`")]
    MissingField {
        item: ItemName,
        index: usize,
        field: &'static str,
    },

    #[error("offer #{index} of '{item}' has invalid `{field}`: {reason}")]
    InvalidField {
        item: ItemName,
        index: usize,
        field: &'static str,
        reason: String,
    },

    #[error("seller '{seller}' has invalid shipping fee {fee}")]
    InvalidSellerFee { seller: SellerName, fee: f64 },
}

#[derive(Debug, thiserror::Error)]
pub enum WantListError {
    #[error("line {line}: quantity must be positive in '{text}'")]
    ZeroQuantity { line: usize, text: String },
}

#[derive(Debug, thiserror::Error)]
pub enum SynthError {
    #[error("invalid range for {what}: {min}..={max}")]
    InvalidRange {
        what: &'static str,
        min: f64,
        max: f64,
    },

    #[error("synthetic catalog needs at least one seller")]
    NoSellers,
}
