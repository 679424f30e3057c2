use thiserror::Error;

/// Why a quantity request was rejected before touching the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum QuantityError {
    #[error("not a number")]
    NotANumber,

    #[error("quantity must be greater than zero")]
    NotPositive,
}

/// Why an upload was rejected before touching the ledger.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum RestockRejection {
    #[error("sender is not the administrator")]
    Unauthorized,

    #[error("uploaded file contains no records")]
    EmptyUpload,
}
