use shopkeep_store::StoreError;
use shopkeep_types::{ErrorKind, ShopId};
use thiserror::Error;

/// Recovery code errors. Codes appear only in masked form.
#[derive(Debug, Error)]
pub enum RecoveryError {
    #[error("recovery code not found: {0}")]
    NotFound(String),

    #[error("recovery code already used: {0}")]
    AlreadyUsed(String),

    #[error("recovery code {code} does not belong to shop {shop_id}")]
    ShopMismatch { code: String, shop_id: ShopId },

    #[error("invalid recovery code format")]
    InvalidFormat,

    #[error("recovery code {0} is not redeemed")]
    NotRedeemed(String),

    #[error("could not generate a unique recovery code after {0} attempts")]
    GenerationExhausted(usize),

    #[error("storage error: {0}")]
    Storage(#[from] StoreError),
}

impl RecoveryError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::AlreadyUsed(_) => ErrorKind::AlreadyUsed,
            Self::ShopMismatch { .. } => ErrorKind::ShopMismatch,
            Self::InvalidFormat => ErrorKind::Validation,
            Self::NotRedeemed(_) => ErrorKind::Conflict,
            Self::GenerationExhausted(_) | Self::Storage(_) => ErrorKind::Internal,
        }
    }
}

pub type RecoveryResult<T> = Result<T, RecoveryError>;
