//! # Domain Errors
//!
//! Every rejection aborts the whole operation with zero partial mutation.
//! Variants carry a stable numeric code (`6000 + n`) so a code returned by
//! the chain maps back to the same variant through [`ErrorCode`].

use al_01_address_derivation::DerivationError;
use shared_types::{Lamports, PoolId, Pubkey};
use thiserror::Error;

/// Broad class of a settlement rejection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Malformed input, rejected before touching state.
    Validation,
    /// The caller or record is not permitted to do this.
    Authorization,
    /// A daily limit or balance would be exceeded.
    Limit,
    /// Checked arithmetic overflowed.
    Arithmetic,
    /// Storage failure outside the ledger rules.
    Internal,
}

/// Settlement error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SettlementError {
    /// Amount must be positive.
    #[error("Invalid amount: must be greater than zero")]
    InvalidAmount,

    /// No pool with this id.
    #[error("Pool not found: {pool_id}")]
    PoolNotFound {
        /// Requested pool
        pool_id: PoolId,
    },

    /// Pool is missing or deactivated.
    #[error("Pool inactive: {pool_id}")]
    PoolInactive {
        /// Requested pool
        pool_id: PoolId,
    },

    /// Pool id already taken.
    #[error("Pool already exists: {pool_id}")]
    DuplicatePool {
        /// Requested pool
        pool_id: PoolId,
    },

    /// Pool name over the byte limit.
    #[error("Pool name too long: {len} bytes (max {max})")]
    NameTooLong {
        /// Supplied length
        len: usize,
        /// Allowed maximum
        max: usize,
    },

    /// Too many pools in an NGO allow-list.
    #[error("Too many allowed pools: {count} (max {max})")]
    TooManyAllowedPools {
        /// Supplied count
        count: usize,
        /// Allowed maximum
        max: usize,
    },

    /// NGO is not registered or has been deactivated.
    #[error("NGO inactive or not registered: {wallet}")]
    NgoInactive {
        /// NGO wallet
        wallet: Pubkey,
    },

    /// Pool is not in the NGO's allow-list.
    #[error("NGO {wallet} not allowed to withdraw from pool {pool_id}")]
    NgoNotAllowedForPool {
        /// NGO wallet
        wallet: Pubkey,
        /// Requested pool
        pool_id: PoolId,
    },

    /// Caller is not the configured administrator.
    #[error("Unauthorized: {signer} is not the administrator")]
    UnauthorizedAdmin {
        /// Offending signer
        signer: Pubkey,
    },

    /// Required signature missing or from the wrong wallet.
    #[error("Unauthorized signer: expected {expected}")]
    UnauthorizedSigner {
        /// Wallet that had to sign
        expected: Pubkey,
    },

    /// Withdrawal would push the NGO over its daily limit.
    #[error("Daily limit exceeded: {withdrawn_today} + {requested} > {daily_limit}")]
    DailyLimitExceeded {
        /// Requested amount
        requested: Lamports,
        /// Already withdrawn today
        withdrawn_today: Lamports,
        /// Configured limit
        daily_limit: Lamports,
    },

    /// Account balance cannot cover the transfer.
    #[error("Insufficient funds: requested {requested}, available {available}")]
    InsufficientFunds {
        /// Requested amount
        requested: Lamports,
        /// Available balance
        available: Lamports,
    },

    /// Checked arithmetic overflowed.
    #[error("Arithmetic overflow")]
    Overflow,

    /// Configuration already exists.
    #[error("Ledger already initialized")]
    AlreadyInitialized,

    /// Configuration does not exist yet.
    #[error("Ledger not initialized")]
    NotInitialized,

    /// Attester set or threshold unusable.
    #[error("Invalid attestation policy: threshold {threshold} with {attesters} attesters")]
    InvalidAttestationPolicy {
        /// Requested threshold
        threshold: u8,
        /// Attester count
        attesters: usize,
    },

    /// Cross-chain message could not be decoded.
    #[error("Invalid bridge message: {0}")]
    InvalidBridgeMessage(String),

    /// Message targets another destination domain.
    #[error("Wrong destination domain: expected {expected}, got {got}")]
    WrongDestinationDomain {
        /// Local domain
        expected: u32,
        /// Domain in the message
        got: u32,
    },

    /// Not enough valid attester signatures.
    #[error("Invalid attestation: {valid} valid signatures, {required} required")]
    InvalidAttestation {
        /// Distinct configured signers recovered
        valid: usize,
        /// Required threshold
        required: usize,
    },

    /// The burn message was already credited.
    #[error("Attestation already consumed")]
    AttestationAlreadyConsumed,

    /// The burn minted to an address other than the pool.
    #[error("Mint recipient does not match pool {pool_id}")]
    MintRecipientMismatch {
        /// Target pool
        pool_id: PoolId,
    },

    /// Instruction data could not be decoded.
    #[error("Invalid instruction: {0}")]
    InvalidInstruction(String),

    /// An account passed to an instruction is not the expected one.
    #[error("Account mismatch: {account}")]
    AccountMismatch {
        /// Which account slot was wrong
        account: String,
    },

    /// Storage failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// No program address could be derived for a natural key.
    #[error("Address derivation failed: {0}")]
    AddressDerivation(String),

    /// An instruction names an address that holds no ledger record.
    #[error("Account not initialized: {account}")]
    AccountNotInitialized {
        /// Which account slot was empty
        account: String,
    },
}

impl SettlementError {
    /// Broad class of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidAmount
            | Self::PoolNotFound { .. }
            | Self::DuplicatePool { .. }
            | Self::NameTooLong { .. }
            | Self::TooManyAllowedPools { .. }
            | Self::AlreadyInitialized
            | Self::NotInitialized
            | Self::InvalidAttestationPolicy { .. }
            | Self::InvalidBridgeMessage(_)
            | Self::WrongDestinationDomain { .. }
            | Self::InvalidInstruction(_)
            | Self::AccountMismatch { .. }
            | Self::AccountNotInitialized { .. } => ErrorCategory::Validation,
            Self::PoolInactive { .. }
            | Self::NgoInactive { .. }
            | Self::NgoNotAllowedForPool { .. }
            | Self::UnauthorizedAdmin { .. }
            | Self::UnauthorizedSigner { .. }
            | Self::InvalidAttestation { .. }
            | Self::AttestationAlreadyConsumed
            | Self::MintRecipientMismatch { .. } => ErrorCategory::Authorization,
            Self::DailyLimitExceeded { .. } | Self::InsufficientFunds { .. } => {
                ErrorCategory::Limit
            }
            Self::Overflow => ErrorCategory::Arithmetic,
            Self::Storage(_) | Self::AddressDerivation(_) => ErrorCategory::Internal,
        }
    }

    /// Stable code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::InvalidAmount => ErrorCode::InvalidAmount,
            Self::PoolNotFound { .. } => ErrorCode::PoolNotFound,
            Self::PoolInactive { .. } => ErrorCode::PoolInactive,
            Self::DuplicatePool { .. } => ErrorCode::DuplicatePool,
            Self::NameTooLong { .. } => ErrorCode::NameTooLong,
            Self::TooManyAllowedPools { .. } => ErrorCode::TooManyAllowedPools,
            Self::NgoInactive { .. } => ErrorCode::NgoInactive,
            Self::NgoNotAllowedForPool { .. } => ErrorCode::NgoNotAllowedForPool,
            Self::UnauthorizedAdmin { .. } => ErrorCode::UnauthorizedAdmin,
            Self::UnauthorizedSigner { .. } => ErrorCode::UnauthorizedSigner,
            Self::DailyLimitExceeded { .. } => ErrorCode::DailyLimitExceeded,
            Self::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            Self::Overflow => ErrorCode::Overflow,
            Self::AlreadyInitialized => ErrorCode::AlreadyInitialized,
            Self::NotInitialized => ErrorCode::NotInitialized,
            Self::InvalidAttestationPolicy { .. } => ErrorCode::InvalidAttestationPolicy,
            Self::InvalidBridgeMessage(_) => ErrorCode::InvalidBridgeMessage,
            Self::WrongDestinationDomain { .. } => ErrorCode::WrongDestinationDomain,
            Self::InvalidAttestation { .. } => ErrorCode::InvalidAttestation,
            Self::AttestationAlreadyConsumed => ErrorCode::AttestationAlreadyConsumed,
            Self::MintRecipientMismatch { .. } => ErrorCode::MintRecipientMismatch,
            Self::InvalidInstruction(_) => ErrorCode::InvalidInstruction,
            Self::AccountMismatch { .. } => ErrorCode::AccountMismatch,
            Self::Storage(_) => ErrorCode::Storage,
            Self::AddressDerivation(_) => ErrorCode::AddressDerivation,
            Self::AccountNotInitialized { .. } => ErrorCode::AccountNotInitialized,
        }
    }
}

impl From<DerivationError> for SettlementError {
    fn from(err: DerivationError) -> Self {
        Self::AddressDerivation(err.to_string())
    }
}

/// Field-less mirror of [`SettlementError`] with its numeric code.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u32)]
#[allow(missing_docs)]
pub enum ErrorCode {
    InvalidAmount = 6000,
    PoolNotFound = 6001,
    PoolInactive = 6002,
    DuplicatePool = 6003,
    NameTooLong = 6004,
    TooManyAllowedPools = 6005,
    NgoInactive = 6006,
    NgoNotAllowedForPool = 6007,
    UnauthorizedAdmin = 6008,
    UnauthorizedSigner = 6009,
    DailyLimitExceeded = 6010,
    InsufficientFunds = 6011,
    Overflow = 6012,
    AlreadyInitialized = 6013,
    NotInitialized = 6014,
    InvalidAttestationPolicy = 6015,
    InvalidBridgeMessage = 6016,
    WrongDestinationDomain = 6017,
    InvalidAttestation = 6018,
    AttestationAlreadyConsumed = 6019,
    MintRecipientMismatch = 6020,
    InvalidInstruction = 6021,
    AccountMismatch = 6022,
    Storage = 6023,
    AddressDerivation = 6024,
    AccountNotInitialized = 6025,
}

impl ErrorCode {
    const ALL: [ErrorCode; 26] = [
        Self::InvalidAmount,
        Self::PoolNotFound,
        Self::PoolInactive,
        Self::DuplicatePool,
        Self::NameTooLong,
        Self::TooManyAllowedPools,
        Self::NgoInactive,
        Self::NgoNotAllowedForPool,
        Self::UnauthorizedAdmin,
        Self::UnauthorizedSigner,
        Self::DailyLimitExceeded,
        Self::InsufficientFunds,
        Self::Overflow,
        Self::AlreadyInitialized,
        Self::NotInitialized,
        Self::InvalidAttestationPolicy,
        Self::InvalidBridgeMessage,
        Self::WrongDestinationDomain,
        Self::InvalidAttestation,
        Self::AttestationAlreadyConsumed,
        Self::MintRecipientMismatch,
        Self::InvalidInstruction,
        Self::AccountMismatch,
        Self::Storage,
        Self::AddressDerivation,
        Self::AccountNotInitialized,
    ];

    /// Numeric value as reported on chain.
    pub fn as_u32(self) -> u32 {
        self as u32
    }

    /// Map a custom program error code back to its variant.
    pub fn from_u32(code: u32) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.as_u32() == code)
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({})", self, self.as_u32())
    }
}
