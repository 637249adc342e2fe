//! Error types

use {
    solana_program::{
        decode_error::DecodeError,
        msg,
        program_error::{PrintProgramError, ProgramError},
    },
    thiserror::Error,
};

/// Errors that may be returned by the TokenStaking program.
#[derive(Clone, Debug, Eq, Error, num_derive::FromPrimitive, PartialEq)]
pub enum StakeError {
    // 0.
    /// Attempted to initialize a pool that is already initialized.
    #[error("AlreadyInitialized")]
    AlreadyInitialized,
    /// Provided pool account is uninitialized or does not hold a stake pool.
    #[error("UninitializedPool")]
    UninitializedPool,
    /// Provided mint is not a valid token mint.
    #[error("InvalidTokenClass")]
    InvalidTokenClass,
    /// Stake amount must be greater than zero.
    #[error("InvalidAmount")]
    InvalidAmount,
    /// Participant token account balance is less than the stake amount.
    #[error("InsufficientFunds")]
    InsufficientFunds,

    // 5.
    /// Pool vault balance cannot cover the pool-funded portion of the payout.
    #[error("InsufficientPoolFunds")]
    InsufficientPoolFunds,
    /// Participant has no outstanding stake to withdraw.
    #[error("NothingStaked")]
    NothingStaked,
    /// Provided account does not match its derived address, its recorded
    /// owner, or the pool mint.
    #[error("AccountOwnerMismatch")]
    AccountOwnerMismatch,
    /// Required participant signature is missing.
    #[error("Unauthorized")]
    Unauthorized,
    /// Stake accumulation overflowed.
    #[error("ArithmeticOverflow")]
    ArithmeticOverflow,
}
impl From<StakeError> for ProgramError {
    fn from(e: StakeError) -> Self {
        ProgramError::Custom(e as u32)
    }
}
impl<T> DecodeError<T> for StakeError {
    fn type_of() -> &'static str {
        "Token Staking Error"
    }
}
impl PrintProgramError for StakeError {
    fn print<E>(&self)
    where
        E: 'static
            + std::error::Error
            + DecodeError<E>
            + PrintProgramError
            + num_traits::FromPrimitive,
    {
        match self {
            StakeError::AlreadyInitialized => {
                msg!("Error: Attempted to initialize a pool that is already initialized.")
            }
            StakeError::UninitializedPool => {
                msg!("Error: Provided pool account is uninitialized or does not hold a stake pool.")
            }
            StakeError::InvalidTokenClass => msg!("Error: Provided mint is not a valid token mint."),
            StakeError::InvalidAmount => msg!("Error: Stake amount must be greater than zero."),
            StakeError::InsufficientFunds => {
                msg!("Error: Participant token account balance is less than the stake amount.")
            }
            StakeError::InsufficientPoolFunds => {
                msg!("Error: Pool vault balance cannot cover the pool-funded portion of the payout.")
            }
            StakeError::NothingStaked => {
                msg!("Error: Participant has no outstanding stake to withdraw.")
            }
            StakeError::AccountOwnerMismatch => {
                msg!("Error: Provided account does not match its derived address, its recorded \
                     owner, or the pool mint.")
            }
            StakeError::Unauthorized => msg!("Error: Required participant signature is missing."),
            StakeError::ArithmeticOverflow => msg!("Error: Stake accumulation overflowed."),
        }
    }
}
