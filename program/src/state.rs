//! State transition types

use {
    crate::{error::StakeError, find_pool_address, find_stake_record_address},
    borsh::{BorshDeserialize, BorshSchema, BorshSerialize},
    solana_program::{
        account_info::AccountInfo, borsh1::try_from_slice_unchecked, program_error::ProgramError,
        pubkey::Pubkey,
    },
};

/// Token staking account type
#[derive(Clone, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize, BorshSchema)]
pub enum AccountType {
    /// Uninitialized account
    #[default]
    Uninitialized,
    /// Singleton stake pool account
    StakePool,
    /// Per-participant stake record
    StakeRecord,
}

/// Stake pool account, one per program deployment, used to derive the pool
/// vault
#[derive(Clone, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize, BorshSchema)]
pub struct StakePool {
    /// Pool account type, reserved for future compat
    pub account_type: AccountType,
    /// The mint this pool accepts for staking, set at creation
    pub token_mint: Pubkey,
    /// The pool-owned custody token account, set at creation
    pub vault: Pubkey,
}
impl StakePool {
    /// Create a StakePool struct from its account info
    pub fn from_account_info(
        account_info: &AccountInfo,
        program_id: &Pubkey,
    ) -> Result<Self, ProgramError> {
        // pool is allocated and owned by this program
        if account_info.data_len() == 0 || account_info.owner != program_id {
            return Err(StakeError::UninitializedPool.into());
        }

        let pool = try_from_slice_unchecked::<StakePool>(&account_info.data.borrow())?;

        // pool is well-typed
        if pool.account_type != AccountType::StakePool {
            return Err(StakeError::UninitializedPool.into());
        }

        // pool lives at its fixed derived address. in practice this is
        // irrefutable because the pool is initialized from the address that
        // derives it, and never modified
        if *account_info.key != find_pool_address(program_id) {
            return Err(StakeError::AccountOwnerMismatch.into());
        }

        Ok(pool)
    }
}

/// Per-participant stake record, tracking the amount locked in the
/// participant's vault
#[derive(Clone, Debug, Default, PartialEq, BorshDeserialize, BorshSerialize, BorshSchema)]
pub struct StakeRecord {
    /// Record account type, reserved for future compat
    pub account_type: AccountType,
    /// The participant this record belongs to
    pub owner: Pubkey,
    /// Units of the pool mint currently locked by this participant
    pub amount_staked: u64,
}
impl StakeRecord {
    /// Create a StakeRecord struct from its account info
    pub fn from_account_info(
        account_info: &AccountInfo,
        program_id: &Pubkey,
        participant_address: &Pubkey,
    ) -> Result<Self, ProgramError> {
        // a participant with no record has nothing staked
        if account_info.data_len() == 0 || account_info.owner != program_id {
            return Err(StakeError::NothingStaked.into());
        }

        let record = try_from_slice_unchecked::<StakeRecord>(&account_info.data.borrow())?;

        // record is well-typed
        if record.account_type != AccountType::StakeRecord {
            return Err(StakeError::NothingStaked.into());
        }

        // record belongs to the participant and lives at the address derived
        // from them
        if record.owner != *participant_address
            || *account_info.key != find_stake_record_address(program_id, participant_address)
        {
            return Err(StakeError::AccountOwnerMismatch.into());
        }

        Ok(record)
    }
}
