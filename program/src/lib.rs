#![deny(missing_docs)]

//! A program for staking fungible tokens in program-derived custody vaults

pub mod error;
pub mod instruction;
pub mod processor;
pub mod state;

#[cfg(not(feature = "no-entrypoint"))]
pub mod entrypoint;

// export current sdk types for downstream users building with a different sdk
// version
pub use solana_program;
use solana_program::pubkey::Pubkey;

solana_program::declare_id!("TokenStak1ng1111111111111111111111111111111");

const STAKE_POOL_PREFIX: &[u8] = b"stake_pool";
const STAKE_RECORD_PREFIX: &[u8] = b"stake_info";
const VAULT_PREFIX: &[u8] = b"token";

fn find_pool_address_and_bump(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[STAKE_POOL_PREFIX], program_id)
}

fn find_stake_record_address_and_bump(
    program_id: &Pubkey,
    participant_address: &Pubkey,
) -> (Pubkey, u8) {
    Pubkey::find_program_address(
        &[STAKE_RECORD_PREFIX, participant_address.as_ref()],
        program_id,
    )
}

fn find_vault_address_and_bump(program_id: &Pubkey, holder_address: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[VAULT_PREFIX, holder_address.as_ref()], program_id)
}

/// Find the canonical stake pool address. One pool exists per program
/// deployment.
pub fn find_pool_address(program_id: &Pubkey) -> Pubkey {
    find_pool_address_and_bump(program_id).0
}

/// Find the canonical stake record address for a given participant.
pub fn find_stake_record_address(program_id: &Pubkey, participant_address: &Pubkey) -> Pubkey {
    find_stake_record_address_and_bump(program_id, participant_address).0
}

/// Find the canonical vault address for a given holder identity. Participant
/// vaults are derived from the participant address, the pool vault from the
/// pool address.
pub fn find_vault_address(program_id: &Pubkey, holder_address: &Pubkey) -> Pubkey {
    find_vault_address_and_bump(program_id, holder_address).0
}
