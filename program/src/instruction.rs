//! Instruction types

use {
    crate::{find_pool_address, find_stake_record_address, find_vault_address},
    borsh::{BorshDeserialize, BorshSerialize},
    solana_program::{
        instruction::{AccountMeta, Instruction},
        pubkey::Pubkey,
        system_program,
    },
};

/// Instructions supported by the TokenStaking program.
#[repr(C)]
#[derive(Clone, Debug, PartialEq, BorshSerialize, BorshDeserialize)]
pub enum StakeInstruction {
    ///   Initialize the stake pool and its custody vault for a given mint.
    ///   One pool exists per program deployment; initializing twice fails.
    ///
    ///   0. `[w, s]` Payer for the new accounts
    ///   1. `[w]` Pool account
    ///   2. `[w]` Pool vault token account
    ///   3. `[]` Mint accepted by the pool
    ///   4. `[]` System program
    ///   5. `[]` Token program
    Initialize,

    ///   Move tokens from the participant's personal token account into
    ///   their custody vault and increase their stake record by the same
    ///   amount. The record and vault are created on first use, funded by
    ///   the participant. Staking on top of an existing stake accumulates.
    ///
    ///   0. `[w]` Stake record account
    ///   1. `[w, s]` Participant
    ///   2. `[]` Pool account
    ///   3. `[]` Mint accepted by the pool
    ///   4. `[w]` Participant vault token account
    ///   5. `[w]` Participant personal token account
    ///   6. `[]` System program
    ///   7. `[]` Token program
    Stake {
        /// Amount to stake, in base units of the pool mint
        amount: u64,
    },

    ///   Pay out the participant's full stake from their custody vault, plus
    ///   any pool-funded amount the payout policy dictates from the pool
    ///   vault, and reset their stake record to zero.
    ///
    ///   0. `[w]` Stake record account
    ///   1. `[s]` Participant
    ///   2. `[]` Pool account
    ///   3. `[]` Mint accepted by the pool
    ///   4. `[w]` Pool vault token account
    ///   5. `[w]` Participant vault token account
    ///   6. `[w]` Participant personal token account
    ///   7. `[]` Token program
    Destake,
}

/// Creates an `Initialize` instruction.
pub fn initialize(program_id: &Pubkey, payer: &Pubkey, token_mint: &Pubkey) -> Instruction {
    let pool_address = find_pool_address(program_id);

    let data = borsh::to_vec(&StakeInstruction::Initialize).unwrap();
    let accounts = vec![
        AccountMeta::new(*payer, true),
        AccountMeta::new(pool_address, false),
        AccountMeta::new(find_vault_address(program_id, &pool_address), false),
        AccountMeta::new_readonly(*token_mint, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Creates a `Stake` instruction.
pub fn stake(
    program_id: &Pubkey,
    participant: &Pubkey,
    participant_token_account: &Pubkey,
    token_mint: &Pubkey,
    amount: u64,
) -> Instruction {
    let data = borsh::to_vec(&StakeInstruction::Stake { amount }).unwrap();
    let accounts = vec![
        AccountMeta::new(find_stake_record_address(program_id, participant), false),
        AccountMeta::new(*participant, true),
        AccountMeta::new_readonly(find_pool_address(program_id), false),
        AccountMeta::new_readonly(*token_mint, false),
        AccountMeta::new(find_vault_address(program_id, participant), false),
        AccountMeta::new(*participant_token_account, false),
        AccountMeta::new_readonly(system_program::id(), false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}

/// Creates a `Destake` instruction.
pub fn destake(
    program_id: &Pubkey,
    participant: &Pubkey,
    participant_token_account: &Pubkey,
    token_mint: &Pubkey,
) -> Instruction {
    let pool_address = find_pool_address(program_id);

    let data = borsh::to_vec(&StakeInstruction::Destake).unwrap();
    let accounts = vec![
        AccountMeta::new(find_stake_record_address(program_id, participant), false),
        AccountMeta::new_readonly(*participant, true),
        AccountMeta::new_readonly(pool_address, false),
        AccountMeta::new_readonly(*token_mint, false),
        AccountMeta::new(find_vault_address(program_id, &pool_address), false),
        AccountMeta::new(find_vault_address(program_id, participant), false),
        AccountMeta::new(*participant_token_account, false),
        AccountMeta::new_readonly(spl_token::id(), false),
    ];

    Instruction {
        program_id: *program_id,
        accounts,
        data,
    }
}
