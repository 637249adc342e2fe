//! Program state processor

use {
    crate::{
        error::StakeError,
        find_pool_address_and_bump, find_stake_record_address_and_bump,
        find_vault_address_and_bump,
        instruction::StakeInstruction,
        state::{AccountType, StakePool, StakeRecord},
        STAKE_POOL_PREFIX, STAKE_RECORD_PREFIX, VAULT_PREFIX,
    },
    borsh::BorshDeserialize,
    solana_program::{
        account_info::{next_account_info, AccountInfo},
        borsh1::{get_packed_len, try_from_slice_unchecked},
        entrypoint::ProgramResult,
        msg,
        program::{invoke, invoke_signed},
        program_error::ProgramError,
        program_pack::Pack,
        pubkey::Pubkey,
        rent::Rent,
        system_instruction, system_program,
        sysvar::Sysvar,
    },
    spl_token::state::{Account as TokenAccount, Mint},
};

/// Determine the pool-funded portion of a destake payout, in base units of
/// the pool mint. No payout schedule is currently defined, so destake returns
/// principal only and external funding stays in the pool vault.
fn pool_payout_amount(_record: &StakeRecord) -> u64 {
    0
}

/// Check a client-supplied address against its derivation
fn check_derived_address(
    derived: (Pubkey, u8),
    check_address: &Pubkey,
    pda_name: &str,
) -> Result<u8, ProgramError> {
    let (derived_address, bump_seed) = derived;
    if *check_address != derived_address {
        msg!(
            "Incorrect {} address: expected {}, received {}",
            pda_name,
            derived_address,
            check_address,
        );
        Err(StakeError::AccountOwnerMismatch.into())
    } else {
        Ok(bump_seed)
    }
}

/// Check system program address
fn check_system_program(program_id: &Pubkey) -> Result<(), ProgramError> {
    if *program_id != system_program::id() {
        msg!(
            "Expected system program {}, received {}",
            system_program::id(),
            program_id
        );
        Err(ProgramError::IncorrectProgramId)
    } else {
        Ok(())
    }
}

/// Check token program address
fn check_token_program(address: &Pubkey) -> Result<(), ProgramError> {
    if *address != spl_token::id() {
        msg!(
            "Incorrect token program, expected {}, received {}",
            spl_token::id(),
            address
        );
        Err(ProgramError::IncorrectProgramId)
    } else {
        Ok(())
    }
}

/// Check account owner is the given program
fn check_account_owner(
    account_info: &AccountInfo,
    program_id: &Pubkey,
) -> Result<(), ProgramError> {
    if *program_id != *account_info.owner {
        msg!(
            "Expected account to be owned by program {}, received {}",
            program_id,
            account_info.owner
        );
        Err(ProgramError::IncorrectProgramId)
    } else {
        Ok(())
    }
}

/// Check the mint is a valid initialized token mint
fn check_pool_mint(mint_info: &AccountInfo) -> Result<Mint, ProgramError> {
    if *mint_info.owner != spl_token::id() {
        msg!("Mint {} is not owned by the token program", mint_info.key);
        return Err(StakeError::InvalidTokenClass.into());
    }
    Mint::unpack(&mint_info.data.borrow()).map_err(|_| StakeError::InvalidTokenClass.into())
}

/// Unpack a token account and check its authority and mint
fn check_token_account(
    account_info: &AccountInfo,
    expected_owner: &Pubkey,
    expected_mint: &Pubkey,
) -> Result<TokenAccount, ProgramError> {
    check_account_owner(account_info, &spl_token::id())?;

    let token_account = TokenAccount::unpack(&account_info.data.borrow())?;
    if token_account.owner != *expected_owner || token_account.mint != *expected_mint {
        msg!("Token account {} owner or mint mismatch", account_info.key);
        return Err(StakeError::AccountOwnerMismatch.into());
    }

    Ok(token_account)
}

/// Create a program-derived account, funded by the payer. Covers the case
/// where the address already carries lamports and cannot be created outright.
fn create_pda_account<'a>(
    payer: &AccountInfo<'a>,
    rent: &Rent,
    space: usize,
    owner: &Pubkey,
    system_program: &AccountInfo<'a>,
    new_pda_account: &AccountInfo<'a>,
    new_pda_signer_seeds: &[&[u8]],
) -> ProgramResult {
    if new_pda_account.lamports() > 0 {
        let required_lamports = rent
            .minimum_balance(space)
            .max(1)
            .saturating_sub(new_pda_account.lamports());

        if required_lamports > 0 {
            invoke(
                &system_instruction::transfer(payer.key, new_pda_account.key, required_lamports),
                &[
                    payer.clone(),
                    new_pda_account.clone(),
                    system_program.clone(),
                ],
            )?;
        }

        invoke_signed(
            &system_instruction::allocate(new_pda_account.key, space as u64),
            &[new_pda_account.clone(), system_program.clone()],
            &[new_pda_signer_seeds],
        )?;

        invoke_signed(
            &system_instruction::assign(new_pda_account.key, owner),
            &[new_pda_account.clone(), system_program.clone()],
            &[new_pda_signer_seeds],
        )
    } else {
        invoke_signed(
            &system_instruction::create_account(
                payer.key,
                new_pda_account.key,
                rent.minimum_balance(space).max(1),
                space as u64,
                owner,
            ),
            &[
                payer.clone(),
                new_pda_account.clone(),
                system_program.clone(),
            ],
            &[new_pda_signer_seeds],
        )
    }
}

/// Program state handler.
pub struct Processor {}
impl Processor {
    /// Transfer tokens with the participant's own signature as authority
    fn token_transfer<'a>(
        token_program: AccountInfo<'a>,
        source: AccountInfo<'a>,
        mint: AccountInfo<'a>,
        destination: AccountInfo<'a>,
        authority: AccountInfo<'a>,
        decimals: u8,
        amount: u64,
    ) -> Result<(), ProgramError> {
        let ix = spl_token::instruction::transfer_checked(
            token_program.key,
            source.key,
            mint.key,
            destination.key,
            authority.key,
            &[],
            amount,
            decimals,
        )?;

        invoke(&ix, &[source, mint, destination, authority])
    }

    /// Transfer tokens out of a participant vault, signed with the vault's
    /// own seeds
    #[allow(clippy::too_many_arguments)]
    fn vault_transfer<'a>(
        participant_key: &Pubkey,
        token_program: AccountInfo<'a>,
        vault: AccountInfo<'a>,
        mint: AccountInfo<'a>,
        destination: AccountInfo<'a>,
        bump_seed: u8,
        decimals: u8,
        amount: u64,
    ) -> Result<(), ProgramError> {
        let vault_seeds = &[VAULT_PREFIX, participant_key.as_ref(), &[bump_seed]];
        let signers = &[&vault_seeds[..]];

        let ix = spl_token::instruction::transfer_checked(
            token_program.key,
            vault.key,
            mint.key,
            destination.key,
            vault.key,
            &[],
            amount,
            decimals,
        )?;

        invoke_signed(&ix, &[vault.clone(), mint, destination, vault], signers)
    }

    /// Transfer tokens out of the pool vault, signed with the pool's seeds
    #[allow(clippy::too_many_arguments)]
    fn pool_transfer<'a>(
        token_program: AccountInfo<'a>,
        pool_vault: AccountInfo<'a>,
        mint: AccountInfo<'a>,
        destination: AccountInfo<'a>,
        pool: AccountInfo<'a>,
        bump_seed: u8,
        decimals: u8,
        amount: u64,
    ) -> Result<(), ProgramError> {
        let pool_seeds = &[STAKE_POOL_PREFIX, &[bump_seed]];
        let signers = &[&pool_seeds[..]];

        let ix = spl_token::instruction::transfer_checked(
            token_program.key,
            pool_vault.key,
            mint.key,
            destination.key,
            pool.key,
            &[],
            amount,
            decimals,
        )?;

        invoke_signed(&ix, &[pool_vault, mint, destination, pool], signers)
    }

    fn process_initialize(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let payer_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let pool_vault_info = next_account_info(account_info_iter)?;
        let mint_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        if !payer_info.is_signer {
            msg!("Payer did not sign the instruction");
            return Err(StakeError::Unauthorized.into());
        }

        let pool_bump_seed =
            check_derived_address(find_pool_address_and_bump(program_id), pool_info.key, "pool")?;
        let vault_bump_seed = check_derived_address(
            find_vault_address_and_bump(program_id, pool_info.key),
            pool_vault_info.key,
            "pool vault",
        )?;
        check_system_program(system_program_info.key)?;
        check_token_program(token_program_info.key)?;
        check_pool_mint(mint_info)?;

        if pool_info.data_len() != 0 {
            return Err(StakeError::AlreadyInitialized.into());
        }

        let rent = Rent::get()?;

        // create the pool record
        let pool_seeds = &[STAKE_POOL_PREFIX, &[pool_bump_seed]];
        create_pda_account(
            payer_info,
            &rent,
            get_packed_len::<StakePool>(),
            program_id,
            system_program_info,
            pool_info,
            pool_seeds,
        )?;

        let mut pool = try_from_slice_unchecked::<StakePool>(&pool_info.data.borrow())?;
        pool.account_type = AccountType::StakePool;
        pool.token_mint = *mint_info.key;
        pool.vault = *pool_vault_info.key;
        borsh::to_writer(&mut pool_info.data.borrow_mut()[..], &pool)?;

        // create the pool vault, authority is the pool itself
        let vault_seeds = &[VAULT_PREFIX, pool_info.key.as_ref(), &[vault_bump_seed]];
        create_pda_account(
            payer_info,
            &rent,
            TokenAccount::LEN,
            token_program_info.key,
            system_program_info,
            pool_vault_info,
            vault_seeds,
        )?;

        invoke(
            &spl_token::instruction::initialize_account3(
                token_program_info.key,
                pool_vault_info.key,
                mint_info.key,
                pool_info.key,
            )?,
            &[pool_vault_info.clone(), mint_info.clone()],
        )?;

        Ok(())
    }

    fn process_stake(program_id: &Pubkey, accounts: &[AccountInfo], amount: u64) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let record_info = next_account_info(account_info_iter)?;
        let participant_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let mint_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let participant_token_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        if !participant_info.is_signer {
            msg!("Participant did not sign the instruction");
            return Err(StakeError::Unauthorized.into());
        }
        if amount == 0 {
            return Err(StakeError::InvalidAmount.into());
        }

        let record_bump_seed = check_derived_address(
            find_stake_record_address_and_bump(program_id, participant_info.key),
            record_info.key,
            "stake record",
        )?;
        let vault_bump_seed = check_derived_address(
            find_vault_address_and_bump(program_id, participant_info.key),
            vault_info.key,
            "participant vault",
        )?;
        check_system_program(system_program_info.key)?;
        check_token_program(token_program_info.key)?;

        let pool = StakePool::from_account_info(pool_info, program_id)?;
        if *mint_info.key != pool.token_mint {
            msg!(
                "Expected pool mint {}, received {}",
                pool.token_mint,
                mint_info.key
            );
            return Err(StakeError::AccountOwnerMismatch.into());
        }
        let mint = Mint::unpack(&mint_info.data.borrow())?;

        let participant_token =
            check_token_account(participant_token_info, participant_info.key, &pool.token_mint)?;
        if participant_token.amount < amount {
            msg!(
                "Stake amount {} exceeds token balance {}",
                amount,
                participant_token.amount
            );
            return Err(StakeError::InsufficientFunds.into());
        }

        // a pre-existing vault must already be the participant's custody
        // account for the pool mint
        if vault_info.data_len() != 0 {
            check_token_account(vault_info, vault_info.key, &pool.token_mint)?;
        }

        let current_amount = if record_info.data_len() == 0 {
            0
        } else {
            StakeRecord::from_account_info(record_info, program_id, participant_info.key)?
                .amount_staked
        };
        let new_amount = current_amount
            .checked_add(amount)
            .ok_or(StakeError::ArithmeticOverflow)?;

        // all validations passed, create missing accounts and commit
        let rent = Rent::get()?;

        if record_info.data_len() == 0 {
            let record_seeds = &[
                STAKE_RECORD_PREFIX,
                participant_info.key.as_ref(),
                &[record_bump_seed],
            ];
            create_pda_account(
                participant_info,
                &rent,
                get_packed_len::<StakeRecord>(),
                program_id,
                system_program_info,
                record_info,
                record_seeds,
            )?;
        }

        if vault_info.data_len() == 0 {
            let vault_seeds = &[
                VAULT_PREFIX,
                participant_info.key.as_ref(),
                &[vault_bump_seed],
            ];
            create_pda_account(
                participant_info,
                &rent,
                TokenAccount::LEN,
                token_program_info.key,
                system_program_info,
                vault_info,
                vault_seeds,
            )?;

            invoke(
                &spl_token::instruction::initialize_account3(
                    token_program_info.key,
                    vault_info.key,
                    mint_info.key,
                    vault_info.key,
                )?,
                &[vault_info.clone(), mint_info.clone()],
            )?;
        }

        let mut record = try_from_slice_unchecked::<StakeRecord>(&record_info.data.borrow())?;
        record.account_type = AccountType::StakeRecord;
        record.owner = *participant_info.key;
        record.amount_staked = new_amount;
        borsh::to_writer(&mut record_info.data.borrow_mut()[..], &record)?;

        Self::token_transfer(
            token_program_info.clone(),
            participant_token_info.clone(),
            mint_info.clone(),
            vault_info.clone(),
            participant_info.clone(),
            mint.decimals,
            amount,
        )?;

        Ok(())
    }

    fn process_destake(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let record_info = next_account_info(account_info_iter)?;
        let participant_info = next_account_info(account_info_iter)?;
        let pool_info = next_account_info(account_info_iter)?;
        let mint_info = next_account_info(account_info_iter)?;
        let pool_vault_info = next_account_info(account_info_iter)?;
        let vault_info = next_account_info(account_info_iter)?;
        let participant_token_info = next_account_info(account_info_iter)?;
        let token_program_info = next_account_info(account_info_iter)?;

        if !participant_info.is_signer {
            msg!("Participant did not sign the instruction");
            return Err(StakeError::Unauthorized.into());
        }

        let pool_bump_seed =
            check_derived_address(find_pool_address_and_bump(program_id), pool_info.key, "pool")?;
        let vault_bump_seed = check_derived_address(
            find_vault_address_and_bump(program_id, participant_info.key),
            vault_info.key,
            "participant vault",
        )?;
        check_token_program(token_program_info.key)?;

        let pool = StakePool::from_account_info(pool_info, program_id)?;
        if *mint_info.key != pool.token_mint {
            msg!(
                "Expected pool mint {}, received {}",
                pool.token_mint,
                mint_info.key
            );
            return Err(StakeError::AccountOwnerMismatch.into());
        }
        let mint = Mint::unpack(&mint_info.data.borrow())?;

        if *pool_vault_info.key != pool.vault {
            msg!(
                "Expected pool vault {}, received {}",
                pool.vault,
                pool_vault_info.key
            );
            return Err(StakeError::AccountOwnerMismatch.into());
        }

        let mut record =
            StakeRecord::from_account_info(record_info, program_id, participant_info.key)?;
        if record.amount_staked == 0 {
            return Err(StakeError::NothingStaked.into());
        }

        check_token_account(vault_info, vault_info.key, &pool.token_mint)?;
        let pool_vault = check_token_account(pool_vault_info, pool_info.key, &pool.token_mint)?;
        check_token_account(participant_token_info, participant_info.key, &pool.token_mint)?;

        let principal = record.amount_staked;
        let payout = pool_payout_amount(&record);
        if payout > pool_vault.amount {
            msg!(
                "Pool payout {} exceeds pool vault balance {}",
                payout,
                pool_vault.amount
            );
            return Err(StakeError::InsufficientPoolFunds.into());
        }

        // all validations passed, zero the record and pay out
        record.amount_staked = 0;
        borsh::to_writer(&mut record_info.data.borrow_mut()[..], &record)?;

        Self::vault_transfer(
            participant_info.key,
            token_program_info.clone(),
            vault_info.clone(),
            mint_info.clone(),
            participant_token_info.clone(),
            vault_bump_seed,
            mint.decimals,
            principal,
        )?;

        if payout > 0 {
            Self::pool_transfer(
                token_program_info.clone(),
                pool_vault_info.clone(),
                mint_info.clone(),
                participant_token_info.clone(),
                pool_info.clone(),
                pool_bump_seed,
                mint.decimals,
                payout,
            )?;
        }

        Ok(())
    }

    /// Process an instruction
    pub fn process(program_id: &Pubkey, accounts: &[AccountInfo], input: &[u8]) -> ProgramResult {
        let instruction = StakeInstruction::try_from_slice(input)?;
        match instruction {
            StakeInstruction::Initialize => {
                msg!("Instruction: Initialize");
                Self::process_initialize(program_id, accounts)
            }
            StakeInstruction::Stake { amount } => {
                msg!("Instruction: Stake");
                Self::process_stake(program_id, accounts, amount)
            }
            StakeInstruction::Destake => {
                msg!("Instruction: Destake");
                Self::process_destake(program_id, accounts)
            }
        }
    }
}
