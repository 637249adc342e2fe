#![allow(dead_code)] // needed because cargo doesn't understand test usage

use {
    solana_program_test::*,
    solana_sdk::{
        account::Account as SolanaAccount,
        borsh1::try_from_slice_unchecked,
        hash::Hash,
        program_error::ProgramError,
        pubkey::Pubkey,
        signature::{Keypair, Signer},
        system_instruction,
        transaction::{Transaction, TransactionError},
    },
    token_staking::{
        find_pool_address, find_stake_record_address, find_vault_address, id, instruction,
        processor::Processor,
        state::{StakePool, StakeRecord},
    },
};

pub use token::*;

pub const PARTICIPANT_STARTING_LAMPORTS: u64 = 10_000_000_000; // 10 sol
pub const STARTING_TOKEN_BALANCE: u64 = 100;

pub fn program_test() -> ProgramTest {
    let mut program_test = ProgramTest::new("token_staking", id(), processor!(Processor::process));
    program_test.prefer_bpf(false);
    program_test
}

#[derive(Debug)]
pub struct StakingAccounts {
    pub mint: Keypair,
    pub mint_authority: Keypair,
    pub participant: Keypair,
    pub participant_token: Keypair,
    pub pool: Pubkey,
    pub pool_vault: Pubkey,
    pub stake_record: Pubkey,
    pub vault: Pubkey,
}
impl StakingAccounts {
    // creates the mint and initializes the pool for it
    pub async fn initialize(&self, context: &mut ProgramTestContext) {
        create_mint(
            &mut context.banks_client,
            &context.payer,
            &context.last_blockhash,
            &self.mint,
            &self.mint_authority.pubkey(),
        )
        .await;

        let transaction = Transaction::new_signed_with_payer(
            &[instruction::initialize(
                &id(),
                &context.payer.pubkey(),
                &self.mint.pubkey(),
            )],
            Some(&context.payer.pubkey()),
            &[&context.payer],
            context.last_blockhash,
        );
        context
            .banks_client
            .process_transaction(transaction)
            .await
            .unwrap();
    }

    // does everything in initialize plus sets the participant up with sol and
    // a funded token account
    pub async fn initialize_with_participant(
        &self,
        context: &mut ProgramTestContext,
        starting_token_balance: u64,
    ) {
        self.initialize(context).await;

        transfer(
            &mut context.banks_client,
            &context.payer,
            &context.last_blockhash,
            &self.participant.pubkey(),
            PARTICIPANT_STARTING_LAMPORTS,
        )
        .await;

        create_token_account(
            &mut context.banks_client,
            &context.payer,
            &context.last_blockhash,
            &self.participant_token,
            &self.mint.pubkey(),
            &self.participant.pubkey(),
        )
        .await;

        mint_tokens(
            &mut context.banks_client,
            &context.payer,
            &context.last_blockhash,
            &self.mint.pubkey(),
            &self.participant_token.pubkey(),
            &self.mint_authority,
            starting_token_balance,
        )
        .await;
    }

    pub async fn stake(
        &self,
        context: &mut ProgramTestContext,
        amount: u64,
    ) -> Result<(), BanksClientError> {
        let transaction = Transaction::new_signed_with_payer(
            &[instruction::stake(
                &id(),
                &self.participant.pubkey(),
                &self.participant_token.pubkey(),
                &self.mint.pubkey(),
                amount,
            )],
            Some(&context.payer.pubkey()),
            &[&context.payer, &self.participant],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(transaction).await
    }

    pub async fn destake(&self, context: &mut ProgramTestContext) -> Result<(), BanksClientError> {
        let transaction = Transaction::new_signed_with_payer(
            &[instruction::destake(
                &id(),
                &self.participant.pubkey(),
                &self.participant_token.pubkey(),
                &self.mint.pubkey(),
            )],
            Some(&context.payer.pubkey()),
            &[&context.payer, &self.participant],
            context.last_blockhash,
        );
        context.banks_client.process_transaction(transaction).await
    }

    // simulates external reward funding arriving in the pool vault
    pub async fn fund_pool_vault(&self, context: &mut ProgramTestContext, amount: u64) {
        mint_tokens(
            &mut context.banks_client,
            &context.payer,
            &context.last_blockhash,
            &self.mint.pubkey(),
            &self.pool_vault,
            &self.mint_authority,
            amount,
        )
        .await;
    }
}
impl Default for StakingAccounts {
    fn default() -> Self {
        let participant = Keypair::new();
        let pool = find_pool_address(&id());

        Self {
            mint: Keypair::new(),
            mint_authority: Keypair::new(),
            participant_token: Keypair::new(),
            pool,
            pool_vault: find_vault_address(&id(), &pool),
            stake_record: find_stake_record_address(&id(), &participant.pubkey()),
            vault: find_vault_address(&id(), &participant.pubkey()),
            participant,
        }
    }
}

pub async fn refresh_blockhash(context: &mut ProgramTestContext) {
    context.last_blockhash = context
        .banks_client
        .get_new_latest_blockhash(&context.last_blockhash)
        .await
        .unwrap();
}

pub async fn get_account(banks_client: &mut BanksClient, pubkey: &Pubkey) -> SolanaAccount {
    banks_client
        .get_account(*pubkey)
        .await
        .expect("client error")
        .expect("account not found")
}

pub async fn get_stake_pool(banks_client: &mut BanksClient, pool: &Pubkey) -> StakePool {
    let account = get_account(banks_client, pool).await;
    try_from_slice_unchecked::<StakePool>(account.data.as_slice()).unwrap()
}

pub async fn get_stake_record(banks_client: &mut BanksClient, record: &Pubkey) -> StakeRecord {
    let account = get_account(banks_client, record).await;
    try_from_slice_unchecked::<StakeRecord>(account.data.as_slice()).unwrap()
}

pub async fn transfer(
    banks_client: &mut BanksClient,
    payer: &Keypair,
    recent_blockhash: &Hash,
    recipient: &Pubkey,
    amount: u64,
) {
    let transaction = Transaction::new_signed_with_payer(
        &[system_instruction::transfer(
            &payer.pubkey(),
            recipient,
            amount,
        )],
        Some(&payer.pubkey()),
        &[payer],
        *recent_blockhash,
    );
    banks_client.process_transaction(transaction).await.unwrap();
}

pub fn check_error<T: Clone + std::fmt::Debug>(got: BanksClientError, expected: T)
where
    ProgramError: TryFrom<T>,
{
    // banks error -> transaction error -> instruction error -> program error
    let got_p: ProgramError = if let TransactionError::InstructionError(_, e) = got.unwrap() {
        e.try_into().unwrap()
    } else {
        panic!(
            "couldn't convert {:?} to ProgramError (expected {:?})",
            got, expected
        );
    };

    let expected_p = match expected.clone().try_into() {
        Ok(v) => v,
        Err(_) => panic!("could not unwrap {:?}", expected),
    };

    if got_p != expected_p {
        panic!(
            "error comparison failed!\n\nGOT: {:#?} / ({:?})\n\nEXPECTED: {:#?} / ({:?})\n\n",
            got, got_p, expected, expected_p
        );
    }
}
