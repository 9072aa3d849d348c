//! Deposit and stake calls on the coordinator.

use aakit_program::EntryPointInstruction;
use aakit_state::Address;

use crate::core::connection::AaConnection;
use crate::error::Result;
use crate::utils::map_connection_error;

async fn send(
    connection: &impl AaConnection,
    caller: Address,
    value: u128,
    instruction: EntryPointInstruction,
) -> Result<()> {
    connection
        .send_instruction(caller, value, &instruction.pack())
        .await
        .map_err(map_connection_error)?;
    Ok(())
}

/// Moves `amount` from `caller`'s balance into `account`'s deposit.
pub async fn deposit_to(
    connection: &impl AaConnection,
    caller: Address,
    account: Address,
    amount: u128,
) -> Result<()> {
    send(connection, caller, amount, EntryPointInstruction::DepositTo { account }).await
}

pub async fn withdraw_to(
    connection: &impl AaConnection,
    caller: Address,
    to: Address,
    amount: u128,
) -> Result<()> {
    send(connection, caller, 0, EntryPointInstruction::WithdrawTo { to, amount }).await
}

pub async fn add_stake(
    connection: &impl AaConnection,
    caller: Address,
    amount: u128,
    unstake_delay: u64,
) -> Result<()> {
    send(
        connection,
        caller,
        amount,
        EntryPointInstruction::AddStake { unstake_delay },
    )
    .await
}

pub async fn unlock_stake(connection: &impl AaConnection, caller: Address) -> Result<()> {
    send(connection, caller, 0, EntryPointInstruction::UnlockStake).await
}

pub async fn withdraw_stake(
    connection: &impl AaConnection,
    caller: Address,
    to: Address,
) -> Result<()> {
    send(connection, caller, 0, EntryPointInstruction::WithdrawStake { to }).await
}
