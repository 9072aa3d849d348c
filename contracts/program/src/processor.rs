//! Instruction Processor
//!
//! Thin dispatcher that routes byte-level instructions to the handlers.

use aakit_interface::Ledger;
use aakit_state::Address;
use tracing::debug;

use crate::actions::OperationOutcome;
use crate::entry_point::EntryPoint;
use crate::error::EntryPointError;
use crate::instruction::EntryPointInstruction;

/// Runs one borsh-encoded [`EntryPointInstruction`] sent by `caller` with
/// `value` attached. Value is only accepted by `DepositTo` and `AddStake`.
pub fn process_instruction(
    entry_point: &mut EntryPoint,
    ledger: &mut Ledger,
    caller: Address,
    value: u128,
    instruction_data: &[u8],
) -> Result<Vec<OperationOutcome>, EntryPointError> {
    let instruction = EntryPointInstruction::unpack(instruction_data).map_err(|e| {
        debug!("Failed to unpack instruction: {}", e);
        e
    })?;
    debug!("Processing {:?} from {}", instruction, caller);

    if value > 0
        && !matches!(
            instruction,
            EntryPointInstruction::DepositTo { .. } | EntryPointInstruction::AddStake { .. }
        )
    {
        return Err(EntryPointError::InvalidInstruction(
            "instruction does not accept value".to_string(),
        ));
    }

    match instruction {
        EntryPointInstruction::HandleOps { ops, beneficiary } => {
            entry_point.handle_ops(ledger, &ops, beneficiary)
        },
        EntryPointInstruction::DepositTo { account } => {
            entry_point.deposit_to(ledger, caller, account, value)?;
            Ok(Vec::new())
        },
        EntryPointInstruction::WithdrawTo { to, amount } => {
            entry_point.withdraw_to(ledger, caller, to, amount)?;
            Ok(Vec::new())
        },
        EntryPointInstruction::AddStake { unstake_delay } => {
            entry_point.add_stake(ledger, caller, value, unstake_delay)?;
            Ok(Vec::new())
        },
        EntryPointInstruction::UnlockStake => {
            entry_point.unlock_stake(ledger, caller)?;
            Ok(Vec::new())
        },
        EntryPointInstruction::WithdrawStake { to } => {
            entry_point.withdraw_stake(ledger, caller, to)?;
            Ok(Vec::new())
        },
    }
}
