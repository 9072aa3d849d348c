//! HandleOps instruction handler
//!
//! Two phases. Validation runs for every operation first: deploy the sender
//! if asked to, let the account authorize the operation and pay what it
//! owes, escrow the prefund from the sender's or the sponsor's deposit and
//! check the returned validity windows. Any failure rolls the whole batch
//! back. Execution then runs every operation in order; a revert only undoes
//! that operation's call, the fee is charged regardless.

use aakit_assertions::{check_condition, check_covers};
use aakit_interface::{
    CallContext, Ledger, LedgerError, Revert, SponsorRequest, ValidationRequest,
};
use aakit_state::{
    Address, InsufficientFundsError, Operation, OperationHash, ValidationData, ValidationError,
};
use tracing::{debug, info, warn};

use crate::entry_point::EntryPoint;
use crate::error::EntryPointError;
use crate::events::Event;

/// What validation established about one operation.
#[derive(Debug, Clone, Copy)]
struct Prepared {
    op_hash: OperationHash,
    sponsor: Option<Address>,
    prefund: u128,
    validation_gas: u64,
}

/// Result of executing one operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub op_hash: OperationHash,
    pub sender: Address,
    pub success: bool,
    pub actual_gas_used: u64,
    pub actual_gas_cost: u128,
    /// Payload of the failed call
    pub revert: Option<Revert>,
}

impl EntryPoint {
    /// Validates, then executes, `ops` in submission order and pays the
    /// collected fees to `beneficiary`.
    ///
    /// Returns `FailedOp` without any state change if any operation fails
    /// validation. Execution failures are reported in the outcomes and as
    /// `OperationRevertReason` events.
    pub fn handle_ops(
        &mut self,
        ledger: &mut Ledger,
        ops: &[Operation],
        beneficiary: Address,
    ) -> Result<Vec<OperationOutcome>, EntryPointError> {
        check_condition(
            !beneficiary.is_zero() && beneficiary != self.address,
            EntryPointError::InvalidBeneficiary,
        )?;
        info!("HandleOps: {} operations, beneficiary {}", ops.len(), beneficiary);

        let checkpoint = ledger.checkpoint();
        let stakes = self.stakes.clone();
        let mut events = Vec::new();

        let mut prepared = Vec::with_capacity(ops.len());
        for (op_index, op) in ops.iter().enumerate() {
            match self.validate_prepayment(ledger, op, &mut events) {
                Ok(ready) => prepared.push(ready),
                Err(reason) => {
                    ledger.stop_metering();
                    ledger.restore(checkpoint);
                    self.stakes = stakes;
                    warn!(
                        "Operation {} from {} failed validation: {} {}",
                        op_index,
                        op.sender,
                        reason.code(),
                        reason
                    );
                    return Err(EntryPointError::FailedOp {
                        op_index,
                        sender: op.sender,
                        reason,
                    });
                },
            }
        }

        match self.execute_all(ledger, ops, &prepared, beneficiary, &mut events) {
            Ok(outcomes) => {
                self.events.extend(events);
                Ok(outcomes)
            },
            Err(e) => {
                ledger.restore(checkpoint);
                self.stakes = stakes;
                Err(e)
            },
        }
    }

    fn validate_prepayment(
        &mut self,
        ledger: &mut Ledger,
        op: &Operation,
        events: &mut Vec<Event>,
    ) -> Result<Prepared, ValidationError> {
        let op_hash = self.operation_hash(ledger, op);
        let sponsor = op
            .sponsor()
            .map_err(|_| ValidationError::InvalidSponsorData)?;
        let multiplier = match sponsor {
            Some(_) => self.config.sponsored_verification_multiplier,
            None => 1,
        };
        let prefund = op.required_prefund(multiplier);

        ledger.start_metering(op.verification_gas_limit);
        self.deploy_sender(ledger, op, &op_hash, sponsor, events)?;

        let missing_funds = match sponsor {
            Some(_) => 0,
            None => prefund.saturating_sub(self.stakes.balance_of(&op.sender)),
        };
        let account_window = self.validate_account(ledger, op, op_hash, missing_funds)?;

        let sponsor_window = match sponsor {
            Some(sponsor) => Some(self.validate_sponsor(ledger, op, op_hash, sponsor, prefund)?),
            None => {
                self.escrow_prefund(op.sender, prefund, false)?;
                None
            },
        };

        let now = ledger.timestamp();
        if !account_window.contains(now) {
            return Err(ValidationError::ExpiredOrNotDue {
                valid_after: account_window.valid_after,
                valid_until: account_window.valid_until,
                now,
            });
        }
        if let Some(window) = sponsor_window.filter(|window| !window.contains(now)) {
            return Err(ValidationError::SponsorExpiredOrNotDue {
                valid_after: window.valid_after,
                valid_until: window.valid_until,
                now,
            });
        }

        let validation_gas = ledger.stop_metering();
        if validation_gas > op.verification_gas_limit {
            return Err(ValidationError::OverVerificationGasLimit {
                limit: op.verification_gas_limit,
                used: validation_gas,
            });
        }

        debug!("Validated operation {} from {}", op_hash, op.sender);
        Ok(Prepared {
            op_hash,
            sponsor,
            prefund,
            validation_gas,
        })
    }

    /// Runs `init_code`, if any. The factory must deploy exactly `op.sender`.
    fn deploy_sender(
        &mut self,
        ledger: &mut Ledger,
        op: &Operation,
        op_hash: &OperationHash,
        sponsor: Option<Address>,
        events: &mut Vec<Event>,
    ) -> Result<(), ValidationError> {
        let Some((factory, factory_data)) = op
            .factory()
            .map_err(|e| ValidationError::InitCodeFailed(e.to_string()))?
        else {
            return Ok(());
        };
        if ledger.has_code(&op.sender) {
            return Err(ValidationError::SenderAlreadyConstructed);
        }

        let returned = match ledger.call(self.address, factory, 0, factory_data) {
            Ok(returned) => returned,
            Err(revert) => {
                let used = ledger.gas_used();
                if used > op.verification_gas_limit {
                    return Err(ValidationError::OverVerificationGasLimit {
                        limit: op.verification_gas_limit,
                        used,
                    });
                }
                return Err(ValidationError::InitCodeFailed(revert.decoded().to_string()));
            },
        };
        let returned = Address::from_slice(&returned).unwrap_or(Address::ZERO);
        if returned != op.sender {
            return Err(ValidationError::InitCodeSenderMismatch {
                expected: op.sender,
                returned,
            });
        }
        if !ledger.has_code(&op.sender) {
            return Err(ValidationError::InitCodeDidNotDeploy);
        }

        info!("Account {} deployed by factory {}", op.sender, factory);
        events.push(Event::AccountDeployed {
            op_hash: *op_hash,
            sender: op.sender,
            factory,
            sponsor,
        });
        Ok(())
    }

    /// Asks the sender to authorize `op` and credits whatever it paid.
    fn validate_account(
        &mut self,
        ledger: &mut Ledger,
        op: &Operation,
        op_hash: OperationHash,
        missing_funds: u128,
    ) -> Result<ValidationData, ValidationError> {
        let sender = op.sender;
        let ctx = CallContext {
            caller: self.address,
            address: sender,
            value: 0,
        };
        let request = ValidationRequest {
            op,
            op_hash,
            missing_funds,
        };

        let balance_before = ledger.balance(&self.address);
        let window = ledger
            .with_contract_mut(&sender, |code, ledger| match code.as_account() {
                Some(account) => account.validate_operation(ledger, &ctx, &request),
                None => Err(ValidationError::NotAnAccount(sender)),
            })
            .map_err(|e| match e {
                LedgerError::NoCode(_) => ValidationError::AccountNotDeployed,
                _ => ValidationError::NotAnAccount(sender),
            })??;

        let received = ledger.balance(&self.address).saturating_sub(balance_before);
        if received > 0 {
            // bounded by the coordinator's own balance
            let info = self.stakes.info_mut(sender);
            info.deposit = info.deposit.saturating_add(received);
        }
        Ok(window)
    }

    /// Stake gate, prefund escrow and the sponsor's own approval.
    fn validate_sponsor(
        &mut self,
        ledger: &mut Ledger,
        op: &Operation,
        op_hash: OperationHash,
        sponsor: Address,
        prefund: u128,
    ) -> Result<ValidationData, ValidationError> {
        if !self.stakes.is_staked(&sponsor, &self.config) {
            return Err(ValidationError::SponsorNotStaked(sponsor));
        }
        self.escrow_prefund(sponsor, prefund, true)?;

        let request = SponsorRequest {
            entry_point: self.address,
            op,
            op_hash,
            max_cost: prefund,
        };
        ledger
            .with_contract_mut(&sponsor, |code, ledger| match code.as_sponsor() {
                Some(approver) => approver.validate_sponsored_operation(ledger, &request),
                None => Err(ValidationError::SponsorRejected(format!(
                    "{sponsor} is not a sponsor"
                ))),
            })
            .map_err(|e| ValidationError::SponsorRejected(e.to_string()))?
    }

    fn escrow_prefund(
        &mut self,
        payer: Address,
        prefund: u128,
        sponsored: bool,
    ) -> Result<(), ValidationError> {
        let available = self.stakes.balance_of(&payer);
        let shortfall = InsufficientFundsError {
            payer,
            required: prefund,
            available,
            sponsored,
        };
        check_covers(available, prefund, shortfall)?;
        self.stakes.debit(payer, prefund).map_err(|_| shortfall)?;
        Ok(())
    }

    fn execute_all(
        &mut self,
        ledger: &mut Ledger,
        ops: &[Operation],
        prepared: &[Prepared],
        beneficiary: Address,
        events: &mut Vec<Event>,
    ) -> Result<Vec<OperationOutcome>, EntryPointError> {
        let mut collected = 0u128;
        let mut outcomes = Vec::with_capacity(ops.len());
        for (op, ready) in ops.iter().zip(prepared) {
            let outcome = self.execute_operation(ledger, op, ready, events)?;
            collected = collected.saturating_add(outcome.actual_gas_cost);
            outcomes.push(outcome);
        }
        ledger.transfer(self.address, beneficiary, collected)?;
        info!("Paid {} in fees to {}", collected, beneficiary);
        Ok(outcomes)
    }

    fn execute_operation(
        &mut self,
        ledger: &mut Ledger,
        op: &Operation,
        ready: &Prepared,
        events: &mut Vec<Event>,
    ) -> Result<OperationOutcome, EntryPointError> {
        ledger.start_metering(op.call_gas_limit);
        let result = ledger.call(self.address, op.sender, 0, &op.call_data);
        let execution_gas = ledger.stop_metering().min(op.call_gas_limit);

        let actual_gas_used = ready
            .validation_gas
            .saturating_add(execution_gas)
            .saturating_add(op.pre_verification_gas);
        let actual_gas_cost = u128::from(actual_gas_used)
            .saturating_mul(op.gas_price(ledger.base_fee()))
            .min(ready.prefund);

        let payer = ready.sponsor.unwrap_or(op.sender);
        self.stakes.credit(payer, ready.prefund - actual_gas_cost)?;

        let revert = result.err();
        if let Some(revert) = &revert {
            debug!(
                "Operation {} from {} reverted: {}",
                ready.op_hash, op.sender, revert
            );
            events.push(Event::OperationRevertReason {
                op_hash: ready.op_hash,
                sender: op.sender,
                nonce: op.nonce,
                revert_payload: revert.payload.clone(),
            });
        }
        events.push(Event::OperationEvent {
            op_hash: ready.op_hash,
            sender: op.sender,
            sponsor: ready.sponsor,
            nonce: op.nonce,
            success: revert.is_none(),
            actual_gas_cost,
            actual_gas_used,
        });

        Ok(OperationOutcome {
            op_hash: ready.op_hash,
            sender: op.sender,
            success: revert.is_none(),
            actual_gas_used,
            actual_gas_cost,
            revert,
        })
    }
}
