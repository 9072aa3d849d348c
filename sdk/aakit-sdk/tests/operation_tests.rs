mod common;
use common::*;

use aakit_sdk::basic::actions;
use aakit_sdk::{
    fetch_account_nonce, fetch_deposit_info, revert_reason, send_operations, sign_as_owner,
    AccountHandle, LocalSigner, OperationBuilder, OperationSigner, SdkError, SponsorService,
};
use aakit_state::{Address, ValidationError};
use aakit_verifying_sponsor::VerifyingSponsor;
use assert_matches::assert_matches;

#[tokio::test]
async fn test_owner_operation_round_trip() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let owner = LocalSigner::from_label("owner").map_err(anyhow::Error::msg)?;
    let account = ctx.create_account(&owner, 10_000_000).await?;

    for expected_nonce in 0..2 {
        let op = OperationBuilder::new()
            .with_sender(account.address)
            .with_call(ctx.count("count()"))
            .build_with_nonce(&ctx.connection)
            .await?;
        assert_eq!(op.nonce, expected_nonce);
        let op = sign_as_owner(&ctx.connection, op, &owner).await?;
        let outcomes = send_operations(&ctx.connection, &[op], ctx.beneficiary).await?;
        assert!(outcomes[0].success);
    }

    assert_eq!(ctx.count_of(&account.address).await, 2);
    assert_eq!(fetch_account_nonce(&ctx.connection, &account.address).await?, 2);
    Ok(())
}

#[tokio::test]
async fn test_first_operation_deploys_account() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let owner = LocalSigner::random();
    let account = AccountHandle::counterfactual(ctx.factory, owner.address());
    assert!(!account.is_deployed(&ctx.connection).await?);
    ctx.mint(account.address, 10_000_000).await?;

    let op = OperationBuilder::new()
        .with_sender(account.address)
        .with_init_code(account.init_code())
        .with_call(ctx.count("count()"))
        .build_with_nonce(&ctx.connection)
        .await?;
    assert_eq!(op.nonce, 0);
    let op = sign_as_owner(&ctx.connection, op, &owner).await?;
    send_operations(&ctx.connection, &[op], ctx.beneficiary).await?;

    assert!(account.is_deployed(&ctx.connection).await?);
    assert_eq!(ctx.count_of(&account.address).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_missing_account_without_init_code() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let ghost = Address::from_label("ghost");
    let result = OperationBuilder::new()
        .with_sender(ghost)
        .build_with_nonce(&ctx.connection)
        .await;
    assert_matches!(result, Err(SdkError::AccountNotFound(a)) if a == ghost);
    assert_matches!(
        OperationBuilder::new().build(),
        Err(SdkError::InvalidOperation(_))
    );
    Ok(())
}

#[tokio::test]
async fn test_revert_reason_is_surfaced() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let owner = LocalSigner::random();
    let account = ctx.create_account(&owner, 10_000_000).await?;

    let op = OperationBuilder::new()
        .with_sender(account.address)
        .with_call(ctx.count("countFail()"))
        .build_with_nonce(&ctx.connection)
        .await?;
    let op = sign_as_owner(&ctx.connection, op, &owner).await?;
    let outcomes = send_operations(&ctx.connection, &[op], ctx.beneficiary).await?;

    assert!(!outcomes[0].success);
    assert_eq!(revert_reason(&outcomes[0]).as_deref(), Some("count failed"));
    Ok(())
}

#[tokio::test]
async fn test_rejection_names_the_operation() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let owner = LocalSigner::random();
    let account = ctx.create_account(&owner, 10_000_000).await?;

    let good = OperationBuilder::new()
        .with_sender(account.address)
        .with_call(ctx.count("count()"))
        .build()?;
    let good = sign_as_owner(&ctx.connection, good, &owner).await?;
    let forged = OperationBuilder::new()
        .with_sender(account.address)
        .with_nonce(1)
        .with_call(ctx.count("count()"))
        .build()?;
    let forged = sign_as_owner(&ctx.connection, forged, &LocalSigner::random()).await?;

    let result = send_operations(&ctx.connection, &[good, forged], ctx.beneficiary).await;
    assert_matches!(
        result,
        Err(SdkError::Rejected { op_index: 1, sender, .. }) if sender == account.address
    );
    assert_eq!(ctx.count_of(&account.address).await, 0);
    Ok(())
}

#[tokio::test]
async fn test_sponsored_operation() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let owner = LocalSigner::random();
    let sponsor_signer = LocalSigner::random();
    let sponsor = Address::from_label("aakit.VerifyingSponsor");
    {
        let mut network = ctx.connection.lock().await;
        network
            .ledger
            .deploy(sponsor, Box::new(VerifyingSponsor::new(sponsor_signer.address())))?;
        network.ledger.mint(sponsor, 20_000_000)?;
    }
    actions::deposit_to(&ctx.connection, sponsor, sponsor, 10_000_000).await?;
    actions::add_stake(&ctx.connection, sponsor, 1_000, 3_600).await?;
    let account = ctx.create_account(&owner, 0).await?;

    let op = OperationBuilder::new()
        .with_sender(account.address)
        .with_call(ctx.count("count()"))
        .build_with_nonce(&ctx.connection)
        .await?;
    let op = SponsorService::new(sponsor, &sponsor_signer)
        .sponsor(&ctx.connection, op)
        .await?;
    let op = sign_as_owner(&ctx.connection, op, &owner).await?;
    let outcomes = send_operations(&ctx.connection, &[op], ctx.beneficiary).await?;

    let deposit = fetch_deposit_info(&ctx.connection, &sponsor).await?;
    assert_eq!(deposit.deposit, 10_000_000 - outcomes[0].actual_gas_cost);
    assert_eq!(deposit.stake.amount, 1_000);
    assert_eq!(ctx.count_of(&account.address).await, 1);
    Ok(())
}

#[tokio::test]
async fn test_owner_signature_cannot_predate_sponsor_data() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let owner = LocalSigner::random();
    let sponsor_signer = LocalSigner::random();
    let sponsor = Address::from_label("aakit.VerifyingSponsor");
    {
        let mut network = ctx.connection.lock().await;
        network
            .ledger
            .deploy(sponsor, Box::new(VerifyingSponsor::new(sponsor_signer.address())))?;
        network.ledger.mint(sponsor, 20_000_000)?;
    }
    actions::deposit_to(&ctx.connection, sponsor, sponsor, 10_000_000).await?;
    actions::add_stake(&ctx.connection, sponsor, 1_000, 3_600).await?;
    let account = ctx.create_account(&owner, 0).await?;

    let op = OperationBuilder::new()
        .with_sender(account.address)
        .with_call(ctx.count("count()"))
        .build()?;
    // signed first, so the hash does not cover the sponsor data
    let op = sign_as_owner(&ctx.connection, op, &owner).await?;
    let op = SponsorService::new(sponsor, &sponsor_signer)
        .sponsor(&ctx.connection, op)
        .await?;

    assert_matches!(
        send_operations(&ctx.connection, &[op], ctx.beneficiary).await,
        Err(SdkError::Rejected {
            reason: ValidationError::SignerMismatch { .. },
            ..
        })
    );
    Ok(())
}

#[tokio::test]
async fn test_stake_calls_through_instructions() -> anyhow::Result<()> {
    let ctx = TestContext::new()?;
    let staker = Address::from_label("staker");
    let payee = Address::from_label("payee");
    ctx.mint(staker, 5_000).await?;

    actions::add_stake(&ctx.connection, staker, 2_000, 60).await?;
    assert_matches!(
        actions::withdraw_stake(&ctx.connection, staker, payee).await,
        Err(SdkError::EntryPoint(_))
    );
    actions::unlock_stake(&ctx.connection, staker).await?;
    ctx.connection.lock().await.ledger.advance_time(60);
    actions::withdraw_stake(&ctx.connection, staker, payee).await?;

    actions::deposit_to(&ctx.connection, staker, staker, 1_000).await?;
    actions::withdraw_to(&ctx.connection, staker, payee, 400).await?;

    assert_eq!(fetch_deposit_info(&ctx.connection, &staker).await?.deposit, 600);
    assert_eq!(ctx.connection.lock().await.ledger.balance(&payee), 2_400);
    Ok(())
}
