//! End-to-end admin flows against the in-memory ledger
//!
//! Each test drives `StakingAdmin` the way the CLI does and reads the
//! resulting program state back through the reader.

#[cfg(test)]
mod admin_flow_tests {
    use crate::config::ComputeBudgetConfig;
    use crate::errors::StakingError;
    use crate::program::{
        global_pool_address, instruction_discriminator, user_pool_address, GlobalPoolView,
        STAKING_PROGRAM_ID,
    };
    use crate::rpc::{LedgerClient, RpcError};
    use crate::session::{ProgramClient, Session};
    use crate::submit::{CoSign, SubmissionOutcome};
    use crate::test_utils::MockLedger;
    use crate::wallet::WalletManager;
    use crate::StakingAdmin;
    use solana_sdk::{
        account::Account,
        pubkey::Pubkey,
        signature::{Keypair, Signer},
    };
    use std::io::Write;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn harness() -> (Arc<MockLedger>, StakingAdmin) {
        let ledger = Arc::new(MockLedger::new(STAKING_PROGRAM_ID));
        let session = Session::new(
            ledger.clone() as Arc<dyn LedgerClient>,
            WalletManager::from_keypair(Keypair::new()),
            ProgramClient::anchor(STAKING_PROGRAM_ID),
        );
        (ledger, StakingAdmin::new(session, ComputeBudgetConfig::default()))
    }

    fn program_ids(tx: &solana_sdk::transaction::Transaction) -> Vec<Pubkey> {
        tx.message
            .instructions
            .iter()
            .map(|ix| *ix.program_id(&tx.message.account_keys))
            .collect()
    }

    #[tokio::test]
    async fn test_global_state_absent_before_init() {
        let (ledger, admin) = harness();

        assert_eq!(admin.get_global_state().await.unwrap(), None);

        let err = admin.get_global_info().await.unwrap_err();
        match err {
            StakingError::GlobalStateAbsent { address } => {
                assert_eq!(address, global_pool_address(&STAKING_PROGRAM_ID).0.to_string());
            }
            other => panic!("expected GlobalStateAbsent, got {other:?}"),
        }
        assert_eq!(ledger.broadcast_count(), 0);
    }

    #[tokio::test]
    async fn test_init_sets_wallet_as_admin() {
        let (_ledger, admin) = harness();
        let wallet = admin.session().payer();

        admin.init_project().await.unwrap();

        let state = admin.get_global_state().await.unwrap().unwrap();
        assert_eq!(state.admin, wallet);
        assert_eq!(state.total_locked_count, 0);
        assert_eq!(admin.get_global_info().await.unwrap().admin, wallet.to_string());
    }

    #[tokio::test]
    async fn test_init_twice_is_rejected() {
        let (_ledger, admin) = harness();
        admin.init_project().await.unwrap();

        let err = admin.init_project().await.unwrap_err();
        assert!(matches!(
            err,
            StakingError::Rpc(RpcError::TransactionFailed { .. })
        ));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_change_admin_to_address() {
        let (ledger, admin) = harness();
        let new_admin = Pubkey::new_unique();
        admin.init_project().await.unwrap();

        admin.change_admin(&new_admin.to_string()).await.unwrap();

        let info = admin.get_global_info().await.unwrap();
        assert_eq!(info.admin, new_admin.to_string());

        // The instruction carries exactly the requested address
        let sent = ledger.sent_transactions().await;
        let tx = sent.last().unwrap();
        let ix = tx.message.instructions.last().unwrap();
        assert_eq!(&ix.data[..8], &instruction_discriminator("change_admin"));
        assert_eq!(&ix.data[8..], new_admin.as_ref());
    }

    #[tokio::test]
    async fn test_change_admin_from_keyfile() {
        let (_ledger, admin) = harness();
        let next = Keypair::new();
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            "{}",
            serde_json::to_string(&next.to_bytes().to_vec()).unwrap()
        )
        .unwrap();
        admin.init_project().await.unwrap();

        admin
            .change_admin(file.path().to_str().unwrap())
            .await
            .unwrap();

        let state = admin.get_global_state().await.unwrap().unwrap();
        assert_eq!(state.admin, next.pubkey());
    }

    #[tokio::test]
    async fn test_change_admin_bad_identifier_sends_nothing() {
        let (ledger, admin) = harness();
        admin.init_project().await.unwrap();
        let before = ledger.broadcast_count();

        let err = admin.change_admin("definitely-not-a-key").await.unwrap_err();

        assert!(matches!(err, StakingError::InvalidAdminIdentifier { .. }));
        assert_eq!(ledger.broadcast_count(), before);
    }

    #[tokio::test]
    async fn test_change_admin_twice_requires_current_admin() {
        let (_ledger, admin) = harness();
        admin.init_project().await.unwrap();
        admin
            .change_admin(&Pubkey::new_unique().to_string())
            .await
            .unwrap();

        // The wallet is no longer admin
        let err = admin
            .change_admin(&Pubkey::new_unique().to_string())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StakingError::Rpc(RpcError::TransactionFailed { .. })
        ));
    }

    #[tokio::test]
    async fn test_compute_budget_only_on_init() {
        let (ledger, admin) = harness();
        admin.init_project().await.unwrap();
        admin
            .change_admin(&Pubkey::new_unique().to_string())
            .await
            .unwrap();

        let sent = ledger.sent_transactions().await;
        let init_programs = program_ids(&sent[0]);
        assert_eq!(
            init_programs,
            vec![
                solana_sdk::compute_budget::id(),
                solana_sdk::compute_budget::id(),
                STAKING_PROGRAM_ID
            ]
        );
        assert_eq!(program_ids(&sent[1]), vec![STAKING_PROGRAM_ID]);
    }

    #[tokio::test]
    async fn test_initialize_user_pool() {
        let (ledger, admin) = harness();
        let owner = admin.session().payer();

        assert_eq!(admin.get_user_state(None).await.unwrap(), None);
        admin.initialize_user_pool().await.unwrap();

        let pool = admin.get_user_state(None).await.unwrap().unwrap();
        assert_eq!(pool.owner, owner);
        assert_eq!(pool.item_count, 0);
        assert!(pool.items.is_empty());

        let sent = ledger.sent_transactions().await;
        let programs = program_ids(&sent[0]);
        assert_eq!(programs, vec![solana_sdk::system_program::id(), STAKING_PROGRAM_ID]);
    }

    #[tokio::test]
    async fn test_user_state_for_other_user() {
        let (_ledger, admin) = harness();
        let stranger = Pubkey::new_unique();
        assert_eq!(admin.get_user_state(Some(&stranger)).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_lock_and_unlock_round() {
        let (ledger, admin) = harness();
        let mint = Pubkey::new_unique();
        admin.init_project().await.unwrap();
        admin.initialize_user_pool().await.unwrap();

        let outcome = admin.lock_pnft(&mint, CoSign::Disabled).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Confirmed(_)));
        let pool = admin.get_user_state(None).await.unwrap().unwrap();
        assert!(pool.holds(&mint));
        assert_eq!(
            admin.get_global_state().await.unwrap().unwrap().total_locked_count,
            1
        );

        let outcome = admin.unlock_pnft(&mint, CoSign::Disabled).await.unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Confirmed(_)));
        let pool = admin.get_user_state(None).await.unwrap().unwrap();
        assert!(!pool.holds(&mint));
        assert_eq!(ledger.broadcast_count(), 4);
    }

    #[tokio::test]
    async fn test_lock_cosigned_by_admin() {
        let (ledger, admin) = harness();
        let mint = Pubkey::new_unique();
        let staking_admin = Keypair::new();
        admin.init_project().await.unwrap();
        admin
            .change_admin(&staking_admin.pubkey().to_string())
            .await
            .unwrap();
        admin.initialize_user_pool().await.unwrap();

        let outcome = admin
            .lock_pnft(&mint, CoSign::With(&staking_admin))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Confirmed(_)));

        let sent = ledger.sent_transactions().await;
        let tx = sent.last().unwrap();
        assert_eq!(tx.message.header.num_required_signatures, 2);
        assert!(tx.message.account_keys.contains(&staking_admin.pubkey()));
        assert!(tx.verify().is_ok());
        assert!(admin.get_user_state(None).await.unwrap().unwrap().holds(&mint));

        let outcome = admin
            .unlock_pnft(&mint, CoSign::With(&staking_admin))
            .await
            .unwrap();
        assert!(matches!(outcome, SubmissionOutcome::Confirmed(_)));
        assert!(!admin.get_user_state(None).await.unwrap().unwrap().holds(&mint));
    }

    #[tokio::test]
    async fn test_lock_cosigned_by_non_admin_is_rejected_on_chain() {
        let (ledger, admin) = harness();
        admin.init_project().await.unwrap();
        admin.initialize_user_pool().await.unwrap();
        let stranger = Keypair::new();

        let err = admin
            .lock_pnft(&Pubkey::new_unique(), CoSign::With(&stranger))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            StakingError::Rpc(RpcError::TransactionFailed { .. })
        ));
        assert_eq!(ledger.broadcast_count(), 3);
        assert_eq!(
            admin.get_global_state().await.unwrap().unwrap().total_locked_count,
            0
        );
    }

    #[tokio::test]
    async fn test_decode_failure_is_not_absence() {
        let (ledger, admin) = harness();
        let (address, _) = global_pool_address(&STAKING_PROGRAM_ID);
        ledger
            .set_account(address, ledger.program_account(vec![1, 2, 3]))
            .await;

        let err = admin.get_global_state().await.unwrap_err();
        assert!(matches!(err, StakingError::AccountDecode { .. }));
    }

    #[tokio::test]
    async fn test_foreign_owner_is_rejected() {
        let (ledger, admin) = harness();
        let owner = admin.session().payer();
        let address = user_pool_address(&owner, &STAKING_PROGRAM_ID).unwrap();
        let view = GlobalPoolView {
            admin: owner,
            total_locked_count: 0,
        };
        ledger
            .set_account(
                address,
                Account {
                    lamports: 1,
                    data: view.encode(),
                    owner: Pubkey::new_unique(),
                    executable: false,
                    rent_epoch: 0,
                },
            )
            .await;

        let err = admin.get_user_state(None).await.unwrap_err();
        assert!(matches!(err, StakingError::AccountOwner { .. }));
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces() {
        let (ledger, admin) = harness();
        ledger
            .fail_next_send(RpcError::Transport {
                endpoint: "mock://ledger".to_string(),
                message: "connection reset".to_string(),
            })
            .await;

        let err = admin.init_project().await.unwrap_err();
        assert!(matches!(err, StakingError::Rpc(RpcError::Transport { .. })));
        assert!(err.is_retryable());
        assert_eq!(admin.get_global_state().await.unwrap(), None);
    }
}
