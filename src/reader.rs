//! Program state reader
//!
//! Reads are tri-state: `Ok(Some(view))` when the account exists and decodes,
//! `Ok(None)` when it does not exist, `Err` for network and decode failures.

use crate::errors::{StakingError, StakingResult};
use crate::metrics::metrics;
use crate::program::{
    pda::{global_pool_address, user_pool_address},
    state::DecodeError,
    GlobalPoolView, UserPoolView,
};
use crate::session::Session;
use crate::structured_logging::OperationLogger;
use serde::Serialize;
use solana_sdk::{account::Account, pubkey::Pubkey};

/// Public summary of the global pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GlobalInfo {
    pub admin: String,
}

impl From<&GlobalPoolView> for GlobalInfo {
    fn from(view: &GlobalPoolView) -> Self {
        Self {
            admin: view.admin.to_string(),
        }
    }
}

async fn fetch_program_account(
    session: &Session,
    logger: &OperationLogger,
    label: &str,
    address: &Pubkey,
) -> StakingResult<Option<Account>> {
    let account = match session.ledger.get_account(address).await {
        Ok(account) => account,
        Err(e) => {
            metrics().record_fetch(label, "error");
            return Err(e.into());
        }
    };
    logger.log_account_fetch(label, address, account.is_some());

    let Some(account) = account else {
        metrics().record_fetch(label, "absent");
        return Ok(None);
    };

    if account.owner != session.program.program_id {
        metrics().record_fetch(label, "error");
        return Err(StakingError::AccountOwner {
            address: address.to_string(),
            owner: account.owner.to_string(),
            expected: session.program.program_id.to_string(),
        });
    }

    Ok(Some(account))
}

fn decoded<T>(
    label: &str,
    address: &Pubkey,
    result: Result<T, DecodeError>,
) -> StakingResult<Option<T>> {
    match result {
        Ok(view) => {
            metrics().record_fetch(label, "found");
            Ok(Some(view))
        }
        Err(source) => {
            metrics().record_fetch(label, "error");
            Err(StakingError::AccountDecode {
                address: address.to_string(),
                source,
            })
        }
    }
}

/// Read the global pool
pub async fn get_global_state(
    session: &Session,
    logger: &OperationLogger,
) -> StakingResult<Option<GlobalPoolView>> {
    let (address, _) = global_pool_address(&session.program.program_id);
    match fetch_program_account(session, logger, "global_pool", &address).await? {
        Some(account) => decoded("global_pool", &address, GlobalPoolView::decode(&account.data)),
        None => Ok(None),
    }
}

/// Read `user`'s pool
pub async fn get_user_state(
    session: &Session,
    logger: &OperationLogger,
    user: &Pubkey,
) -> StakingResult<Option<UserPoolView>> {
    let address = user_pool_address(user, &session.program.program_id).map_err(|e| {
        StakingError::InvalidAddress {
            input: user.to_string(),
            reason: e.to_string(),
        }
    })?;
    match fetch_program_account(session, logger, "user_pool", &address).await? {
        Some(account) => decoded("user_pool", &address, UserPoolView::decode(&account.data)),
        None => Ok(None),
    }
}

/// Read the global pool, treating absence as an error
pub async fn get_global_info(
    session: &Session,
    logger: &OperationLogger,
) -> StakingResult<GlobalInfo> {
    match get_global_state(session, logger).await? {
        Some(view) => Ok(GlobalInfo::from(&view)),
        None => Err(StakingError::GlobalStateAbsent {
            address: global_pool_address(&session.program.program_id)
                .0
                .to_string(),
        }),
    }
}
