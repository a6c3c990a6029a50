use std::fmt;
use std::sync::Arc;

use mkt_ledger::{ContractBinding, RemoteLedger, Wallet};
use mkt_types::Address;
use tracing::{info, warn};

use crate::config::MarketConfig;
use crate::error::{MarketError, MarketResult};

/// A signer identity bound to the marketplace contract.
#[derive(Clone)]
pub struct Session {
    signer: Address,
    binding: ContractBinding,
    ledger: Arc<dyn RemoteLedger>,
}

impl Session {
    pub fn signer(&self) -> Address {
        self.signer
    }

    pub fn binding(&self) -> &ContractBinding {
        &self.binding
    }

    pub fn ledger(&self) -> &dyn RemoteLedger {
        self.ledger.as_ref()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("signer", &self.signer)
            .field("contract", &self.binding.address)
            .finish()
    }
}

/// Establish a session from the host's signing capability.
///
/// Without a wallet no remote call is made. Otherwise the wallet is asked
/// for its active account (which may prompt the user) and a ledger handle is
/// bound to the configured contract, signed by that account.
pub async fn bind(config: &MarketConfig, wallet: Option<&dyn Wallet>) -> MarketResult<Session> {
    let Some(wallet) = wallet else {
        warn!("no signing capability in host environment");
        return Err(MarketError::NoSigningCapability);
    };

    let signer = wallet.request_account().await.map_err(|e| {
        warn!(error = %e, "account request refused");
        MarketError::from(e)
    })?;

    let binding = config.binding();
    let ledger = wallet
        .connect(&binding, signer)
        .map_err(MarketError::read)?;

    info!(%signer, contract = %binding.address, "session bound");
    Ok(Session {
        signer,
        binding,
        ledger,
    })
}
