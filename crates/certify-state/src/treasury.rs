//! # Treasury
//!
//! Components can end up holding native currency or fungible-token balances
//! (attestation callbacks may carry value, and anyone can transfer tokens to
//! a component's address). The [`Treasury`] trait is the external ledger of
//! those balances; [`sweep`] moves a holder's entire balance of one asset to
//! a recipient and is the body of every fund-recovery operation.

use std::collections::HashMap;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use certify_core::{Address, CertifyError};

/// An asset a component can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Asset {
    /// The native currency of the execution environment.
    Native,
    /// A fungible token, identified by its contract address.
    Token(Address),
}

impl std::fmt::Display for Asset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Native => f.write_str("native"),
            Self::Token(addr) => write!(f, "token:{addr}"),
        }
    }
}

/// Holder of asset balances.
pub trait Treasury: Send + Sync {
    /// Balance of `asset` held by `holder`.
    fn balance_of(&self, asset: &Asset, holder: &Address) -> u128;

    /// Move `amount` of `asset` from `from` to `to`.
    fn transfer(
        &self,
        asset: &Asset,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), CertifyError>;
}

/// Transfer the full balance of `asset` held by `holder` to `recipient`.
///
/// Returns the amount moved. Fails with `ZeroAddress` for a null recipient.
pub fn sweep(
    treasury: &dyn Treasury,
    asset: &Asset,
    holder: &Address,
    recipient: &Address,
) -> Result<u128, CertifyError> {
    if recipient.is_zero() {
        return Err(CertifyError::ZeroAddress);
    }
    let amount = treasury.balance_of(asset, holder);
    if amount > 0 {
        treasury.transfer(asset, holder, recipient, amount)?;
    }
    tracing::info!(%asset, %holder, %recipient, amount, "funds recovered");
    Ok(amount)
}

/// In-memory treasury.
#[derive(Debug, Default)]
pub struct InMemoryTreasury {
    balances: RwLock<HashMap<(Asset, Address), u128>>,
}

impl InMemoryTreasury {
    /// Create an empty treasury.
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit `amount` of `asset` to `holder` from outside the system.
    pub fn deposit(&self, asset: Asset, holder: Address, amount: u128) {
        let mut balances = self.balances.write();
        let entry = balances.entry((asset, holder)).or_insert(0);
        *entry = entry.saturating_add(amount);
    }
}

impl Treasury for InMemoryTreasury {
    fn balance_of(&self, asset: &Asset, holder: &Address) -> u128 {
        self.balances
            .read()
            .get(&(*asset, *holder))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &self,
        asset: &Asset,
        from: &Address,
        to: &Address,
        amount: u128,
    ) -> Result<(), CertifyError> {
        let mut balances = self.balances.write();
        let available = balances.get(&(*asset, *from)).copied().unwrap_or(0);
        if available < amount {
            return Err(CertifyError::Transfer(format!(
                "{from} holds {available} of {asset}, {amount} requested"
            )));
        }
        balances.insert((*asset, *from), available - amount);
        let credit = balances.entry((*asset, *to)).or_insert(0);
        *credit = credit.saturating_add(amount);
        Ok(())
    }
}
