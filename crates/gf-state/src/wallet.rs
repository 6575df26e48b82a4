//! Currency wallet

/// Wallet errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalletError {
    #[error("Insufficient funds: need {needed}, have {available}")]
    Insufficient { needed: u64, available: u64 },
}

/// Spendable currency balance
pub trait Wallet: Send {
    fn balance(&self) -> u64;

    fn deposit(&mut self, amount: u64);

    /// Deduct `amount` or leave the balance untouched and fail
    fn try_spend(&mut self, amount: u64) -> Result<(), WalletError>;

    fn can_afford(&self, amount: u64) -> bool {
        self.balance() >= amount
    }
}

/// In-memory wallet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryWallet {
    balance: u64,
}

impl MemoryWallet {
    pub fn new(balance: u64) -> Self {
        Self { balance }
    }
}

impl Wallet for MemoryWallet {
    fn balance(&self) -> u64 {
        self.balance
    }

    fn deposit(&mut self, amount: u64) {
        self.balance = self.balance.saturating_add(amount);
    }

    fn try_spend(&mut self, amount: u64) -> Result<(), WalletError> {
        if amount > self.balance {
            return Err(WalletError::Insufficient {
                needed: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spend_and_deposit() {
        let mut wallet = MemoryWallet::new(500);
        wallet.try_spend(160).unwrap();
        assert_eq!(wallet.balance(), 340);

        wallet.deposit(60);
        assert_eq!(wallet.balance(), 400);
        assert!(wallet.can_afford(400));
        assert!(!wallet.can_afford(401));
    }

    #[test]
    fn test_overspend_leaves_balance() {
        let mut wallet = MemoryWallet::new(100);
        let err = wallet.try_spend(160).unwrap_err();
        assert_eq!(
            err,
            WalletError::Insufficient {
                needed: 160,
                available: 100
            }
        );
        assert_eq!(wallet.balance(), 100);
    }

    #[test]
    fn test_deposit_saturates() {
        let mut wallet = MemoryWallet::new(u64::MAX - 1);
        wallet.deposit(10);
        assert_eq!(wallet.balance(), u64::MAX);
    }
}
