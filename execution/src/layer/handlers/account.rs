use super::*;
use tessera_types::constants::{ACCOUNT_NAMESPACE, INITIAL_ACCOUNT_BALANCE, SYSTEM_ACCOUNT};
use tessera_types::execution::{CreateAccount, TransferBalance, UpdateOwner};
use tessera_types::{Account, Asset};

impl<'a, S: State> Layer<'a, S> {
    // === Account Handlers ===

    fn get_account(&self, name: &str) -> Result<Account, ActionError> {
        match self.get(&Key::Account(name.to_string()))? {
            Some(Value::Account(account)) => Ok(account),
            _ => Err(ActionError::not_found("account", name)),
        }
    }

    fn put_account(&mut self, account: Account) {
        self.insert(Key::Account(account.name.clone()), Value::Account(account));
    }

    pub(in crate::layer) fn handle_create_account(
        &mut self,
        context: &impl Context,
        act: &CreateAccount,
    ) -> Result<Event, ActionError> {
        require_authorized(context, ACCOUNT_NAMESPACE, &act.name)?;
        if act.name.is_empty() {
            return Err(ActionError::EmptyField {
                field: "account name",
            });
        }
        check_name("account name", &act.name)?;
        check_limit("account owner", act.owner.len(), MAX_OWNER_KEYS)?;
        if self.exists(&Key::Account(act.name.clone()))? {
            return Err(ActionError::already_exists("account", &act.name));
        }

        self.put_account(Account {
            name: act.name.clone(),
            creator: SYSTEM_ACCOUNT.to_string(),
            balance: Asset::new(INITIAL_ACCOUNT_BALANCE),
            frozen_balance: Asset::ZERO,
            owner: act.owner.clone(),
        });

        Ok(Event::AccountCreated {
            name: act.name.clone(),
        })
    }

    pub(in crate::layer) fn handle_update_owner(
        &mut self,
        context: &impl Context,
        act: &UpdateOwner,
    ) -> Result<Event, ActionError> {
        require_authorized(context, ACCOUNT_NAMESPACE, &act.name)?;
        let mut account = self.get_account(&act.name)?;
        check_owner("account owner", &act.owner)?;

        account.owner = act.owner.clone();
        self.put_account(account);

        Ok(Event::OwnerUpdated {
            name: act.name.clone(),
        })
    }

    /// Moves `amount` between two accounts.
    ///
    /// Both new balances are computed with checked arithmetic before either is staged, so an
    /// overflow on the receiving side leaves the sender untouched.
    pub(in crate::layer) fn handle_transfer_balance(
        &mut self,
        context: &impl Context,
        act: &TransferBalance,
    ) -> Result<Event, ActionError> {
        require_authorized(context, ACCOUNT_NAMESPACE, &act.from)?;
        let mut from = self.get_account(&act.from)?;
        let mut to = self.get_account(&act.to)?;
        if act.amount.is_zero() {
            return Err(ActionError::InvalidAmount);
        }
        // Reading both sides before writing either would otherwise credit a self-transfer.
        if act.from == act.to {
            return Err(ActionError::SelfTransfer {
                name: act.from.clone(),
            });
        }

        let Some(debited) = from.balance.checked_sub(act.amount) else {
            return Err(ActionError::InsufficientBalance {
                name: act.from.clone(),
                balance: from.balance,
                required: act.amount,
            });
        };
        let Some(credited) = to.balance.checked_add(act.amount) else {
            return Err(ActionError::Overflow {
                name: act.to.clone(),
            });
        };
        from.balance = debited;
        to.balance = credited;

        self.put_account(from);
        self.put_account(to);

        Ok(Event::BalanceTransferred {
            from: act.from.clone(),
            to: act.to.clone(),
            amount: act.amount,
        })
    }
}
