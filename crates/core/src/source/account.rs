//! Chart of accounts entries.

use serde::{Deserialize, Serialize};

use super::Reference;
use crate::document::{AccountKind, RootType};

/// QuickBooks account classification (`AccountType`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountType {
    /// Bank accounts.
    Bank,
    /// Other current assets.
    #[serde(rename = "Other Current Asset")]
    OtherCurrentAsset,
    /// Fixed assets.
    #[serde(rename = "Fixed Asset")]
    FixedAsset,
    /// Other assets.
    #[serde(rename = "Other Asset")]
    OtherAsset,
    /// Trade receivables.
    #[serde(rename = "Accounts Receivable")]
    AccountsReceivable,
    /// Owner's equity.
    Equity,
    /// Operating expenses.
    Expense,
    /// Other expenses.
    #[serde(rename = "Other Expense")]
    OtherExpense,
    /// Cost of goods sold.
    #[serde(rename = "Cost of Goods Sold")]
    CostOfGoodsSold,
    /// Trade payables.
    #[serde(rename = "Accounts Payable")]
    AccountsPayable,
    /// Credit cards.
    #[serde(rename = "Credit Card")]
    CreditCard,
    /// Long term liabilities.
    #[serde(rename = "Long Term Liability")]
    LongTermLiability,
    /// Other current liabilities.
    #[serde(rename = "Other Current Liability")]
    OtherCurrentLiability,
    /// Operating income.
    Income,
    /// Other income.
    #[serde(rename = "Other Income")]
    OtherIncome,
}

impl AccountType {
    /// Root of the target chart this type hangs under.
    #[must_use]
    pub const fn root_type(self) -> RootType {
        match self {
            Self::Bank
            | Self::OtherCurrentAsset
            | Self::FixedAsset
            | Self::OtherAsset
            | Self::AccountsReceivable => RootType::Asset,
            Self::Equity => RootType::Equity,
            Self::Expense | Self::OtherExpense | Self::CostOfGoodsSold => RootType::Expense,
            Self::AccountsPayable
            | Self::CreditCard
            | Self::LongTermLiability
            | Self::OtherCurrentLiability => RootType::Liability,
            Self::Income | Self::OtherIncome => RootType::Income,
        }
    }
}

/// Sub type marking the account that holds received but undeposited funds.
pub const UNDEPOSITED_FUNDS_SUBTYPE: &str = "UndepositedFunds";

/// A QuickBooks account.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Account {
    /// QuickBooks id (numeric string).
    pub id: String,
    /// Display name.
    pub name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Detailed classification, e.g. `UndepositedFunds`.
    #[serde(default)]
    pub account_sub_type: Option<String>,
    /// Whether this account is nested under `parent_ref`.
    #[serde(default)]
    pub sub_account: bool,
    /// Parent account, for sub accounts.
    #[serde(default)]
    pub parent_ref: Option<Reference>,
    /// Account currency.
    #[serde(default)]
    pub currency_ref: Option<Reference>,
}

impl Account {
    /// Target account type, if the account plays a special role.
    ///
    /// The sub type wins over the main type.
    #[must_use]
    pub fn account_kind(&self) -> Option<AccountKind> {
        if self.is_undeposited_funds() {
            return Some(AccountKind::Cash);
        }
        match self.account_type {
            AccountType::AccountsPayable => Some(AccountKind::Payable),
            AccountType::AccountsReceivable => Some(AccountKind::Receivable),
            AccountType::Bank | AccountType::CreditCard => Some(AccountKind::Bank),
            _ => None,
        }
    }

    /// Whether this is the undeposited funds clearing account.
    #[must_use]
    pub fn is_undeposited_funds(&self) -> bool {
        self.account_sub_type.as_deref() == Some(UNDEPOSITED_FUNDS_SUBTYPE)
    }

    /// Parent id when this is a sub account.
    #[must_use]
    pub fn parent_id(&self) -> Option<&str> {
        if self.sub_account {
            self.parent_ref.as_ref().map(|parent| parent.value.as_str())
        } else {
            None
        }
    }

    /// Currency code, if QuickBooks reported one.
    #[must_use]
    pub fn currency(&self) -> Option<&str> {
        self.currency_ref.as_ref().map(|c| c.value.as_str())
    }
}
