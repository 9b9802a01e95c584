//! Named operations recognized by the cache layer.
//!
//! The cache routes on operation *names*: public APIs accept arbitrary
//! `&str` names so that an operation unknown to the tables degrades to
//! "never cached, invalidates nothing" rather than an error. These enums
//! enumerate the vocabulary the standard policy tables are built from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Named read operations (GraphQL queries).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QueryOp {
    GetDashboard,
    GetMe,
    GetCategories,
    GetIncomeCategories,
    GetExpenses,
    GetIncomes,
    GetInstallments,
    GetDebts,
    GetRecurringIncomes,
    GetExpenseTemplateGroups,
    GetBalance,
    GetUpcomingPayments,
    GetActualPayments,
}

impl QueryOp {
    /// All recognized read operations.
    pub const ALL: [QueryOp; 13] = [
        QueryOp::GetDashboard,
        QueryOp::GetMe,
        QueryOp::GetCategories,
        QueryOp::GetIncomeCategories,
        QueryOp::GetExpenses,
        QueryOp::GetIncomes,
        QueryOp::GetInstallments,
        QueryOp::GetDebts,
        QueryOp::GetRecurringIncomes,
        QueryOp::GetExpenseTemplateGroups,
        QueryOp::GetBalance,
        QueryOp::GetUpcomingPayments,
        QueryOp::GetActualPayments,
    ];

    /// The operation name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            QueryOp::GetDashboard => "GetDashboard",
            QueryOp::GetMe => "GetMe",
            QueryOp::GetCategories => "GetCategories",
            QueryOp::GetIncomeCategories => "GetIncomeCategories",
            QueryOp::GetExpenses => "GetExpenses",
            QueryOp::GetIncomes => "GetIncomes",
            QueryOp::GetInstallments => "GetInstallments",
            QueryOp::GetDebts => "GetDebts",
            QueryOp::GetRecurringIncomes => "GetRecurringIncomes",
            QueryOp::GetExpenseTemplateGroups => "GetExpenseTemplateGroups",
            QueryOp::GetBalance => "GetBalance",
            QueryOp::GetUpcomingPayments => "GetUpcomingPayments",
            QueryOp::GetActualPayments => "GetActualPayments",
        }
    }

    /// Parse an operation name, returning `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for QueryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Named write operations (GraphQL mutations).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MutationOp {
    CreateExpense,
    UpdateExpense,
    DeleteExpense,
    CreateIncome,
    UpdateIncome,
    DeleteIncome,
    CreateInstallment,
    UpdateInstallment,
    DeleteInstallment,
    PayInstallment,
    CreateDebt,
    UpdateDebt,
    DeleteDebt,
    CreateCategory,
    UpdateCategory,
    DeleteCategory,
    CreateIncomeCategory,
    UpdateIncomeCategory,
    DeleteIncomeCategory,
    CreateRecurringIncome,
    UpdateRecurringIncome,
    DeleteRecurringIncome,
    CreateExpenseTemplateGroup,
    UpdateExpenseTemplateGroup,
    DeleteExpenseTemplateGroup,
    UpdateProfile,
    ChangePassword,
}

impl MutationOp {
    /// All recognized write operations.
    pub const ALL: [MutationOp; 27] = [
        MutationOp::CreateExpense,
        MutationOp::UpdateExpense,
        MutationOp::DeleteExpense,
        MutationOp::CreateIncome,
        MutationOp::UpdateIncome,
        MutationOp::DeleteIncome,
        MutationOp::CreateInstallment,
        MutationOp::UpdateInstallment,
        MutationOp::DeleteInstallment,
        MutationOp::PayInstallment,
        MutationOp::CreateDebt,
        MutationOp::UpdateDebt,
        MutationOp::DeleteDebt,
        MutationOp::CreateCategory,
        MutationOp::UpdateCategory,
        MutationOp::DeleteCategory,
        MutationOp::CreateIncomeCategory,
        MutationOp::UpdateIncomeCategory,
        MutationOp::DeleteIncomeCategory,
        MutationOp::CreateRecurringIncome,
        MutationOp::UpdateRecurringIncome,
        MutationOp::DeleteRecurringIncome,
        MutationOp::CreateExpenseTemplateGroup,
        MutationOp::UpdateExpenseTemplateGroup,
        MutationOp::DeleteExpenseTemplateGroup,
        MutationOp::UpdateProfile,
        MutationOp::ChangePassword,
    ];

    /// The operation name as it appears on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationOp::CreateExpense => "CreateExpense",
            MutationOp::UpdateExpense => "UpdateExpense",
            MutationOp::DeleteExpense => "DeleteExpense",
            MutationOp::CreateIncome => "CreateIncome",
            MutationOp::UpdateIncome => "UpdateIncome",
            MutationOp::DeleteIncome => "DeleteIncome",
            MutationOp::CreateInstallment => "CreateInstallment",
            MutationOp::UpdateInstallment => "UpdateInstallment",
            MutationOp::DeleteInstallment => "DeleteInstallment",
            MutationOp::PayInstallment => "PayInstallment",
            MutationOp::CreateDebt => "CreateDebt",
            MutationOp::UpdateDebt => "UpdateDebt",
            MutationOp::DeleteDebt => "DeleteDebt",
            MutationOp::CreateCategory => "CreateCategory",
            MutationOp::UpdateCategory => "UpdateCategory",
            MutationOp::DeleteCategory => "DeleteCategory",
            MutationOp::CreateIncomeCategory => "CreateIncomeCategory",
            MutationOp::UpdateIncomeCategory => "UpdateIncomeCategory",
            MutationOp::DeleteIncomeCategory => "DeleteIncomeCategory",
            MutationOp::CreateRecurringIncome => "CreateRecurringIncome",
            MutationOp::UpdateRecurringIncome => "UpdateRecurringIncome",
            MutationOp::DeleteRecurringIncome => "DeleteRecurringIncome",
            MutationOp::CreateExpenseTemplateGroup => "CreateExpenseTemplateGroup",
            MutationOp::UpdateExpenseTemplateGroup => "UpdateExpenseTemplateGroup",
            MutationOp::DeleteExpenseTemplateGroup => "DeleteExpenseTemplateGroup",
            MutationOp::UpdateProfile => "UpdateProfile",
            MutationOp::ChangePassword => "ChangePassword",
        }
    }

    /// Parse an operation name, returning `None` for unrecognized names.
    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|op| op.as_str() == name)
    }
}

impl fmt::Display for MutationOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
