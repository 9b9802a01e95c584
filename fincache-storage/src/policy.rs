//! Cache policy: per-operation TTLs and the mutation invalidation graph.
//!
//! The policy is an explicitly constructed, immutable configuration object
//! injected into [`OperationCache`](crate::read_through::OperationCache) at
//! construction time. [`CachePolicy::standard`] carries the fixed tables for
//! the finance application's operation vocabulary; tests and per-environment
//! overrides build reduced tables with the `with_*` methods.

use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

use fincache_core::{MutationOp, QueryOp};
use once_cell::sync::Lazy;

static EMPTY_TARGETS: Lazy<BTreeSet<String>> = Lazy::new(BTreeSet::new);

/// Immutable TTL and invalidation tables.
///
/// # Lookup Semantics
///
/// - `ttl_for` returns `None` for operations absent from the TTL table:
///   caching is opt-in per operation, and "absent" is distinct from
///   "cache for zero seconds".
/// - `invalidation_targets` returns an empty set (not absent) for writes
///   that invalidate nothing. That is the safe default for any write not
///   explicitly enumerated.
#[derive(Debug, Clone, Default)]
pub struct CachePolicy {
    ttl: HashMap<String, Duration>,
    invalidation: HashMap<String, BTreeSet<String>>,
}

impl CachePolicy {
    /// Create an empty policy: nothing cached, nothing invalidated.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The standard tables for the finance application.
    ///
    /// TTLs: reference data (categories, template groups) 10 minutes, the
    /// profile 5 minutes, record lists and dashboard aggregates 2 minutes.
    /// Invalidation: each mutation lists the dashboard/balance/list queries
    /// it can make stale; invalidating more than strictly necessary is a
    /// performance cost, missing a dependency is a staleness bug.
    pub fn standard() -> Self {
        let ttl = |secs: u64| Duration::from_secs(secs);
        let mut policy = Self::empty()
            .with_ttl(QueryOp::GetDashboard, ttl(120))
            .with_ttl(QueryOp::GetMe, ttl(300))
            .with_ttl(QueryOp::GetCategories, ttl(600))
            .with_ttl(QueryOp::GetIncomeCategories, ttl(600))
            .with_ttl(QueryOp::GetExpenses, ttl(120))
            .with_ttl(QueryOp::GetIncomes, ttl(120))
            .with_ttl(QueryOp::GetInstallments, ttl(120))
            .with_ttl(QueryOp::GetDebts, ttl(120))
            .with_ttl(QueryOp::GetRecurringIncomes, ttl(120))
            .with_ttl(QueryOp::GetExpenseTemplateGroups, ttl(600))
            .with_ttl(QueryOp::GetBalance, ttl(120))
            .with_ttl(QueryOp::GetUpcomingPayments, ttl(120))
            .with_ttl(QueryOp::GetActualPayments, ttl(120));

        use MutationOp::*;
        use QueryOp::*;

        let expense = [GetExpenses, GetDashboard, GetBalance, GetCategories];
        for op in [CreateExpense, UpdateExpense, DeleteExpense] {
            policy = policy.with_dependents(op, expense);
        }

        let income = [GetIncomes, GetDashboard, GetBalance, GetIncomeCategories];
        for op in [CreateIncome, UpdateIncome, DeleteIncome] {
            policy = policy.with_dependents(op, income);
        }

        let installment = [
            GetInstallments,
            GetDashboard,
            GetBalance,
            GetUpcomingPayments,
            GetActualPayments,
        ];
        for op in [
            CreateInstallment,
            UpdateInstallment,
            DeleteInstallment,
            PayInstallment,
        ] {
            policy = policy.with_dependents(op, installment);
        }

        let debt = [
            GetDebts,
            GetDashboard,
            GetBalance,
            GetUpcomingPayments,
            GetActualPayments,
        ];
        for op in [CreateDebt, UpdateDebt, DeleteDebt] {
            policy = policy.with_dependents(op, debt);
        }

        let category = [GetCategories, GetExpenses, GetDashboard];
        for op in [CreateCategory, UpdateCategory, DeleteCategory] {
            policy = policy.with_dependents(op, category);
        }

        let income_category = [GetIncomeCategories, GetIncomes, GetDashboard];
        for op in [
            CreateIncomeCategory,
            UpdateIncomeCategory,
            DeleteIncomeCategory,
        ] {
            policy = policy.with_dependents(op, income_category);
        }

        let recurring = [GetRecurringIncomes, GetIncomes, GetDashboard, GetBalance];
        for op in [
            CreateRecurringIncome,
            UpdateRecurringIncome,
            DeleteRecurringIncome,
        ] {
            policy = policy.with_dependents(op, recurring);
        }

        let templates = [GetExpenseTemplateGroups];
        for op in [
            CreateExpenseTemplateGroup,
            UpdateExpenseTemplateGroup,
            DeleteExpenseTemplateGroup,
        ] {
            policy = policy.with_dependents(op, templates);
        }

        policy = policy.with_dependents(UpdateProfile, [GetMe, GetDashboard]);
        // ChangePassword touches no cached query; it stays out of the table.

        policy
    }

    /// Add (or replace) a TTL entry for a read operation.
    pub fn with_ttl(mut self, operation: QueryOp, ttl: Duration) -> Self {
        self.ttl.insert(operation.as_str().to_string(), ttl);
        self
    }

    /// Add (or replace) the invalidation targets of a write operation.
    pub fn with_dependents<I>(mut self, operation: MutationOp, targets: I) -> Self
    where
        I: IntoIterator<Item = QueryOp>,
    {
        let set: BTreeSet<String> = targets
            .into_iter()
            .map(|op| op.as_str().to_string())
            .collect();
        self.invalidation.insert(operation.as_str().to_string(), set);
        self
    }

    /// TTL for a read operation, or `None` when the operation is never cached.
    pub fn ttl_for(&self, operation: &str) -> Option<Duration> {
        self.ttl.get(operation).copied()
    }

    /// Read operations invalidated by a write operation.
    ///
    /// Returns the empty set for writes absent from the table.
    pub fn invalidation_targets(&self, operation: &str) -> &BTreeSet<String> {
        self.invalidation.get(operation).unwrap_or(&EMPTY_TARGETS)
    }

    /// Number of read operations with a configured TTL.
    pub fn cached_operation_count(&self) -> usize {
        self.ttl.len()
    }
}
