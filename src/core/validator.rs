//! Transaction validation against live network state, with optional auto-fix.
//!
//! Each rule asks the [`NetworkClient`] for what it needs (height, trial
//! execution, fee rate), judges the matching transaction field and, when
//! asked to, writes the smallest acceptable value back into the transaction.
//!
//! [`TransactionValidator::validate`] evaluates the selected rules
//! concurrently against a shared borrow of the transaction, then applies
//! fixes one after the other. Callers must not run two validations that fix
//! the same transaction at once; the `&mut` borrow enforces this.

use crate::config::{MAX_TRANSACTION_LIFESPAN, Settings, WindowBound};
use crate::core::fees;
use crate::core::transaction::Transaction;
use crate::network::client::{NetworkClient, NetworkError};
use crate::types::fixed8::Fixed8;
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// A validation rule, named after the field it checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Rule {
    ValidUntilBlock,
    Script,
    SystemFee,
    NetworkFee,
}

impl Rule {
    pub const ALL: [Rule; 4] = [Rule::ValidUntilBlock, Rule::Script, Rule::SystemFee, Rule::NetworkFee];

    pub fn name(self) -> &'static str {
        match self {
            Rule::ValidUntilBlock => "validUntilBlock",
            Rule::Script => "script",
            Rule::SystemFee => "systemFee",
            Rule::NetworkFee => "networkFee",
        }
    }

    fn bit(self) -> u8 {
        match self {
            Rule::ValidUntilBlock => RuleMask::VALID_UNTIL_BLOCK.0,
            Rule::Script => RuleMask::SCRIPT.0,
            Rule::SystemFee => RuleMask::SYSTEM_FEE.0,
            Rule::NetworkFee => RuleMask::NETWORK_FEE.0,
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Set of rules, used both to select checks and to select fixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuleMask(u8);

impl RuleMask {
    pub const NONE: RuleMask = RuleMask(0);
    pub const VALID_UNTIL_BLOCK: RuleMask = RuleMask(1);
    pub const SCRIPT: RuleMask = RuleMask(1 << 1);
    pub const SYSTEM_FEE: RuleMask = RuleMask(1 << 2);
    pub const NETWORK_FEE: RuleMask = RuleMask(1 << 3);
    pub const ALL: RuleMask = RuleMask(0b1111);

    pub fn contains(self, rule: Rule) -> bool {
        self.0 & rule.bit() != 0
    }

    /// Rules in the mask, in name order.
    pub fn rules(self) -> impl Iterator<Item = Rule> {
        Rule::ALL.into_iter().filter(move |rule| self.contains(*rule))
    }
}

impl From<Rule> for RuleMask {
    fn from(rule: Rule) -> Self {
        RuleMask(rule.bit())
    }
}

impl BitOr for RuleMask {
    type Output = RuleMask;

    fn bitor(self, rhs: Self) -> Self {
        RuleMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for RuleMask {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

/// Value of a checked field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleValue {
    Height(u32),
    Amount(Fixed8),
}

impl RuleValue {
    fn to_json(self) -> Value {
        match self {
            RuleValue::Height(h) => json!(h),
            RuleValue::Amount(a) => json!(a.to_string()),
        }
    }
}

impl fmt::Display for RuleValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleValue::Height(h) => write!(f, "{h}"),
            RuleValue::Amount(a) => write!(f, "{a}"),
        }
    }
}

/// Verdict of a single rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleOutcome {
    Valid,
    /// The field is invalid; `suggestion` is the smallest acceptable value.
    /// `fixed` tells whether it was written into the transaction.
    Fixable {
        prev: RuleValue,
        suggestion: RuleValue,
        fixed: bool,
    },
    /// The field is invalid and no value can be computed for it.
    Unfixable { message: String },
    /// The network could not answer, so the rule was not decided.
    Failed(NetworkError),
}

impl RuleOutcome {
    /// Valid as declared, or made valid by a fix.
    pub fn is_satisfied(&self) -> bool {
        matches!(self, RuleOutcome::Valid | RuleOutcome::Fixable { fixed: true, .. })
    }

    fn to_json(&self) -> Value {
        match self {
            RuleOutcome::Valid => json!({ "valid": true }),
            RuleOutcome::Fixable { prev, suggestion, fixed } => json!({
                "fixed": fixed,
                "prev": prev.to_json(),
                "suggestion": suggestion.to_json(),
            }),
            RuleOutcome::Unfixable { message } => json!({ "fixed": false, "message": message }),
            RuleOutcome::Failed(err) => json!({ "fixed": false, "error": err.to_string() }),
        }
    }
}

/// Aggregate of every checked rule.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    pub valid: bool,
    /// One entry per checked rule. Unchecked rules are absent.
    pub outcomes: BTreeMap<Rule, RuleOutcome>,
}

impl ValidationResult {
    fn from_outcomes(outcomes: BTreeMap<Rule, RuleOutcome>) -> Self {
        Self {
            valid: outcomes.values().all(RuleOutcome::is_satisfied),
            outcomes,
        }
    }

    pub fn outcome(&self, rule: Rule) -> Option<&RuleOutcome> {
        self.outcomes.get(&rule)
    }

    /// `{"valid": .., "suggestions": {rule: ..}}`.
    ///
    /// Rules that passed as declared carry no suggestion and are left out
    /// of `suggestions`.
    pub fn to_json(&self) -> Value {
        let suggestions: Map<String, Value> = self
            .outcomes
            .iter()
            .filter(|(_, outcome)| **outcome != RuleOutcome::Valid)
            .map(|(rule, outcome)| (rule.name().to_string(), outcome.to_json()))
            .collect();
        json!({ "valid": self.valid, "suggestions": suggestions })
    }
}

/// What a rule found, before any fix is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Finding {
    Valid,
    Suggest { prev: RuleValue, suggestion: RuleValue },
    Unfixable(String),
    Failed(NetworkError),
}

/// Checks and repairs transactions using a network client.
pub struct TransactionValidator<'a, C: NetworkClient> {
    client: &'a C,
    window_bound: WindowBound,
    max_lifespan: u32,
}

impl<'a, C: NetworkClient> TransactionValidator<'a, C> {
    /// Validator with the default window and lifespan.
    pub fn new(client: &'a C) -> Self {
        Self {
            client,
            window_bound: WindowBound::default(),
            max_lifespan: MAX_TRANSACTION_LIFESPAN,
        }
    }

    pub fn with_settings(client: &'a C, settings: &Settings) -> Self {
        Self {
            client,
            window_bound: settings.window_bound,
            max_lifespan: settings.max_transaction_lifespan,
        }
    }

    pub fn window_bound(mut self, bound: WindowBound) -> Self {
        self.window_bound = bound;
        self
    }

    pub async fn validate_valid_until_block(&self, tx: &mut Transaction, fix: bool) -> RuleOutcome {
        let finding = self.check_valid_until_block(tx).await;
        resolve(Rule::ValidUntilBlock, finding, fix, tx)
    }

    pub async fn validate_script(&self, tx: &mut Transaction) -> RuleOutcome {
        let finding = self.check_script(tx).await;
        resolve(Rule::Script, finding, false, tx)
    }

    pub async fn validate_system_fee(&self, tx: &mut Transaction, fix: bool) -> RuleOutcome {
        let finding = self.check_system_fee(tx).await;
        resolve(Rule::SystemFee, finding, fix, tx)
    }

    pub async fn validate_network_fee(&self, tx: &mut Transaction, fix: bool) -> RuleOutcome {
        let finding = self.check_network_fee(tx).await;
        resolve(Rule::NetworkFee, finding, fix, tx)
    }

    /// Runs the rules in `check`, fixing those also in `fix`.
    ///
    /// A network failure is recorded against its rule and the other rules
    /// are still reported. The result is valid only if every checked rule
    /// is valid or was fixed.
    pub async fn validate(&self, tx: &mut Transaction, check: RuleMask, fix: RuleMask) -> ValidationResult {
        let findings = self.check_all(tx, check).await;
        let outcomes = findings
            .into_iter()
            .map(|(rule, finding)| (rule, resolve(rule, finding, fix.contains(rule), tx)))
            .collect();
        ValidationResult::from_outcomes(outcomes)
    }

    /// Like [`validate`](Self::validate), but fails on the first network
    /// error without touching the transaction.
    pub async fn validate_strict(
        &self,
        tx: &mut Transaction,
        check: RuleMask,
        fix: RuleMask,
    ) -> Result<ValidationResult, NetworkError> {
        let findings = self.check_all(tx, check).await;
        if let Some(err) = findings.values().find_map(|finding| match finding {
            Finding::Failed(err) => Some(err.clone()),
            _ => None,
        }) {
            return Err(err);
        }
        let outcomes = findings
            .into_iter()
            .map(|(rule, finding)| (rule, resolve(rule, finding, fix.contains(rule), tx)))
            .collect();
        Ok(ValidationResult::from_outcomes(outcomes))
    }

    async fn check_all(&self, tx: &Transaction, check: RuleMask) -> BTreeMap<Rule, Finding> {
        let when = |rule: Rule| check.contains(rule);
        let (vub, script, system_fee, network_fee) = tokio::join!(
            async {
                if when(Rule::ValidUntilBlock) {
                    Some(self.check_valid_until_block(tx).await)
                } else {
                    None
                }
            },
            async {
                if when(Rule::Script) {
                    Some(self.check_script(tx).await)
                } else {
                    None
                }
            },
            async {
                if when(Rule::SystemFee) {
                    Some(self.check_system_fee(tx).await)
                } else {
                    None
                }
            },
            async {
                if when(Rule::NetworkFee) {
                    Some(self.check_network_fee(tx).await)
                } else {
                    None
                }
            },
        );
        [
            (Rule::ValidUntilBlock, vub),
            (Rule::Script, script),
            (Rule::SystemFee, system_fee),
            (Rule::NetworkFee, network_fee),
        ]
        .into_iter()
        .filter_map(|(rule, finding)| finding.map(|f| (rule, f)))
        .collect()
    }

    async fn check_valid_until_block(&self, tx: &Transaction) -> Finding {
        let height = match self.client.get_current_block_height().await {
            Ok(height) => height,
            Err(err) => return Finding::Failed(err),
        };
        if self.window_bound.contains(height, self.max_lifespan, tx.valid_until_block) {
            return Finding::Valid;
        }
        Finding::Suggest {
            prev: RuleValue::Height(tx.valid_until_block),
            suggestion: RuleValue::Height(self.window_bound.upper(height, self.max_lifespan)),
        }
    }

    async fn check_script(&self, tx: &Transaction) -> Finding {
        match self.client.invoke_script(&tx.script).await {
            Ok(result) if result.halted => Finding::Valid,
            Ok(result) => Finding::Unfixable(
                result
                    .fault_message
                    .unwrap_or_else(|| "script execution did not halt".to_string()),
            ),
            Err(err) => Finding::Failed(err),
        }
    }

    async fn check_system_fee(&self, tx: &Transaction) -> Finding {
        let gas = match self.client.invoke_script(&tx.script).await {
            Ok(result) => result.gas_consumed,
            Err(err) => return Finding::Failed(err),
        };
        let declared = tx.system_fee;
        if declared.is_whole() && declared >= gas {
            return Finding::Valid;
        }
        match gas.ceil() {
            Some(whole) => Finding::Suggest {
                prev: RuleValue::Amount(declared),
                suggestion: RuleValue::Amount(whole),
            },
            None => Finding::Unfixable(format!("gas consumed {gas} has no whole-unit ceiling")),
        }
    }

    async fn check_network_fee(&self, tx: &Transaction) -> Finding {
        let fee_per_byte = match self.client.get_fee_per_byte().await {
            Ok(rate) => rate,
            Err(err) => return Finding::Failed(err),
        };
        let required = match fees::network_fee(tx, fee_per_byte) {
            Ok(fee) => fee,
            Err(err) => return Finding::Unfixable(format!("cannot price witnesses: {err}")),
        };
        if tx.network_fee >= required {
            return Finding::Valid;
        }
        Finding::Suggest {
            prev: RuleValue::Amount(tx.network_fee),
            suggestion: RuleValue::Amount(required),
        }
    }
}

/// Turns a finding into an outcome, writing the suggestion when `fix` is set.
fn resolve(rule: Rule, finding: Finding, fix: bool, tx: &mut Transaction) -> RuleOutcome {
    match finding {
        Finding::Valid => RuleOutcome::Valid,
        Finding::Suggest { prev, suggestion } => {
            let fixed = fix && apply(rule, suggestion, tx);
            if fixed {
                crate::info!("fixed {rule}: {prev} -> {suggestion}");
            }
            RuleOutcome::Fixable { prev, suggestion, fixed }
        }
        Finding::Unfixable(message) => RuleOutcome::Unfixable { message },
        Finding::Failed(err) => {
            crate::warn!("could not check {rule}: {err}");
            RuleOutcome::Failed(err)
        }
    }
}

fn apply(rule: Rule, value: RuleValue, tx: &mut Transaction) -> bool {
    match (rule, value) {
        (Rule::ValidUntilBlock, RuleValue::Height(h)) => tx.valid_until_block = h,
        (Rule::SystemFee, RuleValue::Amount(a)) => tx.system_fee = a,
        (Rule::NetworkFee, RuleValue::Amount(a)) => tx.network_fee = a,
        _ => return false,
    }
    true
}
