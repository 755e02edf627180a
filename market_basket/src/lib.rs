//! # Market Basket
//!
//! Finds tour services that are bought together. Sales are grouped into
//! baskets of services, frequent itemsets are mined with Apriori, and
//! association rules are ranked by lift.
//!
//! ```rust
//! use market_basket::{mine_rules, AprioriConfig, Transactions};
//!
//! let transactions = Transactions::from_pairs(vec![
//!     (1, "guide".to_string()),
//!     (1, "transfer".to_string()),
//!     (2, "guide".to_string()),
//!     (2, "transfer".to_string()),
//!     (3, "meal".to_string()),
//! ]);
//! let rules = mine_rules(&transactions, &AprioriConfig::default())?;
//! assert!(rules.iter().all(|r| r.lift >= 1.0));
//! # Ok::<(), market_basket::BasketError>(())
//! ```

pub mod apriori;
pub mod config;
pub mod data;
pub mod error;
pub mod rules;

pub use crate::apriori::{apriori, FrequentItemset};
pub use crate::config::AprioriConfig;
pub use crate::data::Transactions;
pub use crate::error::{BasketError, Result};
pub use crate::rules::{association_rules, AssociationRule};

use tracing::info;

/// Mine frequent itemsets and derive the top association rules.
///
/// Fewer than `config.min_transactions` baskets yield no rules.
pub fn mine_rules(transactions: &Transactions, config: &AprioriConfig) -> Result<Vec<AssociationRule>> {
    config.validate()?;
    if transactions.len() < config.min_transactions {
        info!(baskets = transactions.len(), "too few baskets to mine");
        return Ok(Vec::new());
    }

    let itemsets = apriori(transactions, config.min_support);
    let rules = association_rules(&itemsets, config);
    info!(
        baskets = transactions.len(),
        itemsets = itemsets.len(),
        rules = rules.len(),
        "mined association rules"
    );
    Ok(rules)
}
