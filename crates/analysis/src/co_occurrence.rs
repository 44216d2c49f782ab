//! Product co-occurrence within multi-line orders.
//!
//! Order lines sharing an OrderID form an order group. Every unordered pair
//! of product positions in a group is counted once. Identical products on two
//! lines of the same order produce a self-pair `(A, A)` unless filtered.

use sales_core::AugmentedOrderLine;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use tracing::debug;

/// Products of one multi-line order, in row order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderGroup {
    /// Shared order identifier.
    pub order_id: String,
    /// Products in the order they appear in the table.
    pub products: Vec<String>,
}

impl OrderGroup {
    /// Comma-joined product list for display.
    pub fn joined(&self) -> String {
        self.products.join(",")
    }
}

/// Group the lines of every order that has more than one line.
///
/// Groups come out in order of first appearance of their OrderID.
pub fn multi_line_orders(table: &[AugmentedOrderLine]) -> Vec<OrderGroup> {
    let mut line_counts: HashMap<&str, usize> = HashMap::new();
    for row in table {
        *line_counts.entry(row.line.order_id.as_str()).or_insert(0) += 1;
    }

    let mut position: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<OrderGroup> = Vec::new();
    for row in table {
        let order_id = row.line.order_id.as_str();
        if line_counts[order_id] < 2 {
            continue;
        }
        let index = *position.entry(order_id).or_insert_with(|| {
            groups.push(OrderGroup {
                order_id: order_id.to_string(),
                products: Vec::new(),
            });
            groups.len() - 1
        });
        groups[index].products.push(row.line.product.clone());
    }

    groups
}

/// An unordered pair of product names.
///
/// Stored with the lexically smaller name first so `(A, B) == (B, A)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct ProductPair {
    pub first: String,
    pub second: String,
}

impl ProductPair {
    /// Create a pair; argument order does not matter.
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        let (a, b) = (a.into(), b.into());
        if a <= b {
            Self { first: a, second: b }
        } else {
            Self { first: b, second: a }
        }
    }

    /// True if both products are the same.
    pub fn is_self_pair(&self) -> bool {
        self.first == self.second
    }
}

impl fmt::Display for ProductPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.first, self.second)
    }
}

/// Accumulates pair counts; frozen into [`PairCounts`] by [`PairCounter::finish`].
#[derive(Debug, Default)]
pub struct PairCounter {
    keep_self_pairs: bool,
    index: HashMap<ProductPair, usize>,
    counts: Vec<(ProductPair, u64)>,
}

impl PairCounter {
    /// Create a new counter.
    pub fn new(keep_self_pairs: bool) -> Self {
        Self {
            keep_self_pairs,
            ..Default::default()
        }
    }

    /// Increment the count of one pair.
    pub fn add_pair(&mut self, pair: ProductPair) {
        if pair.is_self_pair() && !self.keep_self_pairs {
            return;
        }
        match self.index.get(&pair) {
            Some(&i) => self.counts[i].1 += 1,
            None => {
                self.index.insert(pair.clone(), self.counts.len());
                self.counts.push((pair, 1));
            }
        }
    }

    /// Count every 2-combination of positions in a product list.
    pub fn add_products(&mut self, products: &[String]) {
        for (i, a) in products.iter().enumerate() {
            for b in &products[i + 1..] {
                self.add_pair(ProductPair::new(a.as_str(), b.as_str()));
            }
        }
    }

    /// Freeze the counts.
    pub fn finish(self) -> PairCounts {
        PairCounts {
            index: self.index,
            counts: self.counts,
        }
    }
}

/// Immutable pair count table.
///
/// Iteration order is the order in which pairs were first encountered.
#[derive(Debug, Clone, Default)]
pub struct PairCounts {
    index: HashMap<ProductPair, usize>,
    counts: Vec<(ProductPair, u64)>,
}

impl PairCounts {
    /// Count for a pair, in either order.
    pub fn get(&self, a: &str, b: &str) -> u64 {
        self.index
            .get(&ProductPair::new(a, b))
            .map_or(0, |&i| self.counts[i].1)
    }

    /// Pairs in first-encountered order.
    pub fn iter(&self) -> impl Iterator<Item = (&ProductPair, u64)> {
        self.counts.iter().map(|(p, c)| (p, *c))
    }

    /// The `n` most common pairs, by count descending; ties keep
    /// first-encountered order.
    pub fn most_common(&self, n: usize) -> Vec<(ProductPair, u64)> {
        let mut sorted = self.counts.clone();
        sorted.sort_by(|a, b| b.1.cmp(&a.1));
        sorted.truncate(n);
        sorted
    }

    /// Number of distinct pairs.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    /// True if no pair was counted.
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Sum of all pair counts.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|(_, c)| c).sum()
    }
}

/// Result of co-occurrence counting.
#[derive(Debug, Clone, Default)]
pub struct CoOccurrence {
    /// Multi-line orders, in first-seen order.
    pub groups: Vec<OrderGroup>,
    /// Pair counts across all groups.
    pub pairs: PairCounts,
}

impl CoOccurrence {
    /// Group multi-line orders and count their product pairs.
    pub fn compute(table: &[AugmentedOrderLine], keep_self_pairs: bool) -> Self {
        let groups = multi_line_orders(table);
        let mut counter = PairCounter::new(keep_self_pairs);
        for group in &groups {
            counter.add_products(&group.products);
        }
        let pairs = counter.finish();
        debug!(groups = groups.len(), pairs = pairs.len(), "counted product pairs");
        Self { groups, pairs }
    }
}
