//! Borrowed tabular view with filter, group-by/aggregate, sort and limit.
//!
//! A [`Frame`] never owns or mutates rows; every operation yields a new view
//! or a new summary, so the loaded tables stay read-only for the session.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

/// Reduction applied to the values of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reducer {
    /// Number of non-null values
    Count,
    /// Number of distinct non-null values
    CountDistinct,
    /// Sum of numeric values, 0 over none
    Sum,
    /// Mean of numeric values, undefined over none
    Mean,
}

/// A single cell as seen by a reducer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Value<'a> {
    Number(f64),
    Text(&'a str),
    Null,
}

impl<'a> From<Option<f64>> for Value<'a> {
    fn from(value: Option<f64>) -> Self {
        value.map_or(Value::Null, Value::Number)
    }
}

impl<'a> From<&'a str> for Value<'a> {
    fn from(value: &'a str) -> Self {
        Value::Text(value)
    }
}

#[derive(Debug, Default)]
struct Accumulator<'a> {
    count: usize,
    numeric: usize,
    sum: f64,
    distinct_text: HashSet<&'a str>,
    distinct_numbers: HashSet<u64>,
}

impl<'a> Accumulator<'a> {
    fn push(&mut self, value: Value<'a>, reducer: Reducer) {
        match value {
            Value::Null => {}
            Value::Number(n) => {
                self.count += 1;
                self.numeric += 1;
                self.sum += n;
                if reducer == Reducer::CountDistinct {
                    self.distinct_numbers.insert(n.to_bits());
                }
            }
            Value::Text(s) => {
                self.count += 1;
                if reducer == Reducer::CountDistinct {
                    self.distinct_text.insert(s);
                }
            }
        }
    }

    fn finish(&self, reducer: Reducer) -> Option<f64> {
        match reducer {
            Reducer::Count => Some(self.count as f64),
            Reducer::CountDistinct => {
                Some((self.distinct_text.len() + self.distinct_numbers.len()) as f64)
            }
            Reducer::Sum => Some(self.sum),
            Reducer::Mean if self.numeric == 0 => None,
            Reducer::Mean => Some(self.sum / self.numeric as f64),
        }
    }
}

/// One group of a grouped aggregation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow<K> {
    pub key: K,
    pub value: f64,
}

/// Result of [`Frame::group_by_aggregate`], initially in ascending key order.
#[derive(Debug, Clone, PartialEq)]
pub struct Grouped<K> {
    rows: Vec<GroupRow<K>>,
}

impl<K> Grouped<K> {
    /// Sort by value, largest first; equal values keep their current order.
    pub fn sort_desc(mut self) -> Self {
        self.rows.sort_by(|a, b| b.value.total_cmp(&a.value));
        self
    }

    /// Keep at most `n` groups.
    pub fn limit(mut self, n: usize) -> Self {
        self.rows.truncate(n);
        self
    }

    pub fn rows(&self) -> &[GroupRow<K>] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<GroupRow<K>> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of the group values.
    pub fn total(&self) -> f64 {
        self.rows.iter().map(|row| row.value).sum()
    }
}

impl<K: Ord> Grouped<K> {
    /// Restore ascending key order.
    pub fn sort_by_key(mut self) -> Self {
        self.rows.sort_by(|a, b| a.key.cmp(&b.key));
        self
    }
}

/// Read-only view over a slice of rows.
#[derive(Debug)]
pub struct Frame<'a, R> {
    rows: Vec<&'a R>,
}

impl<'a, R> Clone for Frame<'a, R> {
    fn clone(&self) -> Self {
        Self {
            rows: self.rows.clone(),
        }
    }
}

impl<'a, R> Frame<'a, R> {
    /// View every row of a table.
    pub fn new(rows: &'a [R]) -> Self {
        Self {
            rows: rows.iter().collect(),
        }
    }

    pub fn from_refs(rows: Vec<&'a R>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[&'a R] {
        &self.rows
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a R> + '_ {
        self.rows.iter().copied()
    }

    /// Rows satisfying `predicate`, in their original order.
    pub fn filter<P>(&self, predicate: P) -> Self
    where
        P: Fn(&R) -> bool,
    {
        Self {
            rows: self.rows.iter().copied().filter(|row| predicate(row)).collect(),
        }
    }

    /// Bernoulli sample keeping each row with probability `fraction`.
    ///
    /// The same input order, fraction and seed always select the same rows.
    pub fn sample(&self, fraction: f64, seed: u64) -> Self {
        if fraction >= 1.0 {
            return self.clone();
        }
        let mut rng = fastrand::Rng::with_seed(seed);
        Self {
            rows: self
                .rows
                .iter()
                .copied()
                .filter(|_| rng.f64() < fraction)
                .collect(),
        }
    }

    /// Reduce one column over the whole frame.
    ///
    /// `None` only for [`Reducer::Mean`] over no numeric values.
    pub fn aggregate<V>(&self, value: V, reducer: Reducer) -> Option<f64>
    where
        V: Fn(&'a R) -> Value<'a>,
    {
        let mut acc = Accumulator::default();
        for row in self.iter() {
            acc.push(value(row), reducer);
        }
        acc.finish(reducer)
    }

    /// Partition by `key` and reduce `value` in every partition.
    ///
    /// Groups come back in ascending key order. A `Mean` group without any
    /// numeric value has nothing to rank and is left out.
    pub fn group_by_aggregate<K, KF, VF>(&self, key: KF, value: VF, reducer: Reducer) -> Grouped<K>
    where
        K: Ord,
        KF: Fn(&'a R) -> K,
        VF: Fn(&'a R) -> Value<'a>,
    {
        let mut groups: BTreeMap<K, Accumulator<'a>> = BTreeMap::new();
        for row in self.iter() {
            groups
                .entry(key(row))
                .or_default()
                .push(value(row), reducer);
        }

        Grouped {
            rows: groups
                .into_iter()
                .filter_map(|(key, acc)| acc.finish(reducer).map(|value| GroupRow { key, value }))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Row {
        key: Option<&'static str>,
        id: &'static str,
        amount: Option<f64>,
    }

    fn rows() -> Vec<Row> {
        vec![
            Row { key: Some("b"), id: "1", amount: Some(10.0) },
            Row { key: Some("a"), id: "1", amount: Some(20.0) },
            Row { key: None, id: "2", amount: None },
            Row { key: Some("b"), id: "3", amount: Some(30.0) },
        ]
    }

    #[test]
    fn test_scalar_reducers() {
        let data = rows();
        let frame = Frame::new(&data);

        assert_eq!(frame.aggregate(|r| r.amount.into(), Reducer::Sum), Some(60.0));
        assert_eq!(frame.aggregate(|r| r.amount.into(), Reducer::Mean), Some(20.0));
        assert_eq!(frame.aggregate(|r| r.amount.into(), Reducer::Count), Some(3.0));
        assert_eq!(frame.aggregate(|r| r.id.into(), Reducer::CountDistinct), Some(3.0));
    }

    #[test]
    fn test_empty_frame_reducers() {
        let data: Vec<Row> = Vec::new();
        let frame = Frame::new(&data);

        assert_eq!(frame.aggregate(|r| r.amount.into(), Reducer::Sum), Some(0.0));
        assert_eq!(frame.aggregate(|r| r.amount.into(), Reducer::Mean), None);
        assert_eq!(frame.aggregate(|r| r.id.into(), Reducer::CountDistinct), Some(0.0));
    }

    #[test]
    fn test_group_by_keeps_null_key_group() {
        let data = rows();
        let frame = Frame::new(&data);

        let grouped = frame.group_by_aggregate(|r| r.key, |r| r.id.into(), Reducer::Count);
        let keys: Vec<_> = grouped.rows().iter().map(|g| g.key).collect();
        assert_eq!(keys, vec![None, Some("a"), Some("b")]);
        assert_eq!(grouped.total(), 4.0);
    }

    #[test]
    fn test_mean_group_without_values_is_omitted() {
        let data = rows();
        let frame = Frame::new(&data);

        let grouped = frame.group_by_aggregate(|r| r.key, |r| r.amount.into(), Reducer::Mean);
        assert_eq!(grouped.len(), 2);
        assert!(grouped.rows().iter().all(|g| g.key.is_some()));
    }

    #[test]
    fn test_sort_desc_and_limit() {
        let data = rows();
        let frame = Frame::new(&data);

        let top = frame
            .group_by_aggregate(|r| r.key, |r| r.amount.into(), Reducer::Sum)
            .sort_desc()
            .limit(2);

        assert_eq!(top.rows()[0], GroupRow { key: Some("b"), value: 40.0 });
        assert_eq!(top.rows()[1], GroupRow { key: Some("a"), value: 20.0 });
    }

    #[test]
    fn test_sort_desc_ties_keep_key_order() {
        let data = vec![
            Row { key: Some("c"), id: "1", amount: Some(5.0) },
            Row { key: Some("a"), id: "2", amount: Some(5.0) },
            Row { key: Some("b"), id: "3", amount: Some(5.0) },
        ];
        let frame = Frame::new(&data);

        let sorted = frame
            .group_by_aggregate(|r| r.key, |r| r.amount.into(), Reducer::Sum)
            .sort_desc();
        let keys: Vec<_> = sorted.rows().iter().map(|g| g.key.unwrap()).collect();
        assert_eq!(keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_sample_is_deterministic() {
        let data: Vec<Row> = (0..500)
            .map(|_| Row { key: None, id: "x", amount: Some(1.0) })
            .collect();
        let frame = Frame::new(&data);

        let first = frame.sample(0.1, 42);
        let second = frame.sample(0.1, 42);
        assert_eq!(first.len(), second.len());
        assert!(first.len() > 0 && first.len() < 500);
        assert_eq!(frame.sample(1.0, 42).len(), 500);
    }

    #[test]
    fn test_filter_does_not_touch_source() {
        let data = rows();
        let frame = Frame::new(&data);

        let filtered = frame.filter(|r| r.amount.is_some());
        assert_eq!(filtered.len(), 3);
        assert_eq!(frame.len(), 4);
    }
}
