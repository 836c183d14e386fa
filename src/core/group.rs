//! Grouping of a [`Frame`] by one or more key columns.
//!
//! Groups keep the order in which their keys first appear, and rows keep
//! their original relative order inside each group. Every group remembers
//! the source row indices so callers can trace results back to the input.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::core::frame::{Column, Frame};
use crate::error::{AnomalyError, Result};

/// One grouping-key component. Float columns cannot act as keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum KeyValue {
    Int(i64),
    Str(String),
    Timestamp(DateTime<Utc>),
}

impl KeyValue {
    /// Build a column that repeats this key value `len` times, preserving
    /// the source column's type.
    pub(crate) fn broadcast(&self, len: usize) -> Column {
        match self {
            KeyValue::Int(v) => Column::Int(vec![*v; len]),
            KeyValue::Str(v) => Column::Str(vec![v.clone(); len]),
            KeyValue::Timestamp(v) => Column::Timestamp(vec![*v; len]),
        }
    }
}

impl std::fmt::Display for KeyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KeyValue::Int(v) => write!(f, "{v}"),
            KeyValue::Str(v) => write!(f, "{v}"),
            KeyValue::Timestamp(v) => write!(f, "{}", v.to_rfc3339()),
        }
    }
}

/// One group: its key, the sub-frame of its rows, and their source indices.
#[derive(Debug, Clone)]
pub struct Group {
    key: Vec<KeyValue>,
    rows: Vec<usize>,
    frame: Frame,
}

impl Group {
    /// The group's key values, one per key column.
    pub fn key(&self) -> &[KeyValue] {
        &self.key
    }

    /// Render the key for progress and error messages, e.g. `store_2/dept_1`.
    pub fn label(&self) -> String {
        self.key
            .iter()
            .map(KeyValue::to_string)
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Source row indices of this group, in original order.
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// The group's rows as a sub-frame (all columns of the source frame).
    pub fn frame(&self) -> &Frame {
        &self.frame
    }

    /// Number of rows in the group.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the group has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// A frame partitioned by one or more key columns, in encounter order.
///
/// Keeps the source frame so results computed per group can be joined back
/// onto the caller's original rows.
#[derive(Debug, Clone)]
pub struct GroupedFrame {
    key_columns: Vec<String>,
    groups: Vec<Group>,
    source: Frame,
}

impl GroupedFrame {
    /// Names of the key columns.
    pub fn key_columns(&self) -> &[String] {
        &self.key_columns
    }

    /// The frame the grouping was built from.
    pub fn source(&self) -> &Frame {
        &self.source
    }

    /// The groups, in the order their keys first appear in the source frame.
    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Number of groups.
    pub fn n_groups(&self) -> usize {
        self.groups.len()
    }

    /// Total rows across all groups.
    pub fn total_rows(&self) -> usize {
        self.groups.iter().map(Group::len).sum()
    }
}

impl Frame {
    /// Partition the frame by the given key columns.
    ///
    /// Fails with a validation error if a key column is missing or is a
    /// float column (float equality is not a sound grouping key).
    pub fn group_by(&self, key_columns: &[&str]) -> Result<GroupedFrame> {
        if key_columns.is_empty() {
            return Err(AnomalyError::Validation(
                "group_by requires at least one key column".to_string(),
            ));
        }

        let mut keys: Vec<&Column> = Vec::with_capacity(key_columns.len());
        for &name in key_columns {
            let column = self.column(name)?;
            if matches!(column, Column::Float(_)) {
                return Err(AnomalyError::Validation(format!(
                    "cannot group on float column: {name}"
                )));
            }
            keys.push(column);
        }

        let mut order: Vec<Vec<KeyValue>> = Vec::new();
        let mut rows_by_key: HashMap<Vec<KeyValue>, Vec<usize>> = HashMap::new();

        for row in 0..self.n_rows() {
            let key: Vec<KeyValue> = keys
                .iter()
                .map(|column| match column {
                    Column::Int(v) => KeyValue::Int(v[row]),
                    Column::Str(v) => KeyValue::Str(v[row].clone()),
                    Column::Timestamp(v) => KeyValue::Timestamp(v[row]),
                    Column::Float(_) => unreachable!("float keys rejected above"),
                })
                .collect();

            match rows_by_key.get_mut(&key) {
                Some(rows) => rows.push(row),
                None => {
                    order.push(key.clone());
                    rows_by_key.insert(key, vec![row]);
                }
            }
        }

        let mut groups = Vec::with_capacity(order.len());
        for key in order {
            let rows = rows_by_key
                .remove(&key)
                .unwrap_or_default();
            let frame = self.take(&rows)?;
            groups.push(Group { key, rows, frame });
        }

        Ok(GroupedFrame {
            key_columns: key_columns.iter().map(|s| s.to_string()).collect(),
            groups,
            source: self.clone(),
        })
    }
}
