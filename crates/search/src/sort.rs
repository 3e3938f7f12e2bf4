//! Generic ranking over any [`Sortable`] collection.
//!
//! Keys are extracted once per item through a [`Selector`], checked for a single comparable
//! kind, and compared with a per-kind comparator. Sorting is stable.

use crate::error::{RankError, Result};
use crate::value::{Sortable, Value, ValueKind};
use chrono::{DateTime, Utc};
use std::cmp::Ordering as CmpOrdering;
use std::fmt;

/// Direction (and case handling) of a sort.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    #[default]
    Ascending,
    Descending,
    CaseInsensitiveAscending,
    CaseInsensitiveDescending,
}

impl Ordering {
    pub const ALL: [Self; 4] = [
        Self::Ascending,
        Self::Descending,
        Self::CaseInsensitiveAscending,
        Self::CaseInsensitiveDescending,
    ];

    pub fn is_descending(self) -> bool {
        matches!(self, Self::Descending | Self::CaseInsensitiveDescending)
    }

    pub fn is_case_insensitive(self) -> bool {
        matches!(
            self,
            Self::CaseInsensitiveAscending | Self::CaseInsensitiveDescending
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "Ascending",
            Self::Descending => "Descending",
            Self::CaseInsensitiveAscending => "CaseInsensitiveAscending",
            Self::CaseInsensitiveDescending => "CaseInsensitiveDescending",
        }
    }
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One navigation step from an item towards its sort key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    /// Field by declared name
    Field(String),
    /// Field by declaration position
    Position(usize),
    /// Element of a nested sequence
    Index(usize),
}

/// Path from an item to the value it is sorted by. An empty path sorts by the item itself.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selector {
    steps: Vec<Step>,
}

impl Selector {
    pub fn value() -> Self {
        Self::default()
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self {
            steps: vec![Step::Field(name.into())],
        }
    }

    /// Nested field positions, outermost first: `[1, 2]` is the third field of the record
    /// held in the second field of each item.
    pub fn field_path(positions: impl IntoIterator<Item = usize>) -> Self {
        Self {
            steps: positions.into_iter().map(Step::Position).collect(),
        }
    }

    pub fn index(index: usize) -> Self {
        Self {
            steps: vec![Step::Index(index)],
        }
    }

    pub fn then(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Walk `value` along this path.
    pub fn resolve<'a>(&self, value: Value<'a>) -> Result<Value<'a>> {
        let mut current = value;
        for step in &self.steps {
            current = match (step, current) {
                (Step::Field(name), Value::Record(record)) => record
                    .field(name)
                    .ok_or_else(|| RankError::UnknownField(name.clone()))?,
                (Step::Position(position), Value::Record(record)) => {
                    record.field_at(*position).ok_or_else(|| {
                        RankError::InvalidSelector(format!("no field at position {position}"))
                    })?
                }
                (Step::Index(index), Value::List(items)) => {
                    let len = items.len();
                    items.into_iter().nth(*index).ok_or_else(|| {
                        RankError::InvalidSelector(format!(
                            "index {index} out of bounds for sequence of length {len}"
                        ))
                    })?
                }
                (step, other) => {
                    return Err(RankError::InvalidSelector(format!(
                        "{step:?} cannot be applied to a {} value",
                        other.kind()
                    )))
                }
            };
        }
        Ok(current)
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.steps.is_empty() {
            return f.write_str("<value>");
        }
        for (i, step) in self.steps.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            match step {
                Step::Field(name) => f.write_str(name)?,
                Step::Position(position) => write!(f, "#{position}")?,
                Step::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Owned, comparable sort key.
#[derive(Debug, Clone, PartialEq)]
enum Key {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Str(String),
    Time(DateTime<Utc>),
}

impl Key {
    fn from_value(value: Value<'_>, ordering: Ordering) -> Result<Self> {
        let kind = value.kind();
        if ordering.is_case_insensitive() && kind != ValueKind::Str {
            return Err(RankError::InvalidOrdering { ordering, kind });
        }
        Ok(match value {
            Value::Int(v) => Self::Int(v),
            Value::Uint(v) => Self::Uint(v),
            Value::Float(v) => Self::Float(v),
            Value::Bool(v) => Self::Bool(v),
            Value::Str(v) if ordering.is_case_insensitive() => Self::Str(v.to_lowercase()),
            Value::Str(v) => Self::Str(v.into_owned()),
            Value::Time(v) => Self::Time(v),
            Value::Record(_) | Value::List(_) => return Err(RankError::Unsortable(kind)),
        })
    }

    fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::Str(_) => ValueKind::Str,
            Self::Time(_) => ValueKind::Time,
        }
    }
}

/// NaN is smaller than every other float and equal to itself.
pub fn compare_floats(a: f64, b: f64) -> CmpOrdering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => CmpOrdering::Equal,
        (true, false) => CmpOrdering::Less,
        (false, true) => CmpOrdering::Greater,
        (false, false) => a.partial_cmp(&b).unwrap_or(CmpOrdering::Equal),
    }
}

fn compare_keys(a: &Key, b: &Key) -> CmpOrdering {
    match (a, b) {
        (Key::Int(a), Key::Int(b)) => a.cmp(b),
        (Key::Uint(a), Key::Uint(b)) => a.cmp(b),
        (Key::Float(a), Key::Float(b)) => compare_floats(*a, *b),
        (Key::Bool(a), Key::Bool(b)) => a.cmp(b),
        (Key::Str(a), Key::Str(b)) => a.as_bytes().cmp(b.as_bytes()),
        (Key::Time(a), Key::Time(b)) => a.cmp(b),
        // Keys are checked for a single kind before comparison.
        _ => CmpOrdering::Equal,
    }
}

/// Sorts collections by one selector in one ordering.
#[derive(Debug, Clone, Default)]
pub struct Sorter {
    selector: Selector,
    ordering: Ordering,
}

impl Sorter {
    pub fn new(selector: Selector, ordering: Ordering) -> Self {
        Self { selector, ordering }
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn ordering(&self) -> Ordering {
        self.ordering
    }

    /// Sort `items` in place.
    ///
    /// Fails without touching `items` when the selector does not apply to some item, the
    /// selected values are of different kinds, or the ordering does not fit their kind.
    pub fn sort<T: Sortable>(&self, items: &mut [T]) -> Result<()> {
        let keys = self.extract_keys(items)?;
        if keys.len() < 2 {
            return Ok(());
        }

        let descending = self.ordering.is_descending();
        let mut order: Vec<usize> = (0..keys.len()).collect();
        order.sort_by(|&a, &b| {
            let ord = compare_keys(&keys[a], &keys[b]);
            if descending {
                ord.reverse()
            } else {
                ord
            }
        });

        apply_permutation(items, order);
        Ok(())
    }

    fn extract_keys<T: Sortable>(&self, items: &[T]) -> Result<Vec<Key>> {
        let mut keys = Vec::with_capacity(items.len());
        let mut expected: Option<ValueKind> = None;

        for (position, item) in items.iter().enumerate() {
            let value = self.selector.resolve(item.sort_value())?;
            let key = Key::from_value(value, self.ordering)?;
            match expected {
                None => expected = Some(key.kind()),
                Some(kind) if kind != key.kind() => {
                    return Err(RankError::KindMismatch {
                        expected: kind,
                        found: key.kind(),
                        position,
                    })
                }
                Some(_) => {}
            }
            keys.push(key);
        }
        Ok(keys)
    }
}

/// Reorder `items` so that position `i` receives the element previously at `order[i]`.
fn apply_permutation<T>(items: &mut [T], mut order: Vec<usize>) {
    for start in 0..items.len() {
        if order[start] == start {
            continue;
        }
        let mut current = start;
        loop {
            let next = order[current];
            order[current] = current;
            if next == start {
                break;
            }
            items.swap(current, next);
            current = next;
        }
    }
}

pub fn sort<T: Sortable>(items: &mut [T], selector: Selector, ordering: Ordering) -> Result<()> {
    Sorter::new(selector, ordering).sort(items)
}

pub fn asc<T: Sortable>(items: &mut [T]) -> Result<()> {
    sort(items, Selector::value(), Ordering::Ascending)
}

pub fn desc<T: Sortable>(items: &mut [T]) -> Result<()> {
    sort(items, Selector::value(), Ordering::Descending)
}

pub fn ci_asc<T: Sortable>(items: &mut [T]) -> Result<()> {
    sort(items, Selector::value(), Ordering::CaseInsensitiveAscending)
}

pub fn ci_desc<T: Sortable>(items: &mut [T]) -> Result<()> {
    sort(items, Selector::value(), Ordering::CaseInsensitiveDescending)
}

pub fn asc_by_field<T: Sortable>(items: &mut [T], name: &str) -> Result<()> {
    sort(items, Selector::field(name), Ordering::Ascending)
}

pub fn desc_by_field<T: Sortable>(items: &mut [T], name: &str) -> Result<()> {
    sort(items, Selector::field(name), Ordering::Descending)
}

pub fn ci_asc_by_field<T: Sortable>(items: &mut [T], name: &str) -> Result<()> {
    sort(items, Selector::field(name), Ordering::CaseInsensitiveAscending)
}

pub fn ci_desc_by_field<T: Sortable>(items: &mut [T], name: &str) -> Result<()> {
    sort(items, Selector::field(name), Ordering::CaseInsensitiveDescending)
}

pub fn asc_by_index<T: Sortable>(items: &mut [T], index: usize) -> Result<()> {
    sort(items, Selector::index(index), Ordering::Ascending)
}

pub fn desc_by_index<T: Sortable>(items: &mut [T], index: usize) -> Result<()> {
    sort(items, Selector::index(index), Ordering::Descending)
}

pub fn ci_asc_by_index<T: Sortable>(items: &mut [T], index: usize) -> Result<()> {
    sort(items, Selector::index(index), Ordering::CaseInsensitiveAscending)
}

pub fn ci_desc_by_index<T: Sortable>(items: &mut [T], index: usize) -> Result<()> {
    sort(items, Selector::index(index), Ordering::CaseInsensitiveDescending)
}

pub fn asc_by_field_path<T: Sortable>(items: &mut [T], positions: &[usize]) -> Result<()> {
    sort(items, Selector::field_path(positions.iter().copied()), Ordering::Ascending)
}

pub fn desc_by_field_path<T: Sortable>(items: &mut [T], positions: &[usize]) -> Result<()> {
    sort(items, Selector::field_path(positions.iter().copied()), Ordering::Descending)
}

pub fn ci_asc_by_field_path<T: Sortable>(items: &mut [T], positions: &[usize]) -> Result<()> {
    sort(
        items,
        Selector::field_path(positions.iter().copied()),
        Ordering::CaseInsensitiveAscending,
    )
}

pub fn ci_desc_by_field_path<T: Sortable>(items: &mut [T], positions: &[usize]) -> Result<()> {
    sort(
        items,
        Selector::field_path(positions.iter().copied()),
        Ordering::CaseInsensitiveDescending,
    )
}

/// Reverse the current order in place. No key is inspected, so this never fails.
pub fn reverse<T>(items: &mut [T]) {
    items.reverse();
}

/// Keep at most `max` leading items.
pub fn top_k<T>(mut items: Vec<T>, max: usize) -> Vec<T> {
    items.truncate(max);
    items
}

/// Sort by `field` descending and keep the first `max` items.
pub fn rank_top_k<T: Sortable>(mut items: Vec<T>, field: &str, max: usize) -> Result<Vec<T>> {
    let total = items.len();
    desc_by_field(&mut items, field)?;
    let kept = top_k(items, max);
    log::debug!("Ranked {total} records by {field}, kept {}", kept.len());
    Ok(kept)
}
