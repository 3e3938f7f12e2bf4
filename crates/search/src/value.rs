//! Dynamic view of record fields used by the ranker.
//!
//! A type opts into ranking by implementing [`Sortable`]. Scalars expose themselves directly;
//! structured types implement [`Record`] so that selectors can reach their fields by name or
//! by position.

use chrono::{DateTime, Utc};
use std::borrow::Cow;
use std::fmt;

/// Closed set of value kinds the ranker knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Int,
    Uint,
    Float,
    Bool,
    Str,
    Time,
    Record,
    List,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Int => "integer",
            Self::Uint => "unsigned integer",
            Self::Float => "float",
            Self::Bool => "boolean",
            Self::Str => "string",
            Self::Time => "date/time",
            Self::Record => "record",
            Self::List => "list",
        };
        f.write_str(name)
    }
}

/// A borrowed view of one value inside a ranked item.
pub enum Value<'a> {
    Int(i64),
    Uint(u64),
    Float(f64),
    Bool(bool),
    Str(Cow<'a, str>),
    Time(DateTime<Utc>),
    Record(&'a dyn Record),
    List(Vec<Value<'a>>),
}

impl Value<'_> {
    pub fn kind(&self) -> ValueKind {
        match self {
            Self::Int(_) => ValueKind::Int,
            Self::Uint(_) => ValueKind::Uint,
            Self::Float(_) => ValueKind::Float,
            Self::Bool(_) => ValueKind::Bool,
            Self::Str(_) => ValueKind::Str,
            Self::Time(_) => ValueKind::Time,
            Self::Record(_) => ValueKind::Record,
            Self::List(_) => ValueKind::List,
        }
    }
}

impl fmt::Debug for Value<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "Int({v})"),
            Self::Uint(v) => write!(f, "Uint({v})"),
            Self::Float(v) => write!(f, "Float({v})"),
            Self::Bool(v) => write!(f, "Bool({v})"),
            Self::Str(v) => write!(f, "Str({v:?})"),
            Self::Time(v) => write!(f, "Time({v})"),
            Self::Record(_) => f.write_str("Record(..)"),
            Self::List(items) => f.debug_tuple("List").field(items).finish(),
        }
    }
}

/// Field access for structured items.
pub trait Record {
    /// Value of the field declared as `name`, if any.
    fn field(&self, name: &str) -> Option<Value<'_>>;

    /// Value of the field at declaration position `index`, if any.
    fn field_at(&self, index: usize) -> Option<Value<'_>>;
}

/// Anything the ranker can sort.
pub trait Sortable {
    fn sort_value(&self) -> Value<'_>;
}

macro_rules! sortable_as {
    ($variant:ident, $target:ty, $($ty:ty),+) => {
        $(
            impl Sortable for $ty {
                fn sort_value(&self) -> Value<'_> {
                    Value::$variant(<$target>::from(*self))
                }
            }
        )+
    };
}

sortable_as!(Int, i64, i8, i16, i32, i64);
sortable_as!(Uint, u64, u8, u16, u32, u64);
sortable_as!(Float, f64, f32, f64);
sortable_as!(Bool, bool, bool);

impl Sortable for usize {
    fn sort_value(&self) -> Value<'_> {
        Value::Uint(*self as u64)
    }
}

impl Sortable for isize {
    fn sort_value(&self) -> Value<'_> {
        Value::Int(*self as i64)
    }
}

impl Sortable for str {
    fn sort_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self))
    }
}

impl Sortable for String {
    fn sort_value(&self) -> Value<'_> {
        Value::Str(Cow::Borrowed(self.as_str()))
    }
}

impl Sortable for DateTime<Utc> {
    fn sort_value(&self) -> Value<'_> {
        Value::Time(*self)
    }
}

impl<T: Sortable> Sortable for Vec<T> {
    fn sort_value(&self) -> Value<'_> {
        Value::List(self.iter().map(Sortable::sort_value).collect())
    }
}

impl<T: Sortable> Sortable for [T] {
    fn sort_value(&self) -> Value<'_> {
        Value::List(self.iter().map(Sortable::sort_value).collect())
    }
}

impl<T: Sortable + ?Sized> Sortable for &T {
    fn sort_value(&self) -> Value<'_> {
        (**self).sort_value()
    }
}

impl<T: Sortable + ?Sized> Sortable for Box<T> {
    fn sort_value(&self) -> Value<'_> {
        (**self).sort_value()
    }
}
