//! Dynamic value model of the scripting runtime.
//!
//! A [`Value`] is one of nil, boolean, integer, float, string, or table. The
//! [`Table`] is the runtime's only container: an ordered association from
//! [`Key`] to [`Value`] with no tag telling arrays and objects apart. That
//! decision is made structurally by the encoder (see [`crate::encoder::classify`]).
//!
//! Tables are plain owned trees. Objects are kept as `Vec<(Key, Value)>` in
//! insertion order rather than a hash map, so iteration order is stable and
//! float keys need no `Hash` impl.

use std::fmt;

/// Deepest table nesting that the encoder, the decoder and the literal
/// parser all accept. A top-level table is depth 1.
pub const MAX_DEPTH: usize = 100;

/// A runtime value.
///
/// Integers and floats are separate variants so that the integer/floating
/// distinction survives a JSON round trip.
#[derive(Debug, Clone, Default)]
pub enum Value {
    #[default]
    Nil,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    Table(Table),
}

impl Value {
    /// Type name as the host reports it in argument errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Nil => "nil",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) | Value::Float(_) => "number",
            Value::String(_) => "string",
            Value::Table(_) => "table",
        }
    }

    /// Host truthiness: only `nil` and `false` are false.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Nil | Value::Boolean(false))
    }

    pub fn is_nil(&self) -> bool {
        matches!(self, Value::Nil)
    }

    /// Whether tables nest more than `limit` levels deep. Scalars have depth
    /// 0. The walk stops one level past `limit`.
    pub fn nesting_exceeds(&self, limit: usize) -> bool {
        match self {
            Value::Table(t) => limit == 0 || t.values().any(|v| v.nesting_exceeds(limit - 1)),
            _ => false,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Numeric value as `f64`, for either number variant.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(i) => Some(*i as f64),
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_table_mut(&mut self) -> Option<&mut Table> {
        match self {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Boolean(a), Value::Boolean(b)) => a == b,
            (Value::Integer(a), Value::Integer(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Table(a), Value::Table(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::literal::render(self))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Integer(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Integer(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Table> for Value {
    fn from(t: Table) -> Self {
        Value::Table(t)
    }
}

/// A sequence becomes a table keyed `1..N`.
impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Table(Table::from_sequence(items))
    }
}

/// A table key.
///
/// Float keys holding an exact integral value are normalized to
/// [`Key::Integer`] on insertion, so `t[2.0]` and `t[2]` are the same slot.
#[derive(Debug, Clone, PartialEq)]
pub enum Key {
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

impl Key {
    /// Collapse integral floats onto the integer key space.
    pub fn normalized(self) -> Key {
        match self {
            Key::Float(f) => match float_to_integer(f) {
                Some(i) => Key::Integer(i),
                None => Key::Float(f),
            },
            key => key,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Key::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Key::String(s) => Some(s),
            _ => None,
        }
    }

    /// The host's canonical string conversion, used when a non-string key
    /// has to become a JSON object member name.
    pub fn to_host_string(&self) -> String {
        match self {
            Key::Integer(i) => i.to_string(),
            Key::Float(f) => host_number_string(*f),
            Key::Boolean(b) => b.to_string(),
            Key::String(s) => s.clone(),
        }
    }

    /// A `NaN` key can never be looked up again, so tables refuse it.
    pub fn is_nan(&self) -> bool {
        matches!(self, Key::Float(f) if f.is_nan())
    }

    /// The value this key holds when read back as a value.
    pub fn to_value(&self) -> Value {
        match self {
            Key::Integer(i) => Value::Integer(*i),
            Key::Float(f) => Value::Float(*f),
            Key::Boolean(b) => Value::Boolean(*b),
            Key::String(s) => Value::String(s.clone()),
        }
    }
}

impl From<i64> for Key {
    fn from(i: i64) -> Self {
        Key::Integer(i)
    }
}

impl From<i32> for Key {
    fn from(i: i32) -> Self {
        Key::Integer(i64::from(i))
    }
}

impl From<f64> for Key {
    fn from(f: f64) -> Self {
        Key::Float(f).normalized()
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Boolean(b)
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

/// Ordered association from [`Key`] to [`Value`].
///
/// Equality is map equality: two tables are equal when they hold the same
/// key set with equal values, regardless of insertion order.
#[derive(Debug, Clone, Default)]
pub struct Table {
    entries: Vec<(Key, Value)>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Build a sequence table: `items[0]` at key 1, `items[1]` at key 2, ...
    pub fn from_sequence(items: Vec<Value>) -> Self {
        let entries = items
            .into_iter()
            .enumerate()
            .map(|(i, v)| (Key::Integer(i as i64 + 1), v))
            .collect();
        Self { entries }
    }

    /// Build from entries the caller guarantees to have unique keys.
    pub(crate) fn from_unique_entries(entries: Vec<(Key, Value)>) -> Self {
        Self { entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert or replace. A replaced entry keeps its position and the old
    /// value is returned.
    ///
    /// A `NaN` key is not stored: the table is left unchanged and `None` is
    /// returned, matching the host, which never lets `NaN` index a table.
    pub fn insert(&mut self, key: impl Into<Key>, value: impl Into<Value>) -> Option<Value> {
        let key = key.into().normalized();
        if key.is_nan() {
            tracing::debug!("ignored insert under a NaN key");
            return None;
        }
        let value = value.into();
        match self.position(&key) {
            Some(idx) => Some(std::mem::replace(&mut self.entries[idx].1, value)),
            None => {
                self.entries.push((key, value));
                None
            }
        }
    }

    /// Store `value` right after the current sequence part.
    pub fn push(&mut self, value: impl Into<Value>) {
        let next = self.sequence_len() as i64 + 1;
        self.insert(Key::Integer(next), value);
    }

    /// Largest `n` such that keys `1..=n` are all present.
    pub fn sequence_len(&self) -> usize {
        let mut n = 0usize;
        while self.position(&Key::Integer(n as i64 + 1)).is_some() {
            n += 1;
        }
        n
    }

    pub fn get(&self, key: impl Into<Key>) -> Option<&Value> {
        let key = key.into().normalized();
        self.position(&key).map(|idx| &self.entries[idx].1)
    }

    pub fn get_mut(&mut self, key: impl Into<Key>) -> Option<&mut Value> {
        let key = key.into().normalized();
        self.position(&key).map(|idx| &mut self.entries[idx].1)
    }

    pub fn contains_key(&self, key: impl Into<Key>) -> bool {
        self.get(key).is_some()
    }

    /// Remove an entry, keeping the order of the rest.
    pub fn remove(&mut self, key: impl Into<Key>) -> Option<Value> {
        let key = key.into().normalized();
        self.position(&key).map(|idx| self.entries.remove(idx).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Key, &Value)> {
        self.entries.iter().map(|(k, v)| (k, v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Key> {
        self.entries.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.entries.iter().map(|(_, v)| v)
    }

    fn position(&self, key: &Key) -> Option<usize> {
        // Sequences built in order keep key i at index i - 1.
        if let Key::Integer(i) = key {
            if *i >= 1 && (*i as u64) <= self.entries.len() as u64 {
                let idx = (*i - 1) as usize;
                if self.entries[idx].0 == *key {
                    return Some(idx);
                }
            }
        }
        self.entries.iter().position(|(k, _)| k == key)
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .entries
                .iter()
                .all(|(k, v)| other.position(k).is_some_and(|idx| other.entries[idx].1 == *v))
    }
}

impl<K: Into<Key>, V: Into<Value>> FromIterator<(K, V)> for Table {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut table = Table::new();
        for (k, v) in iter {
            table.insert(k, v);
        }
        table
    }
}

impl IntoIterator for Table {
    type Item = (Key, Value);
    type IntoIter = std::vec::IntoIter<(Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Table {
    type Item = &'a (Key, Value);
    type IntoIter = std::slice::Iter<'a, (Key, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// `Some(i)` when `f` is integral and inside the `i64` range.
pub(crate) fn float_to_integer(f: f64) -> Option<i64> {
    // -2^63 is exact in f64; 2^63 is the first value past i64::MAX.
    if f.fract() == 0.0 && (-9_223_372_036_854_775_808.0..9_223_372_036_854_775_808.0).contains(&f) {
        Some(f as i64)
    } else {
        None
    }
}

/// Float text in shortest round-trip form. Integral values keep a `.0` and
/// very large or small magnitudes switch to exponent notation.
pub(crate) fn format_float(f: f64) -> String {
    if f.is_nan() {
        "nan".to_string()
    } else if f == f64::INFINITY {
        "inf".to_string()
    } else if f == f64::NEG_INFINITY {
        "-inf".to_string()
    } else {
        format!("{:?}", f)
    }
}

/// The host's number-to-string conversion: C `%.14g`, plus a `.0` suffix
/// when the result would otherwise read back as an integer.
///
/// Only 14 significant digits survive (`0.1 + 0.2` gives `"0.3"`), so this
/// is for host-visible text. Literal rendering uses [`format_float`].
pub(crate) fn host_number_string(f: f64) -> String {
    if !f.is_finite() {
        return format_float(f);
    }
    // `{:.13e}` rounds to 14 significant digits and yields the exponent `%g`
    // bases its choice on, e.g. `1.0000000000000e300`.
    let sci = format!("{:.13e}", f);
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return format_float(f);
    };
    let Ok(exp) = exp.parse::<i32>() else {
        return format_float(f);
    };

    let mut text = if !(-4..14).contains(&exp) {
        let sign = if exp < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", trim_fraction(mantissa), sign, exp.abs())
    } else {
        let fixed = format!("{:.*}", (13 - exp) as usize, f);
        trim_fraction(&fixed).to_string()
    };
    if text.bytes().all(|b| b == b'-' || b.is_ascii_digit()) {
        text.push_str(".0");
    }
    text
}

/// Drop trailing zeros of a fraction, and the point if nothing is left.
fn trim_fraction(digits: &str) -> &str {
    if digits.contains('.') {
        digits.trim_end_matches('0').trim_end_matches('.')
    } else {
        digits
    }
}
