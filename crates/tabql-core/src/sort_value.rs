//! Sort-value normalization and comparison kernel.
//!
//! Built once per scalar at the start of a sort/group/distinct operation so
//! the inner comparison loop branches on a type tag instead of re-parsing
//! the original cell text.

use crate::value::{Datetime, Ternary, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortValueType {
    Null,
    Integer,
    Float,
    Datetime,
    Boolean,
    String,
}

/// A denormalized comparable wrapper: every numeric projection is
/// precomputed, even though only the ones implied by `ty` are meaningful.
/// Boolean values populate `i` but deliberately leave `f`/`s` at their
/// defaults — comparing a Boolean to a Float is always `Unknown` (see
/// `less`), and this is preserved rather than "fixed".
#[derive(Debug, Clone, PartialEq)]
pub struct SortValue {
    pub ty: SortValueType,
    pub i: i64,
    pub f: f64,
    /// Unix nanoseconds.
    pub dt: i64,
    pub s: String,
    pub b: bool,
}

impl SortValue {
    fn null() -> Self {
        SortValue { ty: SortValueType::Null, i: 0, f: 0.0, dt: 0, s: String::new(), b: false }
    }

    fn integer(i: i64) -> Self {
        SortValue {
            ty: SortValueType::Integer,
            i,
            f: i as f64,
            dt: i.saturating_mul(1_000_000_000),
            s: i.to_string(),
            b: false,
        }
    }

    fn float(f: f64) -> Self {
        SortValue {
            ty: SortValueType::Float,
            i: 0,
            f,
            dt: (f * 1e9) as i64,
            s: canonical_float(f),
            b: false,
        }
    }

    fn datetime(dt: &Datetime) -> Self {
        let unix_nanos = dt.timestamp() * 1_000_000_000 + dt.timestamp_subsec_nanos() as i64;
        SortValue {
            ty: SortValueType::Datetime,
            i: 0,
            f: 0.0,
            dt: unix_nanos,
            s: dt.to_rfc3339(),
            b: false,
        }
    }

    fn boolean(b: bool) -> Self {
        SortValue {
            ty: SortValueType::Boolean,
            i: if b { 1 } else { 0 },
            f: 0.0,
            dt: 0,
            s: String::new(),
            b,
        }
    }

    fn string(s: &str) -> Self {
        SortValue {
            ty: SortValueType::String,
            i: 0,
            f: 0.0,
            dt: 0,
            s: s.trim().to_uppercase(),
            b: false,
        }
    }

    /// Applies the construction rules to a runtime `Value`.
    pub fn new(value: &Value) -> Self {
        match value {
            Value::Null => Self::null(),
            Value::Ternary(Ternary::Unknown) => Self::null(),
            Value::Ternary(t) => Self::boolean(t.is_true()),
            Value::Boolean(b) => Self::boolean(*b),
            Value::Integer(i) => Self::integer(*i),
            Value::Float(f) => Self::float(*f),
            Value::Datetime(dt) => Self::from_datetime(dt),
            Value::String(s) => Self::from_str(s),
        }
    }

    fn from_str(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Self::string(s);
        }
        if let Ok(i) = trimmed.parse::<i64>() {
            return Self::integer(i);
        }
        if let Ok(f) = trimmed.parse::<f64>() {
            return Self::float(f);
        }
        if let Some(dt) = parse_datetime(trimmed) {
            return Self::from_datetime(&dt);
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return Self::boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return Self::boolean(false);
        }
        Self::string(s)
    }

    /// Sub-second datetimes collapse into the Float projection only when
    /// the round trip through f64 is lossless; otherwise keep the
    /// no-projection Datetime branch.
    fn from_datetime(dt: &Datetime) -> Self {
        let secs = dt.timestamp();
        let nanos = dt.timestamp_subsec_nanos();
        if nanos == 0 {
            return Self::integer(secs);
        }
        let candidate = secs as f64 + nanos as f64 / 1e9;
        if float_to_time_matches(candidate, secs, nanos) {
            Self::float(candidate)
        } else {
            Self::datetime(dt)
        }
    }

    pub fn serialize(&self) -> String {
        match self.ty {
            SortValueType::Null => "n:".to_string(),
            SortValueType::Integer => format!("i:{}", self.i),
            SortValueType::Float => format!("f:{}", self.f),
            SortValueType::Datetime => format!("d:{}", self.dt),
            SortValueType::Boolean => format!("b:{}", if self.b { 1 } else { 0 }),
            SortValueType::String => format!("s:{}", self.s),
        }
    }

    pub fn equivalent(&self, other: &SortValue) -> bool {
        if self.ty == other.ty {
            return match self.ty {
                SortValueType::Null => true,
                SortValueType::Integer => self.i == other.i,
                SortValueType::Float => self.f == other.f,
                SortValueType::Datetime => self.dt == other.dt,
                SortValueType::Boolean => self.b == other.b,
                SortValueType::String => self.s == other.s,
            };
        }
        // Integer <-> Boolean cross-equivalence via the 0/1 projection.
        matches!(
            (self.ty, other.ty),
            (SortValueType::Integer, SortValueType::Boolean)
                | (SortValueType::Boolean, SortValueType::Integer)
        ) && self.i == other.i
    }
}

fn float_to_time_matches(candidate: f64, secs: i64, nanos: u32) -> bool {
    let rt_secs = candidate.trunc() as i64;
    let rt_nanos = ((candidate.fract().abs()) * 1e9).round() as u32;
    rt_secs == secs && rt_nanos == nanos
}

fn canonical_float(f: f64) -> String {
    if f == f.trunc() && f.is_finite() {
        format!("{f:.0}")
    } else {
        f.to_string()
    }
}

fn parse_datetime(s: &str) -> Option<Datetime> {
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    const FORMATS: &[&str] = &[
        "%Y-%m-%d %H:%M:%S%.f %z",
        "%Y-%m-%dT%H:%M:%S%.f %z",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%d",
        "%Y/%m/%d %H:%M:%S",
        "%Y/%m/%d",
    ];
    for fmt in FORMATS {
        if let Ok(ndt) = chrono::NaiveDateTime::parse_from_str(s, fmt) {
            return Some(chrono::DateTime::from_naive_utc_and_offset(ndt, chrono::FixedOffset::east_opt(0).unwrap()));
        }
        if let Ok(nd) = chrono::NaiveDate::parse_from_str(s, fmt) {
            let ndt = nd.and_hms_opt(0, 0, 0)?;
            return Some(chrono::DateTime::from_naive_utc_and_offset(ndt, chrono::FixedOffset::east_opt(0).unwrap()));
        }
    }
    None
}

/// Comparison returning SQL three-valued logic.
pub fn less(a: &SortValue, b: &SortValue) -> Ternary {
    use SortValueType::*;
    match (a.ty, b.ty) {
        (Integer, Integer) => cmp_ternary(a.i, b.i),
        (Integer, Float) | (Float, Float) | (Float, Integer) => cmp_ternary_f64(a.f, b.f),
        (Integer, Datetime) | (Float, Datetime) | (Datetime, Datetime) | (Datetime, Integer) | (Datetime, Float) => {
            cmp_ternary(a.dt, b.dt)
        }
        (Integer, String) | (Float, String) | (String, String) | (String, Integer) | (String, Float) => {
            cmp_ternary_str(&a.s, &b.s)
        }
        _ => Ternary::Unknown,
    }
}

fn cmp_ternary<T: PartialOrd>(a: T, b: T) -> Ternary {
    if a < b {
        Ternary::True
    } else if a > b {
        Ternary::False
    } else {
        Ternary::Unknown
    }
}

fn cmp_ternary_f64(a: f64, b: f64) -> Ternary {
    if a < b {
        Ternary::True
    } else if a > b {
        Ternary::False
    } else {
        Ternary::Unknown
    }
}

fn cmp_ternary_str(a: &str, b: &str) -> Ternary {
    match a.cmp(b) {
        std::cmp::Ordering::Less => Ternary::True,
        std::cmp::Ordering::Greater => Ternary::False,
        std::cmp::Ordering::Equal => Ternary::Unknown,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPosition {
    First,
    Last,
}

/// A row's worth of `SortValue`s, one per ORDER BY / GROUP BY column.
#[derive(Debug, Clone, PartialEq)]
pub struct SortValues(pub Vec<SortValue>);

impl SortValues {
    pub fn new(values: Vec<SortValue>) -> Self {
        SortValues(values)
    }

    /// Stable total order over the vector: direction inverts only a
    /// resolved (non-null-placement) comparison; ties fall through to the
    /// next column, and an all-tie vector compares as not-less (stable
    /// sort preserves original relative order).
    pub fn less(&self, other: &SortValues, directions: &[Direction], null_positions: &[NullPosition]) -> bool {
        for i in 0..self.0.len().min(other.0.len()) {
            let a = &self.0[i];
            let b = &other.0[i];
            let direction = directions.get(i).copied().unwrap_or(Direction::Asc);
            let null_position = null_positions.get(i).copied().unwrap_or(NullPosition::Last);

            let a_null = a.ty == SortValueType::Null;
            let b_null = b.ty == SortValueType::Null;

            if a_null != b_null {
                return match null_position {
                    NullPosition::First => a_null,
                    NullPosition::Last => b_null,
                };
            }
            if a_null && b_null {
                continue;
            }

            match less(a, b) {
                Ternary::True => return direction == Direction::Asc,
                Ternary::False => return direction == Direction::Desc,
                Ternary::Unknown => continue,
            }
        }
        false
    }
}
