use std::fmt;

/// Original timezone offset is kept rather than normalizing to UTC, so a
/// value read from `2016-02-01T16:00:00-07:00` still prints with `-07:00`.
pub type Datetime = chrono::DateTime<chrono::FixedOffset>;

/// The SQL three-valued logical type. `Unknown` must never be silently
/// collapsed to `false`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Ternary {
    True,
    False,
    #[default]
    Unknown,
}

impl Ternary {
    pub fn from_bool(b: bool) -> Self {
        if b { Ternary::True } else { Ternary::False }
    }

    pub fn is_true(self) -> bool {
        matches!(self, Ternary::True)
    }

    pub fn and(self, other: Ternary) -> Ternary {
        use Ternary::*;
        match (self, other) {
            (False, _) | (_, False) => False,
            (True, True) => True,
            _ => Unknown,
        }
    }

    pub fn or(self, other: Ternary) -> Ternary {
        use Ternary::*;
        match (self, other) {
            (True, _) | (_, True) => True,
            (False, False) => False,
            _ => Unknown,
        }
    }

    pub fn not(self) -> Ternary {
        match self {
            Ternary::True => Ternary::False,
            Ternary::False => Ternary::True,
            Ternary::Unknown => Ternary::Unknown,
        }
    }
}

impl fmt::Display for Ternary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ternary::True => f.write_str("true"),
            Ternary::False => f.write_str("false"),
            Ternary::Unknown => f.write_str("UNKNOWN"),
        }
    }
}

/// A tagged scalar. `Null` compares unequal to everything, including
/// itself; that rule lives in the caller (equality operators), not here.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Datetime(Datetime),
    String(String),
    Ternary(Ternary),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Integer(_) => "integer",
            Value::Float(_) => "float",
            Value::Datetime(_) => "datetime",
            Value::String(_) => "string",
            Value::Ternary(_) => "ternary",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Datetime(dt) => write!(f, "{}", dt.to_rfc3339()),
            Value::String(s) => write!(f, "{s}"),
            Value::Ternary(t) => write!(f, "{t}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ternary_truth_tables_never_collapse_unknown() {
        assert_eq!(Ternary::True.and(Ternary::Unknown), Ternary::Unknown);
        assert_eq!(Ternary::False.and(Ternary::Unknown), Ternary::False);
        assert_eq!(Ternary::True.or(Ternary::Unknown), Ternary::True);
        assert_eq!(Ternary::False.or(Ternary::Unknown), Ternary::Unknown);
        assert_eq!(Ternary::Unknown.not(), Ternary::Unknown);
    }
}
