use crate::ast::{Pair, Value};
use crate::error::ConversionError;
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::convert::TryFrom;
use std::fmt::Display;
use std::hash::Hash;

type Result<T> = std::result::Result<T, ConversionError>;

/// Typed extraction out of a parsed or built `Value`.
pub trait FromValue: Sized {
    fn from_value(v: &Value) -> Result<Self>;
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Integer(_) => "integer",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch<T>(expected: &'static str, v: &Value) -> Result<T> {
    Err(ConversionError::TypeMismatch {
        path: String::new(),
        expected,
        found: kind(v),
    })
}

impl FromValue for bool {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Bool(b) => Ok(*b),
            other => mismatch("bool", other),
        }
    }
}

impl FromValue for String {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::String(s) => Ok(s.clone()),
            other => mismatch("string", other),
        }
    }
}

impl FromValue for char {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::String(s) => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(c),
                    _ => Err(ConversionError::OutOfRange {
                        path: String::new(),
                        value: format!("{:?}", s),
                        target: "char",
                    }),
                }
            }
            other => mismatch("string", other),
        }
    }
}

// integers and floats are not interchangeable
impl FromValue for f64 {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Float(x) => Ok(*x),
            other => mismatch("float", other),
        }
    }
}

macro_rules! integer_from_value {
    ($($t:ty),*) => {
        $(
            impl FromValue for $t {
                fn from_value(v: &Value) -> Result<Self> {
                    match v {
                        Value::Integer(n) => <$t>::try_from(*n).map_err(|_| ConversionError::OutOfRange {
                            path: String::new(),
                            value: n.to_string(),
                            target: stringify!($t),
                        }),
                        other => mismatch("integer", other),
                    }
                }
            }
        )*
    };
}

integer_from_value!(i8, i16, i32, i64, u8, u16, u32, u64, usize);

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(v: &Value) -> Result<Self> {
        match v {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

fn elements<T: FromValue>(v: &Value) -> Result<Vec<T>> {
    match v {
        Value::Array(values) => values
            .iter()
            .enumerate()
            .map(|(i, v)| T::from_value(v).map_err(|e| e.at(&format!("[{}]", i))))
            .collect(),
        other => mismatch("array", other),
    }
}

fn entries<T: FromValue>(v: &Value) -> Result<Vec<(String, T)>> {
    match v {
        Value::Object(pairs) => pairs
            .iter()
            .map(|p| {
                T::from_value(&p.value)
                    .map(|t| (p.key.0.clone(), t))
                    .map_err(|e| e.at(&format!(".{}", p.key)))
            })
            .collect(),
        other => mismatch("object", other),
    }
}

impl<T: FromValue> FromValue for Vec<T> {
    fn from_value(v: &Value) -> Result<Self> {
        elements(v)
    }
}

impl<T: FromValue> FromValue for VecDeque<T> {
    fn from_value(v: &Value) -> Result<Self> {
        Ok(elements(v)?.into_iter().collect())
    }
}

impl<T: FromValue + Ord> FromValue for BTreeSet<T> {
    fn from_value(v: &Value) -> Result<Self> {
        let mut set = BTreeSet::new();
        for (i, t) in elements(v)?.into_iter().enumerate() {
            if !set.insert(t) {
                return Err(ConversionError::DuplicateElement {
                    path: format!("[{}]", i),
                });
            }
        }
        Ok(set)
    }
}

impl<T: FromValue + Eq + Hash> FromValue for HashSet<T> {
    fn from_value(v: &Value) -> Result<Self> {
        let mut set = HashSet::new();
        for (i, t) in elements(v)?.into_iter().enumerate() {
            if !set.insert(t) {
                return Err(ConversionError::DuplicateElement {
                    path: format!("[{}]", i),
                });
            }
        }
        Ok(set)
    }
}

impl<T: FromValue> FromValue for BTreeMap<String, T> {
    fn from_value(v: &Value) -> Result<Self> {
        Ok(entries(v)?.into_iter().collect())
    }
}

impl<T: FromValue> FromValue for HashMap<String, T> {
    fn from_value(v: &Value) -> Result<Self> {
        Ok(entries(v)?.into_iter().collect())
    }
}

/// Member lookup for config structs built from an object.
pub struct Members<'a> {
    pairs: &'a [Pair],
}

impl<'a> Members<'a> {
    pub fn of(v: &'a Value) -> Result<Self> {
        match v {
            Value::Object(pairs) => Ok(Self { pairs }),
            other => mismatch("object", other),
        }
    }
    fn get(&self, key: &str) -> Option<&'a Value> {
        self.pairs.iter().find(|p| p.key.0 == key).map(|p| &p.value)
    }
    pub fn required<T: FromValue>(&self, key: &str) -> Result<T> {
        self.required_with(key, |_: &T| Ok(()))
    }
    /// Like `required`, then runs `check` on the converted member.
    pub fn required_with<T, F>(&self, key: &str, check: F) -> Result<T>
    where
        T: FromValue,
        F: FnOnce(&T) -> Result<()>,
    {
        let segment = format!(".{}", key);
        let v = self.get(key).ok_or_else(|| ConversionError::MissingMember {
            path: segment.clone(),
        })?;
        let t = T::from_value(v).map_err(|e| e.at(&segment))?;
        check(&t).map_err(|e| e.at(&segment))?;
        Ok(t)
    }
    /// A missing member falls back to `T::default()`.
    pub fn optional<T: FromValue + Default>(&self, key: &str) -> Result<T> {
        match self.get(key) {
            Some(_) => self.required(key),
            None => Ok(T::default()),
        }
    }
}

/// Inclusive `[min, max]` bound on a member value.
pub struct RangeCheck<T> {
    min: T,
    max: T,
}

impl<T: PartialOrd + Display> RangeCheck<T> {
    pub fn new(min: T, max: T) -> Self {
        Self { min, max }
    }
    pub fn check(&self, value: &T) -> Result<()> {
        let message = if *value < self.min {
            format!("value [{}] failed min [{}] check", value, self.min)
        } else if *value > self.max {
            format!("value [{}] failed max [{}] check", value, self.max)
        } else {
            return Ok(());
        };
        Err(ConversionError::CheckFailed {
            path: String::new(),
            message,
        })
    }
}

pub fn check_cardinality(len: usize, expected: usize) -> Result<()> {
    if len != expected {
        return Err(ConversionError::CheckFailed {
            path: String::new(),
            message: format!("size [{}] differs from expected [{}]", len, expected),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Parser;
    use std::io::Cursor;

    fn parse(text: &str) -> Value {
        Parser::new(Cursor::new(text))
            .and_then(|mut p| p.parse_document())
            .unwrap()
    }

    fn convert<T: FromValue>(text: &str) -> Result<T> {
        T::from_value(&parse(text))
    }

    #[test]
    fn test_convert_scalars() {
        assert_eq!(convert::<bool>("true"), Ok(true));
        assert_eq!(convert::<String>(r#""bunny""#), Ok(String::from("bunny")));
        assert_eq!(convert::<char>(r#""x""#), Ok('x'));
        assert_eq!(convert::<i64>("-42"), Ok(-42));
        assert_eq!(convert::<u8>("255"), Ok(255));
        assert_eq!(convert::<f64>("2.5"), Ok(2.5));
        assert_eq!(convert::<Option<i32>>("null"), Ok(None));
        assert_eq!(convert::<Option<i32>>("7"), Ok(Some(7)));
    }

    #[test]
    fn test_ng_convert_scalars() {
        #[rustfmt::skip]
        let tests = vec![
            (convert::<i64>(r#""42""#).map(drop), "type mismatch at `$`: expected integer, found string"),
            (convert::<f64>("42").map(drop), "type mismatch at `$`: expected float, found integer"),
            (convert::<String>("null").map(drop), "type mismatch at `$`: expected string, found null"),
            (convert::<u8>("256").map(drop), "value 256 at `$` does not fit in u8"),
            (convert::<u32>("-1").map(drop), "value -1 at `$` does not fit in u32"),
            (convert::<char>(r#""xy""#).map(drop), r#"value "xy" at `$` does not fit in char"#),
        ];
        for (result, expected) in tests {
            assert_eq!(result.unwrap_err().to_string(), expected);
        }
    }

    #[test]
    fn test_convert_sequences() {
        let list = "[3, 1, 2]";
        assert_eq!(convert::<Vec<i64>>(list), Ok(vec![3, 1, 2]));
        assert_eq!(
            convert::<VecDeque<i64>>(list),
            Ok(vec![3, 1, 2].into_iter().collect::<VecDeque<i64>>())
        );
        assert_eq!(
            convert::<BTreeSet<i64>>(list),
            Ok(vec![1, 2, 3].into_iter().collect::<BTreeSet<i64>>())
        );
        assert_eq!(
            convert::<HashSet<i64>>(list),
            Ok(vec![1, 2, 3].into_iter().collect::<HashSet<i64>>())
        );
        assert_eq!(
            convert::<Vec<Vec<i64>>>("[[1, 2], [], [3]]"),
            Ok(vec![vec![1, 2], vec![], vec![3]])
        );
    }

    #[test]
    fn test_ng_convert_sequences() {
        assert_eq!(
            convert::<Vec<i64>>(r#"[1, "2"]"#).unwrap_err(),
            ConversionError::TypeMismatch {
                path: String::from("[1]"),
                expected: "integer",
                found: "string",
            }
        );
        assert_eq!(
            convert::<BTreeSet<i64>>("[1, 2, 1]").unwrap_err(),
            ConversionError::DuplicateElement {
                path: String::from("[2]")
            }
        );
        assert!(convert::<Vec<i64>>(r#"{"a": 1}"#).is_err());
    }

    #[test]
    fn test_convert_maps() {
        let text = r#"{"Elly": 31, "Stoyan": 35}"#;
        let expected: BTreeMap<String, i64> = vec![
            (String::from("Elly"), 31),
            (String::from("Stoyan"), 35),
        ]
        .into_iter()
        .collect();
        assert_eq!(convert::<BTreeMap<String, i64>>(text), Ok(expected));
        assert_eq!(convert::<HashMap<String, i64>>(text).unwrap().len(), 2);

        let err = convert::<BTreeMap<String, Vec<i64>>>(r#"{"a": [1], "b": [true]}"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "type mismatch at `$.b[0]`: expected integer, found bool"
        );
    }

    #[test]
    fn test_members() {
        let v = parse(r#"{"power": 7, "name": "amp"}"#);
        let m = Members::of(&v).unwrap();
        assert_eq!(m.required::<u32>("power"), Ok(7));
        assert_eq!(m.optional::<Vec<i64>>("list"), Ok(vec![]));
        assert_eq!(
            m.required::<String>("label").unwrap_err(),
            ConversionError::MissingMember {
                path: String::from(".label")
            }
        );
        assert!(Members::of(&Value::from(1)).is_err());
    }

    #[test]
    fn test_range_check() {
        let v = parse(r#"{"power": 7}"#);
        let m = Members::of(&v).unwrap();
        let within = |range: RangeCheck<u32>| m.required_with("power", |p: &u32| range.check(p));
        assert_eq!(within(RangeCheck::new(1, 8)), Ok(7));
        assert_eq!(within(RangeCheck::new(7, 7)), Ok(7));
        assert_eq!(
            within(RangeCheck::new(1, 6)).unwrap_err().to_string(),
            "check failed at `$.power`: value [7] failed max [6] check"
        );
        assert_eq!(
            within(RangeCheck::new(8, 9)).unwrap_err().to_string(),
            "check failed at `$.power`: value [7] failed min [8] check"
        );
    }

    #[test]
    fn test_cardinality_check() {
        let v = parse(r#"{"dict": {"A": 1, "B": 2}}"#);
        let m = Members::of(&v).unwrap();
        let sized = |n: usize| {
            m.required_with("dict", |d: &BTreeMap<String, i64>| {
                check_cardinality(d.len(), n)
            })
        };
        assert_eq!(sized(2).unwrap().len(), 2);
        assert_eq!(
            sized(3).unwrap_err().to_string(),
            "check failed at `$.dict`: size [2] differs from expected [3]"
        );
    }
}
