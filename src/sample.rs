use crate::ast::{Document, Value};
use crate::convert::{check_cardinality, FromValue, Members, RangeCheck};
use crate::error::ConversionError;
use std::collections::BTreeMap;

/// The configuration fixture dumped when no input file is given.
pub fn test_script() -> Document {
    Document::new(vec![
        ("number", Value::from(42)),
        ("animal", Value::from("bunny")),
        ("mylist", Value::from(vec![1, 2, 3, 4])),
        (
            "mydict",
            Value::object(vec![
                ("Elly", Value::from(31)),
                ("Stoyan", Value::from(35)),
                ("Malvina", Value::from(29)),
            ]),
        ),
        (
            "conf",
            Value::object(vec![(
                "complex",
                Value::object(vec![
                    ("list", Value::from(vec![6, 7, 8, 9])),
                    (
                        "dict",
                        Value::object(vec![("A", Value::from(1)), ("B", Value::from(2))]),
                    ),
                ]),
            )]),
        ),
        (
            "rlist",
            Value::from(vec![Value::from(vec![1, 2]), Value::from(vec![3, 4])]),
        ),
    ])
}

#[derive(Debug, PartialEq)]
pub struct ConfigTest {
    pub dict: BTreeMap<String, i64>,
    pub list: Vec<i64>,
}

impl FromValue for ConfigTest {
    fn from_value(v: &Value) -> Result<Self, ConversionError> {
        let m = Members::of(v)?;
        Ok(Self {
            dict: m.required("dict")?,
            list: m.optional("list")?,
        })
    }
}

#[derive(Debug, PartialEq)]
pub struct ComplexConfig {
    pub complex: ConfigTest,
}

impl FromValue for ComplexConfig {
    fn from_value(v: &Value) -> Result<Self, ConversionError> {
        let m = Members::of(v)?;
        Ok(Self {
            complex: m.required("complex")?,
        })
    }
}

/// Typed view of [`test_script`].
#[derive(Debug, PartialEq)]
pub struct TestScriptConfig {
    pub number: i32,
    pub animal: String,
    pub mylist: Vec<i64>,
    /// Ages by name.
    pub mydict: BTreeMap<String, u32>,
    pub conf: ComplexConfig,
    /// Every row is a pair.
    pub rlist: Vec<Vec<i64>>,
}

impl FromValue for TestScriptConfig {
    fn from_value(v: &Value) -> Result<Self, ConversionError> {
        let m = Members::of(v)?;
        let ages = RangeCheck::new(0, 150);
        Ok(Self {
            number: m.required("number")?,
            animal: m.required("animal")?,
            mylist: m.required("mylist")?,
            mydict: m.required_with("mydict", |d: &BTreeMap<String, u32>| {
                d.iter().try_for_each(|(name, age)| {
                    ages.check(age).map_err(|e| e.at(&format!(".{}", name)))
                })
            })?,
            conf: m.required("conf")?,
            rlist: m.required_with("rlist", |rows: &Vec<Vec<i64>>| {
                rows.iter().enumerate().try_for_each(|(i, row)| {
                    check_cardinality(row.len(), 2).map_err(|e| e.at(&format!("[{}]", i)))
                })
            })?,
        })
    }
}
