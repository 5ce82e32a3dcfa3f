#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(pub String);

impl std::fmt::Display for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key(s.to_string())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    String(std::string::String),
    Array(Vec<Value>),
    Object(Vec<Pair>),
}

impl Value {
    /// Builds a mapping, keeping the order in which the entries are given.
    pub fn object<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Value::Object(
            entries
                .into_iter()
                .map(|(k, v)| Pair::new(k.into(), v))
                .collect(),
        )
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Integer(i64::from(n))
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(values: Vec<T>) -> Self {
        Value::Array(values.into_iter().map(Into::into).collect())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Pair {
    pub key: Key,
    pub value: Value,
}

impl Pair {
    pub fn new(key: Key, value: Value) -> Self {
        Self { key, value }
    }
}

/// The root of a serialized structure: a mapping in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document(pub Vec<Pair>);

impl Document {
    pub fn new<K, I>(entries: I) -> Self
    where
        K: Into<Key>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Document(
            entries
                .into_iter()
                .map(|(k, v)| Pair::new(k.into(), v))
                .collect(),
        )
    }

    pub fn pairs(&self) -> &[Pair] {
        &self.0
    }
}

impl From<Document> for Value {
    fn from(doc: Document) -> Self {
        Value::Object(doc.0)
    }
}
