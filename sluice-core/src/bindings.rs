use crate::{Error, Result, Value};
use std::fmt::{self, Display, Write};

/// Parameter values substituted into a prepared statement at execution time.
///
/// Either positional (bound to `?` placeholders in order) or named (bound by name,
/// insertion order preserved). Build them with the [`bindings!`](crate::bindings) macro:
/// ```rust
/// use sluice_core::{Bindings, Value, bindings};
/// let positional = bindings![1, "a"];
/// assert_eq!(positional.len(), 2);
/// let named = bindings! { "bar" => "baz" };
/// assert_eq!(named.get("bar"), Some(&Value::Varchar(Some("baz".into()))));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Bindings {
    Positional(Vec<Value>),
    Named(Vec<(String, Value)>),
}

/// Reference to a single binding, as seen by a driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Binding<'a> {
    /// Zero based position.
    Position(usize, &'a Value),
    Name(&'a str, &'a Value),
}

impl Bindings {
    pub fn positional() -> Self {
        Bindings::Positional(Vec::new())
    }

    pub fn named() -> Self {
        Bindings::Named(Vec::new())
    }

    pub fn len(&self) -> usize {
        match self {
            Bindings::Positional(values) => values.len(),
            Bindings::Named(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_named(&self) -> bool {
        matches!(self, Bindings::Named(..))
    }

    /// Append a positional value. Appending to an empty named collection turns it positional.
    pub fn push(&mut self, value: impl Into<Value>) -> Result<&mut Self> {
        match self {
            Bindings::Positional(values) => values.push(value.into()),
            Bindings::Named(values) if values.is_empty() => {
                *self = Bindings::Positional(vec![value.into()])
            }
            Bindings::Named(..) => {
                return Err(Error::msg(format!(
                    "Cannot append the positional value {} to named bindings",
                    value.into()
                )));
            }
        }
        Ok(self)
    }

    /// Set a named value, replacing a previous value with the same name.
    ///
    /// Binding a name to an empty positional collection turns it named.
    pub fn bind(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Result<&mut Self> {
        let name = name.into();
        match self {
            Bindings::Positional(values) if values.is_empty() => {
                *self = Bindings::Named(vec![(name, value.into())])
            }
            Bindings::Positional(..) => {
                return Err(Error::msg(format!(
                    "Cannot bind the named value `{}` to positional bindings",
                    name
                )));
            }
            Bindings::Named(values) => match values.iter_mut().find(|(k, _)| *k == name) {
                Some((_, v)) => *v = value.into(),
                None => values.push((name, value.into())),
            },
        }
        Ok(self)
    }

    /// Named lookup, accepting the name with or without its `:`, `@` or `$` sigil.
    pub fn get(&self, name: &str) -> Option<&Value> {
        let Bindings::Named(values) = self else {
            return None;
        };
        let name = name.trim_start_matches([':', '@', '$']);
        values
            .iter()
            .find(|(k, _)| k.trim_start_matches([':', '@', '$']) == name)
            .map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = Binding<'_>> {
        let (positional, named) = match self {
            Bindings::Positional(values) => (Some(values), None),
            Bindings::Named(values) => (None, Some(values)),
        };
        positional
            .into_iter()
            .flat_map(|v| v.iter().enumerate().map(|(i, v)| Binding::Position(i, v)))
            .chain(
                named
                    .into_iter()
                    .flat_map(|v| v.iter().map(|(k, v)| Binding::Name(k.as_str(), v))),
            )
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.iter().map(|b| match b {
            Binding::Position(_, v) | Binding::Name(_, v) => v,
        })
    }
}

impl Default for Bindings {
    fn default() -> Self {
        Bindings::positional()
    }
}

impl From<Vec<Value>> for Bindings {
    fn from(value: Vec<Value>) -> Self {
        Bindings::Positional(value)
    }
}

impl From<()> for Bindings {
    fn from(_: ()) -> Self {
        Bindings::default()
    }
}

impl Display for Bindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (open, close) = if self.is_named() { ('{', '}') } else { ('[', ']') };
        f.write_char(open)?;
        for (i, binding) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match binding {
                Binding::Position(_, v) => write!(f, "{}", v)?,
                Binding::Name(k, v) => write!(f, "{}: {}", k, v)?,
            }
        }
        f.write_char(close)
    }
}

/// Build [`Bindings`]: `bindings![a, b]` for positional, `bindings! { "k" => v }` for named.
#[macro_export]
macro_rules! bindings {
    () => {
        $crate::Bindings::default()
    };
    ($($key:tt => $value:expr),+ $(,)?) => {
        $crate::Bindings::Named(::std::vec![$((
            ::std::string::String::from($key),
            $crate::Value::from($value),
        )),+])
    };
    ($($value:expr),+ $(,)?) => {
        $crate::Bindings::Positional(::std::vec![$($crate::Value::from($value)),+])
    };
}
