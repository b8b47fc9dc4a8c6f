use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

/// Names a class of documents served by exactly one backend kind
/// (usually a language id such as `rust`).
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Category(Arc<str>);

impl Category {
    pub fn new(name: impl AsRef<str>) -> Self {
        Category(Arc::from(name.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Environment variable name scoped to this category, e.g. `RUST_PORT`
    /// for `rust` + `PORT`. Anything that is not ASCII alphanumeric becomes `_`.
    pub fn var_name(&self, suffix: &str) -> String {
        let mut name: String = self
            .0
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() {
                    c.to_ascii_uppercase()
                } else {
                    '_'
                }
            })
            .collect();
        name.push('_');
        name.push_str(suffix);
        name
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Category {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Category {
    fn from(name: &str) -> Self {
        Category::new(name)
    }
}

impl From<String> for Category {
    fn from(name: String) -> Self {
        Category(Arc::from(name))
    }
}
