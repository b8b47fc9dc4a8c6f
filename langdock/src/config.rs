use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use langdock_types::Category;
use serde::Deserialize;

pub const DEFAULT_CATEGORY: &str = "rust";
pub const DEFAULT_HOST: &str = "language-server";
pub const DEFAULT_PORT: u16 = 5555;

/// Category-agnostic override variables shared by every category.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct GenericVars {
    pub host_var: String,
    pub port_var: String,
}

impl Default for GenericVars {
    fn default() -> Self {
        Self {
            host_var: "HOST".to_string(),
            port_var: "PORT".to_string(),
        }
    }
}

/// Static per-category record: which variables may override the address,
/// and what to fall back to when none do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointConfig {
    pub host_var: String,
    pub port_var: String,
    pub default_host: String,
    pub default_port: u16,
    /// Lower-cased, without the leading dot.
    pub extensions: Vec<String>,
}

impl EndpointConfig {
    pub fn new(category: &Category, default_host: impl Into<String>, default_port: u16) -> Self {
        Self {
            host_var: category.var_name("HOST"),
            port_var: category.var_name("PORT"),
            default_host: default_host.into(),
            default_port,
            extensions: Vec::new(),
        }
    }

    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| normalize_extension(e.as_ref()))
            .collect();
        self
    }
}

fn normalize_extension(ext: &str) -> String {
    ext.trim().trim_start_matches('.').to_ascii_lowercase()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawTable {
    #[serde(default)]
    generic: GenericVars,
    #[serde(default)]
    categories: BTreeMap<String, RawEndpoint>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEndpoint {
    host_var: Option<String>,
    port_var: Option<String>,
    default_host: String,
    default_port: u16,
    #[serde(default)]
    extensions: Vec<String>,
}

/// The set of known categories. Built once at process start, read-only
/// thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTable {
    generic: GenericVars,
    categories: HashMap<Category, EndpointConfig>,
}

impl Default for CategoryTable {
    fn default() -> Self {
        let rust = Category::new(DEFAULT_CATEGORY);
        let config = EndpointConfig::new(&rust, DEFAULT_HOST, DEFAULT_PORT).with_extensions(["rs"]);
        Self::new(GenericVars::default()).with(rust, config)
    }
}

impl CategoryTable {
    pub fn new(generic: GenericVars) -> Self {
        Self {
            generic,
            categories: HashMap::new(),
        }
    }

    pub fn with(mut self, category: impl Into<Category>, config: EndpointConfig) -> Self {
        self.categories.insert(category.into(), config);
        self
    }

    pub fn load_or_default<P: AsRef<Path>>(path: Option<P>) -> Result<Self> {
        match path {
            Some(p) => Self::read_from_file(p),
            None => Ok(Self::default()),
        }
    }

    fn read_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("reading {:?}", path.as_ref()))?;
        Self::from_toml_str(&raw).with_context(|| format!("loading {:?}", path.as_ref()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let raw: RawTable = toml::from_str(raw).context("parsing category config TOML")?;
        if raw.categories.is_empty() {
            bail!("category config defines no categories");
        }

        let mut table = Self::new(raw.generic);
        for (name, entry) in raw.categories {
            let category = Category::from(name);
            let mut config = EndpointConfig::new(&category, entry.default_host, entry.default_port)
                .with_extensions(entry.extensions);
            if let Some(var) = entry.host_var {
                config.host_var = var;
            }
            if let Some(var) = entry.port_var {
                config.port_var = var;
            }
            table.categories.insert(category, config);
        }
        Ok(table)
    }

    pub fn generic(&self) -> &GenericVars {
        &self.generic
    }

    pub fn lookup(&self, name: &str) -> Option<(&Category, &EndpointConfig)> {
        self.categories.get_key_value(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.categories.contains_key(name)
    }

    /// Known categories in name order.
    pub fn categories(&self) -> Vec<&Category> {
        let mut names: Vec<_> = self.categories.keys().collect();
        names.sort();
        names
    }

    /// File extensions whose changes matter to `name`'s backend. Empty for
    /// categories the table does not know.
    pub fn extensions(&self, name: &str) -> &[String] {
        self.categories
            .get(name)
            .map(|c| c.extensions.as_slice())
            .unwrap_or(&[])
    }

    pub fn category_for_path(&self, path: &Path) -> Option<&Category> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        // ambiguous mappings resolve to the smallest name so classification is stable
        self.categories
            .iter()
            .filter(|(_, c)| c.extensions.iter().any(|e| *e == ext))
            .map(|(name, _)| name)
            .min()
    }
}
