//! Resource config types: raw YAML shape and the processed form used by the route compiler.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// One of the five CRUD actions a resource can expose.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Index,
    Create,
    Update,
    Show,
    Delete,
}

impl Action {
    /// Canonical generation order.
    pub const ALL: [Action; 5] = [
        Action::Index,
        Action::Create,
        Action::Update,
        Action::Show,
        Action::Delete,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Index => "index",
            Action::Create => "create",
            Action::Update => "update",
            Action::Show => "show",
            Action::Delete => "delete",
        }
    }

    pub fn parse(s: &str) -> Option<Action> {
        Action::ALL.into_iter().find(|a| a.as_str() == s)
    }

    /// Delete has no page of its own.
    pub fn has_view(self) -> bool {
        !matches!(self, Action::Delete)
    }

    /// Whether the path carries an `{id}` segment.
    pub fn needs_id(self) -> bool {
        matches!(self, Action::Show | Action::Update | Action::Delete)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resource config exactly as written in YAML. Names are kept as strings so that
/// unknown actions surface as `ConfigError::UnknownAction` instead of a serde message.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawResourceConfig {
    #[serde(default)]
    pub resource_name: Option<String>,
    #[serde(default)]
    pub base_name: Option<String>,
    #[serde(default)]
    pub only: Vec<String>,
    #[serde(default)]
    pub except: Vec<String>,
    #[serde(default)]
    pub templates: Option<String>,
    #[serde(default)]
    pub redirect_after_create: Option<String>,
    #[serde(default)]
    pub redirect_after_update: Option<String>,
    /// Scope (`global` or an action name) -> variables.
    #[serde(default)]
    pub vars: BTreeMap<String, Option<Map<String, Value>>>,
    /// Boolean-ish: bools, 0/1, yes/no, on/off, true/false.
    #[serde(default)]
    pub permission: Option<serde_yaml::Value>,
    #[serde(default)]
    pub schema: Option<String>,
    #[serde(default)]
    pub table: Option<String>,
    #[serde(default)]
    pub id_column: Option<String>,
    /// Field -> filter kind.
    #[serde(default)]
    pub filters: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct VarsConfig {
    pub global: Map<String, Value>,
    pub per_action: HashMap<Action, Map<String, Value>>,
}

impl VarsConfig {
    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.per_action.values().all(Map::is_empty)
    }

    pub fn for_action(&self, action: Action) -> Option<&Map<String, Value>> {
        self.per_action.get(&action)
    }
}

/// Where the rows of a resource live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConfig {
    pub schema: String,
    pub table: String,
    pub id_column: String,
}

/// Validated resource config. Immutable once built.
#[derive(Clone, Debug, PartialEq)]
pub struct ResourceConfig {
    pub base_name: String,
    pub resource_name: String,
    pub only: Vec<Action>,
    pub except: Vec<Action>,
    pub templates: Option<String>,
    pub redirect_after_create: Option<Action>,
    pub redirect_after_update: Option<Action>,
    pub vars: VarsConfig,
    pub permission: bool,
    pub storage: StorageConfig,
    pub filters: BTreeMap<String, String>,
}

impl ResourceConfig {
    /// Minimal config with every optional key at its default.
    pub fn new(base_name: impl Into<String>, resource_name: impl Into<String>) -> Self {
        let resource_name = resource_name.into();
        ResourceConfig {
            base_name: base_name.into(),
            storage: StorageConfig {
                schema: super::DEFAULT_SCHEMA.to_string(),
                table: resource_name.clone(),
                id_column: super::DEFAULT_ID_COLUMN.to_string(),
            },
            resource_name,
            only: Vec::new(),
            except: Vec::new(),
            templates: None,
            redirect_after_create: None,
            redirect_after_update: None,
            vars: VarsConfig::default(),
            permission: false,
            filters: BTreeMap::new(),
        }
    }

    /// Actions to generate: all five, narrowed by `only`, minus `except`.
    /// Empty lists count as absent; the result is in canonical order.
    pub fn enabled_actions(&self) -> Vec<Action> {
        Action::ALL
            .into_iter()
            .filter(|a| self.only.is_empty() || self.only.contains(a))
            .filter(|a| !self.except.contains(a))
            .collect()
    }
}
