//! Config processing: required keys, action names, defaults.

use crate::config::{Action, RawResourceConfig, ResourceConfig, StorageConfig, VarsConfig};
use crate::error::ConfigError;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_SCHEMA: &str = "public";
pub const DEFAULT_ID_COLUMN: &str = "id";

/// Filter kinds a resource may declare under `filters`.
pub const FILTER_KINDS: &[&str] = &["string"];

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_\-]+$").expect("static pattern"))
}

fn required_name(
    value: Option<String>,
    key: &'static str,
    missing: ConfigError,
) -> Result<String, ConfigError> {
    let value = value.map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).ok_or(missing)?;
    if !name_pattern().is_match(&value) {
        return Err(ConfigError::InvalidName { key, value });
    }
    Ok(value)
}

fn optional_name(value: Option<String>, key: &'static str) -> Result<Option<String>, ConfigError> {
    match value {
        None => Ok(None),
        Some(v) if name_pattern().is_match(&v) => Ok(Some(v)),
        Some(v) => Err(ConfigError::InvalidName { key, value: v }),
    }
}

fn action(key: &str, value: &str) -> Result<Action, ConfigError> {
    Action::parse(value).ok_or_else(|| ConfigError::UnknownAction {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn actions(key: &str, values: &[String]) -> Result<Vec<Action>, ConfigError> {
    let mut out = Vec::with_capacity(values.len());
    for v in values {
        let a = action(key, v)?;
        if !out.contains(&a) {
            out.push(a);
        }
    }
    Ok(out)
}

/// Interpret a YAML scalar as a flag.
pub fn boolish(value: &serde_yaml::Value) -> Result<bool, ConfigError> {
    use serde_yaml::Value as Y;
    match value {
        Y::Null => Ok(false),
        Y::Bool(b) => Ok(*b),
        Y::Number(n) => match n.as_i64() {
            Some(i) => Ok(i != 0),
            None => Err(ConfigError::Validation(format!("permission: expected a flag, got {}", n))),
        },
        Y::String(s) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => Ok(true),
            "false" | "no" | "off" | "0" | "" => Ok(false),
            other => Err(ConfigError::Validation(format!(
                "permission: expected a flag, got '{}'",
                other
            ))),
        },
        _ => Err(ConfigError::Validation("permission: expected a flag".into())),
    }
}

/// Turn a raw config into a validated one. Fails fast on missing names.
pub fn process(raw: RawResourceConfig) -> Result<ResourceConfig, ConfigError> {
    let resource_name = required_name(raw.resource_name, "resource_name", ConfigError::MissingResourceName)?;
    let base_name = required_name(raw.base_name, "base_name", ConfigError::MissingBaseName)?;

    let only = actions("only", &raw.only)?;
    let except = actions("except", &raw.except)?;
    let redirect_after_create = raw
        .redirect_after_create
        .as_deref()
        .map(|v| action("redirect_after_create", v))
        .transpose()?;
    let redirect_after_update = raw
        .redirect_after_update
        .as_deref()
        .map(|v| action("redirect_after_update", v))
        .transpose()?;

    let mut vars = VarsConfig::default();
    for (scope, values) in raw.vars {
        let values = values.unwrap_or_default();
        if scope == "global" {
            vars.global = values;
        } else {
            let a = action(&format!("vars.{}", scope), &scope)?;
            vars.per_action.insert(a, values);
        }
    }

    let permission = match &raw.permission {
        Some(v) => boolish(v)?,
        None => false,
    };

    for (field, kind) in &raw.filters {
        if field.trim().is_empty() {
            return Err(ConfigError::Validation("filters: empty field name".into()));
        }
        if !FILTER_KINDS.contains(&kind.as_str()) {
            return Err(ConfigError::Validation(format!(
                "filters.{}: unsupported kind '{}'",
                field, kind
            )));
        }
    }

    let storage = StorageConfig {
        schema: optional_name(raw.schema, "schema")?.unwrap_or_else(|| DEFAULT_SCHEMA.to_string()),
        table: optional_name(raw.table, "table")?.unwrap_or_else(|| resource_name.clone()),
        id_column: optional_name(raw.id_column, "id_column")?
            .unwrap_or_else(|| DEFAULT_ID_COLUMN.to_string()),
    };

    let templates = match raw.templates {
        None => None,
        Some(t) => {
            let root = t.trim().trim_end_matches('/');
            if root.is_empty() {
                return Err(ConfigError::Validation(format!("templates: '{}' is not a template root", t)));
            }
            Some(root.to_string())
        }
    };

    Ok(ResourceConfig {
        base_name,
        resource_name,
        only,
        except,
        templates,
        redirect_after_create,
        redirect_after_update,
        vars,
        permission,
        storage,
        filters: raw.filters,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn raw(base: &str, resource: &str) -> RawResourceConfig {
        RawResourceConfig {
            base_name: Some(base.into()),
            resource_name: Some(resource.into()),
            ..Default::default()
        }
    }

    #[test]
    fn missing_resource_name_fails_fast() {
        let r = RawResourceConfig {
            base_name: Some("app".into()),
            ..Default::default()
        };
        assert!(matches!(process(r), Err(ConfigError::MissingResourceName)));
    }

    #[test]
    fn blank_base_name_counts_as_missing() {
        assert!(matches!(process(raw("  ", "article")), Err(ConfigError::MissingBaseName)));
    }

    #[test]
    fn rejects_names_that_break_paths() {
        let err = process(raw("app", "article/../x")).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidName { key: "resource_name", .. }));
    }

    #[test]
    fn unknown_action_in_except_is_named() {
        let mut r = raw("app", "article");
        r.except = vec!["delete".into(), "purge".into()];
        match process(r) {
            Err(ConfigError::UnknownAction { key, value }) => {
                assert_eq!(key, "except");
                assert_eq!(value, "purge");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn unknown_vars_scope_is_rejected() {
        let mut r = raw("app", "article");
        r.vars.insert("edit".into(), None);
        assert!(matches!(process(r), Err(ConfigError::UnknownAction { .. })));
    }

    #[test]
    fn storage_defaults_follow_resource_name() {
        let cfg = process(raw("app", "article")).unwrap();
        assert_eq!(cfg.storage.schema, "public");
        assert_eq!(cfg.storage.table, "article");
        assert_eq!(cfg.storage.id_column, "id");
        assert!(!cfg.permission);
    }

    #[test]
    fn duplicate_only_entries_collapse() {
        let mut r = raw("app", "article");
        r.only = vec!["show".into(), "show".into(), "index".into()];
        let cfg = process(r).unwrap();
        assert_eq!(cfg.only, vec![Action::Show, Action::Index]);
    }

    #[rstest]
    #[case("/")]
    #[case("")]
    #[case("//")]
    fn empty_template_root_is_rejected(#[case] root: &str) {
        let mut r = raw("app", "article");
        r.templates = Some(root.into());
        assert!(matches!(process(r), Err(ConfigError::Validation(m)) if m.starts_with("templates")));
    }

    #[test]
    fn template_root_drops_trailing_slash() {
        let mut r = raw("app", "article");
        r.templates = Some("admin/article/".into());
        assert_eq!(process(r).unwrap().templates.as_deref(), Some("admin/article"));
    }

    #[test]
    fn unsupported_filter_kind_is_rejected() {
        let mut r = raw("app", "article");
        r.filters.insert("created_at".into(), "date".into());
        assert!(matches!(process(r), Err(ConfigError::Validation(_))));
    }

    #[rstest]
    #[case("true", true)]
    #[case("false", false)]
    #[case("1", true)]
    #[case("0", false)]
    #[case("yes", true)]
    #[case("'off'", false)]
    #[case("'1'", true)]
    #[case("~", false)]
    fn permission_is_boolish(#[case] yaml: &str, #[case] expected: bool) {
        let v: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(boolish(&v).unwrap(), expected);
    }

    #[test]
    fn permission_rejects_non_flags() {
        let v: serde_yaml::Value = serde_yaml::from_str("maybe").unwrap();
        assert!(boolish(&v).is_err());
    }
}
