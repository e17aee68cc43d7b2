//! Declarative description of the keys accepted under a settings namespace.

use super::{ConfigError, ConfigErrorExt};
use config::{Config, Map, Value, ValueKind};
use std::borrow::Cow;

/// Expected shape of a configuration value.
///
/// Scalar kinds follow the coercion rules of the `config` crate, so `"8080"`
/// coming from an environment override is a valid [`FieldKind::Integer`].
#[derive(Debug, Clone)]
pub enum FieldKind {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    /// Any table, contents unchecked.
    Table,
    Any,
    /// Nested table validated against its own field list.
    Section(Vec<FieldSpec>),
}

impl FieldKind {
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Table | Self::Section(_) => "table",
            Self::Any => "any value",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::Any => true,
            Self::String => value.clone().into_string().is_ok(),
            Self::Integer => value.clone().into_int().is_ok(),
            Self::Float => value.clone().into_float().is_ok(),
            Self::Boolean => value.clone().into_bool().is_ok(),
            Self::Array => matches!(value.kind, ValueKind::Array(_)),
            Self::Table | Self::Section(_) => matches!(value.kind, ValueKind::Table(_)),
        }
    }
}

/// What happens when a declared key is absent.
#[derive(Debug, Clone)]
pub enum Requirement {
    Required,
    Optional,
    Default(Value),
}

/// One declared key: `(key, kind, default-or-required)`.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    key: Cow<'static, str>,
    kind: FieldKind,
    requirement: Requirement,
}

impl FieldSpec {
    /// Absence fails binding.
    pub fn required(key: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        Self { key: key.into(), kind, requirement: Requirement::Required }
    }

    /// Absence leaves the key out of the bound table.
    pub fn optional(key: impl Into<Cow<'static, str>>, kind: FieldKind) -> Self {
        Self { key: key.into(), kind, requirement: Requirement::Optional }
    }

    /// Absence binds `default`.
    pub fn with_default(
        key: impl Into<Cow<'static, str>>,
        kind: FieldKind,
        default: impl Into<ValueKind>,
    ) -> Self {
        Self { key: key.into(), kind, requirement: Requirement::Default(Value::new(None, default)) }
    }

    /// Nested namespace. Always materialized, even when absent from the source.
    pub fn section(
        key: impl Into<Cow<'static, str>>,
        fields: impl IntoIterator<Item = Self>,
    ) -> Self {
        Self {
            key: key.into(),
            kind: FieldKind::Section(fields.into_iter().collect()),
            requirement: Requirement::Optional,
        }
    }

    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub const fn kind(&self) -> &FieldKind {
        &self.kind
    }

    #[must_use]
    pub const fn requirement(&self) -> &Requirement {
        &self.requirement
    }
}

/// The set of recognized keys under a fixed namespace prefix.
///
/// Schemas are closed by default: binding fails on any key under the prefix
/// that no [`FieldSpec`] declares.
#[derive(Debug, Clone)]
pub struct ConfigSchema {
    prefix: Cow<'static, str>,
    fields: Vec<FieldSpec>,
    ignore_unknown_fields: bool,
}

impl ConfigSchema {
    pub fn new(prefix: impl Into<Cow<'static, str>>) -> Self {
        Self { prefix: prefix.into(), fields: Vec::new(), ignore_unknown_fields: false }
    }

    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    /// Opts out of closed-schema validation; undeclared keys are passed through.
    #[must_use]
    pub const fn ignore_unknown_fields(mut self, ignore: bool) -> Self {
        self.ignore_unknown_fields = ignore;
        self
    }

    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub const fn is_strict(&self) -> bool {
        !self.ignore_unknown_fields
    }

    /// Every declared key as a full dotted path, sections included.
    #[must_use]
    pub fn keys(&self) -> Vec<String> {
        let mut keys = Vec::new();
        declared_keys(&self.prefix, &self.fields, &mut keys);
        keys
    }

    /// Validates the table under [`Self::prefix`] and resolves defaults.
    ///
    /// Pure with respect to `settings`: the same source always yields the same table.
    ///
    /// # Errors
    /// * [`ConfigError::UnknownField`] listing every undeclared key (strict schemas only).
    /// * [`ConfigError::InvalidType`] when a value cannot be read as its declared kind,
    ///   including a non-table value at the prefix itself.
    /// * [`ConfigError::MissingField`] for an absent required key.
    /// * [`ConfigError::Config`] when the source itself cannot be read.
    pub fn bind(&self, settings: &Config) -> Result<Map<String, Value>, ConfigError> {
        let section = self.section(settings)?;

        if self.is_strict() {
            let mut unknown = Vec::new();
            collect_unknown(&self.prefix, &self.fields, &section, &mut unknown);
            if !unknown.is_empty() {
                unknown.sort_unstable();
                return Err(ConfigError::UnknownField {
                    prefix: self.prefix.to_string(),
                    keys: unknown,
                    context: None,
                });
            }
        }

        resolve(&self.prefix, &self.fields, section, self.ignore_unknown_fields)
    }

    /// Reads the table under the prefix. Segments match ASCII case-insensitively.
    fn section(&self, settings: &Config) -> Result<Map<String, Value>, ConfigError> {
        let root: Map<String, Value> = settings
            .clone()
            .try_deserialize()
            .context(format!("Reading [{}]", self.prefix))?;

        let mut current = ValueKind::Table(root);
        for segment in self.prefix.split('.') {
            let table = match current {
                ValueKind::Table(table) => table,
                other => return Err(self.not_a_table(&other)),
            };
            match take_folded(table, segment) {
                Some(value) => current = value.kind,
                None => return Ok(Map::new()),
            }
        }

        match current {
            ValueKind::Table(table) => Ok(table),
            ValueKind::Nil => Ok(Map::new()),
            other => Err(self.not_a_table(&other)),
        }
    }

    fn not_a_table(&self, found: &ValueKind) -> ConfigError {
        ConfigError::InvalidType {
            key: self.prefix.to_string(),
            expected: "table",
            found: kind_name(found),
            context: None,
        }
    }
}

/// Removes every entry whose key equals `segment` ignoring ASCII case.
///
/// Tables spelled differently are merged; the exact spelling wins on conflicts.
fn take_folded(table: Map<String, Value>, segment: &str) -> Option<Value> {
    let mut matches: Vec<(String, Value)> =
        table.into_iter().filter(|(key, _)| key.eq_ignore_ascii_case(segment)).collect();
    matches.sort_by(|(a, _), (b, _)| (a == segment).cmp(&(b == segment)).then_with(|| a.cmp(b)));

    let mut merged: Option<Value> = None;
    for (_, value) in matches {
        merged = Some(match (merged.map(|m| m.kind), value.kind) {
            (Some(ValueKind::Table(mut base)), ValueKind::Table(over)) => {
                base.extend(over);
                Value::new(None, ValueKind::Table(base))
            },
            (_, kind) => Value::new(None, kind),
        });
    }
    merged
}

fn join(path: &str, key: &str) -> String {
    if path.is_empty() { key.to_owned() } else { format!("{path}.{key}") }
}

fn kind_name(kind: &ValueKind) -> &'static str {
    match kind {
        ValueKind::Nil => "nil",
        ValueKind::Boolean(_) => "boolean",
        ValueKind::I64(_) | ValueKind::I128(_) | ValueKind::U64(_) | ValueKind::U128(_) => {
            "integer"
        },
        ValueKind::Float(_) => "float",
        ValueKind::String(_) => "string",
        ValueKind::Table(_) => "table",
        ValueKind::Array(_) => "array",
    }
}

fn find<'a>(fields: &'a [FieldSpec], key: &str) -> Option<&'a FieldSpec> {
    fields.iter().find(|field| field.key.eq_ignore_ascii_case(key))
}

fn declared_keys(path: &str, fields: &[FieldSpec], out: &mut Vec<String>) {
    for field in fields {
        let key = join(path, &field.key);
        if let FieldKind::Section(children) = &field.kind {
            declared_keys(&key, children, out);
        }
        out.push(key);
    }
}

fn collect_unknown(
    path: &str,
    fields: &[FieldSpec],
    table: &Map<String, Value>,
    out: &mut Vec<String>,
) {
    for (key, value) in table {
        match find(fields, key) {
            None => out.push(join(path, key)),
            Some(FieldSpec { kind: FieldKind::Section(children), .. }) => {
                if let ValueKind::Table(nested) = &value.kind {
                    collect_unknown(&join(path, key), children, nested, out);
                }
            },
            Some(_) => {},
        }
    }
}

fn resolve(
    path: &str,
    fields: &[FieldSpec],
    mut table: Map<String, Value>,
    pass_through: bool,
) -> Result<Map<String, Value>, ConfigError> {
    let mut resolved = Map::new();

    for field in fields {
        let key = join(path, &field.key);
        // `key: ~` in YAML counts as absent.
        let spelled = table.keys().find(|k| k.eq_ignore_ascii_case(&field.key)).cloned();
        let present = spelled
            .and_then(|k| table.remove(&k))
            .filter(|v| !matches!(v.kind, ValueKind::Nil));

        match present {
            Some(value) => {
                if !field.kind.accepts(&value) {
                    return Err(ConfigError::InvalidType {
                        expected: field.kind.name(),
                        found: kind_name(&value.kind),
                        key,
                        context: None,
                    });
                }
                let value = match (&field.kind, value.kind) {
                    (FieldKind::Section(children), ValueKind::Table(nested)) => {
                        Value::new(None, ValueKind::Table(resolve(&key, children, nested, pass_through)?))
                    },
                    (_, kind) => Value::new(None, kind),
                };
                resolved.insert(field.key.to_string(), value);
            },
            None => match (&field.kind, &field.requirement) {
                (FieldKind::Section(children), _) => {
                    let nested = resolve(&key, children, Map::new(), pass_through)?;
                    resolved.insert(field.key.to_string(), Value::new(None, ValueKind::Table(nested)));
                },
                (_, Requirement::Required) => {
                    return Err(ConfigError::MissingField { key, context: None });
                },
                (_, Requirement::Optional) => {},
                (_, Requirement::Default(default)) => {
                    resolved.insert(field.key.to_string(), default.clone());
                },
            },
        }
    }

    if pass_through {
        resolved.extend(table);
    }

    Ok(resolved)
}
