use crate::validator::{FieldIssue, TypedValue};
use regex::Regex;
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::sync::Arc;

/// Closed set of accepted spellings for an enumerated field.
///
/// Input is matched case-insensitively; the canonical spelling is what ends up
/// in the validated arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnumSpec {
    pub name: &'static str,
    pub variants: &'static [&'static str],
}

impl EnumSpec {
    #[must_use]
    pub const fn new(name: &'static str, variants: &'static [&'static str]) -> Self {
        Self { name, variants }
    }

    /// Canonical variant matching `raw`, if any
    #[must_use]
    pub fn resolve(&self, raw: &str) -> Option<&'static str> {
        let raw = raw.trim();
        self.variants
            .iter()
            .copied()
            .find(|v| v.eq_ignore_ascii_case(raw))
    }
}

/// Declares a domain enum whose serde names are the canonical variant
/// spellings, plus the matching [`EnumSpec`] constant for schemas.
macro_rules! domain_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $spec:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $text)]
                $variant,
            )+
        }

        impl $name {
            pub const VARIANTS: &'static [&'static str] = &[$($text),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }

            #[must_use]
            pub fn from_symbol(raw: &str) -> Option<Self> {
                let raw = raw.trim();
                $(
                    if raw.eq_ignore_ascii_case($text) {
                        return Some(Self::$variant);
                    }
                )+
                None
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        pub const $spec: $crate::schema::EnumSpec =
            $crate::schema::EnumSpec::new(stringify!($name), $name::VARIANTS);
    };
}

pub(crate) use domain_enum;

/// Target type of a declared field
#[derive(Debug, Clone)]
pub enum FieldType {
    Bool,
    Integer,
    Float,
    String,
    /// Epoch seconds, non-negative
    Timestamp,
    /// Asset identifier (non-empty, no whitespace)
    Asset,
    /// Blockchain address; chain-specific checks come from connector rules
    Address,
    Enum(EnumSpec),
    List(Box<FieldType>),
    /// Fixed-arity array validated element-wise
    Tuple(Vec<FieldType>),
    /// Nested mapping validated against its own descriptor
    Object(Arc<SchemaDescriptor>),
    /// Opaque JSON passed through unchanged
    Json,
}

impl FieldType {
    #[must_use]
    pub fn list_of(item: FieldType) -> Self {
        FieldType::List(Box::new(item))
    }

    #[must_use]
    pub fn object(schema: SchemaDescriptor) -> Self {
        FieldType::Object(Arc::new(schema))
    }

    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, FieldType::List(_))
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldType::Bool => write!(f, "bool"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::String => write!(f, "string"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::Asset => write!(f, "asset"),
            FieldType::Address => write!(f, "address"),
            FieldType::Enum(spec) => write!(f, "enum {}", spec.name),
            FieldType::List(item) => write!(f, "list<{item}>"),
            FieldType::Tuple(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
            FieldType::Object(schema) => write!(f, "object {}", schema.name()),
            FieldType::Json => write!(f, "json"),
        }
    }
}

/// Rule closure: receives the coerced value and returns it, possibly normalised.
pub type RuleFn = Arc<dyn Fn(TypedValue) -> Result<TypedValue, String> + Send + Sync>;

/// Per-field constraint applied after coercion
#[derive(Clone)]
pub enum FieldRule {
    Range { min: Option<f64>, max: Option<f64> },
    NonEmpty,
    Pattern(Regex),
    Custom { name: &'static str, check: RuleFn },
}

impl FieldRule {
    #[must_use]
    pub fn min(min: f64) -> Self {
        FieldRule::Range {
            min: Some(min),
            max: None,
        }
    }

    #[must_use]
    pub fn range(min: f64, max: f64) -> Self {
        FieldRule::Range {
            min: Some(min),
            max: Some(max),
        }
    }

    pub fn custom<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(TypedValue) -> Result<TypedValue, String> + Send + Sync + 'static,
    {
        FieldRule::Custom {
            name,
            check: Arc::new(check),
        }
    }

    /// Apply the rule. Rules that do not concern the value's type pass it through.
    pub fn apply(&self, value: TypedValue) -> Result<TypedValue, String> {
        match self {
            FieldRule::Range { min, max } => {
                let Some(n) = value.as_f64() else {
                    return Ok(value);
                };
                let below = min.is_some_and(|m| n < m);
                let above = max.is_some_and(|m| n > m);
                if below || above {
                    return Err(range_message(*min, *max));
                }
                Ok(value)
            }
            FieldRule::NonEmpty => match &value {
                TypedValue::List(items) if items.is_empty() => {
                    Err("List should not be empty.".to_string())
                }
                TypedValue::Str(s) | TypedValue::Asset(s) | TypedValue::Address(s)
                    if s.is_empty() =>
                {
                    Err("Field may not be empty.".to_string())
                }
                _ => Ok(value),
            },
            FieldRule::Pattern(re) => match value.as_str() {
                Some(s) if !re.is_match(s) => {
                    Err(format!("String does not match expected pattern {}.", re.as_str()))
                }
                _ => Ok(value),
            },
            FieldRule::Custom { check, .. } => check(value),
        }
    }
}

fn range_message(min: Option<f64>, max: Option<f64>) -> String {
    match (min, max) {
        (Some(lo), Some(hi)) => {
            format!("Must be greater than or equal to {lo} and less than or equal to {hi}.")
        }
        (Some(lo), None) => format!("Must be greater than or equal to {lo}."),
        (None, Some(hi)) => format!("Must be less than or equal to {hi}."),
        (None, None) => "Value out of range.".to_string(),
    }
}

impl fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldRule::Range { min, max } => f
                .debug_struct("Range")
                .field("min", min)
                .field("max", max)
                .finish(),
            FieldRule::NonEmpty => write!(f, "NonEmpty"),
            FieldRule::Pattern(re) => f.debug_tuple("Pattern").field(&re.as_str()).finish(),
            FieldRule::Custom { name, .. } => f.debug_tuple("Custom").field(name).finish(),
        }
    }
}

/// Value substituted when an optional field is absent from every location
#[derive(Clone)]
pub enum FieldDefault {
    Value(TypedValue),
    /// Computed per validation (e.g. "now" for an end timestamp)
    With(Arc<dyn Fn() -> TypedValue + Send + Sync>),
}

impl FieldDefault {
    #[must_use]
    pub fn produce(&self) -> TypedValue {
        match self {
            FieldDefault::Value(v) => v.clone(),
            FieldDefault::With(f) => f(),
        }
    }
}

impl fmt::Debug for FieldDefault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldDefault::Value(v) => f.debug_tuple("Value").field(v).finish(),
            FieldDefault::With(_) => write!(f, "With(<fn>)"),
        }
    }
}

/// One declared field. Fields are optional unless [`FieldSpec::required`] is called.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    pub required: bool,
    pub nullable: bool,
    pub default: Option<FieldDefault>,
    pub rules: Vec<FieldRule>,
    /// Delimiter for list values given as a single string (`?assets=BTC,ETH`)
    pub delimiter: Option<char>,
}

impl FieldSpec {
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            ty,
            required: false,
            nullable: false,
            default: None,
            rules: Vec::new(),
            delimiter: None,
        }
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    #[must_use]
    pub fn default_value(mut self, value: impl Into<TypedValue>) -> Self {
        self.default = Some(FieldDefault::Value(value.into()));
        self
    }

    #[must_use]
    pub fn default_with<F>(mut self, f: F) -> Self
    where
        F: Fn() -> TypedValue + Send + Sync + 'static,
    {
        self.default = Some(FieldDefault::With(Arc::new(f)));
        self
    }

    #[must_use]
    pub fn rule(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    #[must_use]
    pub fn delimited(mut self, delimiter: char) -> Self {
        self.delimiter = Some(delimiter);
        self
    }

    /// Value used when the field is absent from the merged payload.
    ///
    /// Optional fields without an explicit default resolve to `Null` so the
    /// handler always receives the full keyword set.
    #[must_use]
    pub fn absent_value(&self) -> TypedValue {
        self.default
            .as_ref()
            .map(FieldDefault::produce)
            .unwrap_or(TypedValue::Null)
    }
}

/// Whole-payload check run after every field validated cleanly.
///
/// May rewrite values in place (address normalisation against the chain named
/// by another field, for instance).
pub type CheckFn =
    Arc<dyn Fn(&mut BTreeMap<String, TypedValue>) -> Result<(), Vec<FieldIssue>> + Send + Sync>;

#[derive(Clone)]
pub struct SchemaCheck {
    pub name: &'static str,
    pub run: CheckFn,
}

impl fmt::Debug for SchemaCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SchemaCheck").field(&self.name).finish()
    }
}

/// Error raised while assembling a descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    DuplicateField { schema: String, field: String },
}

impl fmt::Display for SchemaError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaError::DuplicateField { schema, field } => {
                write!(f, "schema {schema} declares field '{field}' more than once")
            }
        }
    }
}

impl std::error::Error for SchemaError {}

/// Declarative description of the arguments one endpoint operation accepts
#[derive(Debug, Clone)]
pub struct SchemaDescriptor {
    name: String,
    fields: Vec<FieldSpec>,
    checks: Vec<SchemaCheck>,
}

impl SchemaDescriptor {
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            name: name.into(),
            fields: Vec::new(),
            checks: Vec::new(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.field(name).is_some()
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    #[must_use]
    pub fn checks(&self) -> &[SchemaCheck] {
        &self.checks
    }
}

pub struct SchemaBuilder {
    name: String,
    fields: Vec<FieldSpec>,
    checks: Vec<SchemaCheck>,
}

impl SchemaBuilder {
    #[must_use]
    pub fn field(mut self, field: FieldSpec) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn check<F>(mut self, name: &'static str, run: F) -> Self
    where
        F: Fn(&mut BTreeMap<String, TypedValue>) -> Result<(), Vec<FieldIssue>>
            + Send
            + Sync
            + 'static,
    {
        self.checks.push(SchemaCheck {
            name,
            run: Arc::new(run),
        });
        self
    }

    pub fn build(self) -> Result<SchemaDescriptor, SchemaError> {
        let mut seen = HashSet::with_capacity(self.fields.len());
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(SchemaError::DuplicateField {
                    schema: self.name,
                    field: field.name.clone(),
                });
            }
        }
        Ok(SchemaDescriptor {
            name: self.name,
            fields: self.fields,
            checks: self.checks,
        })
    }
}
