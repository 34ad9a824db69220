//! Target schema module - the desired output shape of a run

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// Errors raised while reading a JSON-Schema document into a [`TargetSchema`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// The schema root is not a JSON object
    #[error("Schema must be a JSON object")]
    NotAnObject,

    /// `properties` is missing or is not an object
    #[error("Schema has no 'properties' object")]
    MissingProperties,

    /// A property definition is not an object
    #[error("Property '{0}' must be a JSON object")]
    InvalidProperty(String),

    /// `required` is present but is not an array of strings
    #[error("Schema 'required' must be an array of strings")]
    InvalidRequired,

    /// A required key does not name a declared property
    #[error("Required field '{0}' is not declared in 'properties'")]
    UndeclaredRequired(String),
}

/// Declared shape of one target field
///
/// Mirrors the property object of the JSON-Schema. `raw` is the verbatim
/// property JSON, which is what the model sees in prompts.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDescriptor {
    /// Declared JSON types (`"type": "string"` or `"type": ["string", "null"]`)
    pub types: Vec<String>,

    /// Free-text description, if any
    pub description: Option<String>,

    /// The property object as written in the schema
    pub raw: Value,
}

impl FieldDescriptor {
    /// Build a descriptor from a property object
    pub fn from_property(raw: &Value) -> Self {
        let types = match raw.get("type") {
            Some(Value::String(t)) => vec![t.clone()],
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|t| t.as_str().map(str::to_string))
                .collect(),
            _ => Vec::new(),
        };
        let description = raw
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        Self {
            types,
            description,
            raw: raw.clone(),
        }
    }

    /// Type label used in prompts
    ///
    /// A single type renders bare (`string`); a union renders as its JSON list
    /// (`["string","null"]`); an untyped field renders as `any`.
    pub fn type_label(&self) -> String {
        match self.types.as_slice() {
            [] => "any".to_string(),
            [single] => single.clone(),
            many => serde_json::to_string(many).unwrap_or_else(|_| many.join("|")),
        }
    }
}

/// One declared field of the target schema
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    /// Property name
    pub name: String,

    /// Declared type and description
    pub descriptor: FieldDescriptor,

    /// Whether the name appears in the schema's `required` list
    pub required: bool,
}

/// The schema a run must satisfy
///
/// Fields keep their declaration order; that order drives matching order and
/// the key order of the assembled query.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetSchema {
    fields: Vec<FieldSpec>,
    raw: Value,
}

impl TargetSchema {
    /// Parse a JSON-Schema object
    ///
    /// # Examples
    ///
    /// ```
    /// use reshape_domain::TargetSchema;
    /// use serde_json::json;
    ///
    /// let schema = TargetSchema::from_json(&json!({
    ///     "type": "object",
    ///     "properties": {
    ///         "id": {"type": ["string", "null"]},
    ///         "date": {"type": "string"}
    ///     },
    ///     "required": ["id"]
    /// })).unwrap();
    ///
    /// assert_eq!(schema.field_names(), vec!["id", "date"]);
    /// assert!(schema.field("id").unwrap().required);
    /// assert!(!schema.field("date").unwrap().required);
    /// ```
    pub fn from_json(raw: &Value) -> Result<Self, SchemaError> {
        let root = raw.as_object().ok_or(SchemaError::NotAnObject)?;

        let properties: &Map<String, Value> = root
            .get("properties")
            .and_then(Value::as_object)
            .ok_or(SchemaError::MissingProperties)?;

        let required: Vec<String> = match root.get("required") {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or(SchemaError::InvalidRequired)
                })
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(SchemaError::InvalidRequired),
        };

        if let Some(missing) = required.iter().find(|r| !properties.contains_key(*r)) {
            return Err(SchemaError::UndeclaredRequired(missing.clone()));
        }

        let mut fields = Vec::with_capacity(properties.len());
        for (name, property) in properties {
            if !property.is_object() {
                return Err(SchemaError::InvalidProperty(name.clone()));
            }
            fields.push(FieldSpec {
                name: name.clone(),
                descriptor: FieldDescriptor::from_property(property),
                required: required.contains(name),
            });
        }

        Ok(Self {
            fields,
            raw: raw.clone(),
        })
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|f| f.name.as_str()).collect()
    }

    /// Names of the required fields, in declaration order
    pub fn required_fields(&self) -> Vec<&str> {
        self.fields
            .iter()
            .filter(|f| f.required)
            .map(|f| f.name.as_str())
            .collect()
    }

    /// The schema document as given, used for validation
    pub fn as_json(&self) -> &Value {
        &self.raw
    }
}

impl fmt::Display for TargetSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}
