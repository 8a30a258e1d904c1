use std::fmt;

use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

use crate::error::TypeError;

/// Number of committed fields, and therefore of tree leaves, per record.
pub const FIELD_COUNT: usize = 4;

/// One committed field value.
///
/// The canonical byte form is what gets salted and hashed. It must be
/// identical at commit and verify time, so there is exactly one encoding:
/// the UTF-8 of [`FieldValue::canonical_text`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Integer(u64),
    Text(String),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Canonical textual form: base-10 for integers, verbatim for text.
    pub fn canonical_text(&self) -> String {
        match self {
            Self::Integer(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Bytes fed into the leaf hash after the salt.
    pub fn canonical_bytes(&self) -> Vec<u8> {
        match self {
            Self::Integer(n) => n.to_string().into_bytes(),
            Self::Text(s) => s.as_bytes().to_vec(),
        }
    }

    /// Convert a raw JSON value (request body or fetched payload).
    ///
    /// Non-negative integers become [`FieldValue::Integer`]; strings become
    /// [`FieldValue::Text`]; any other number is kept as its JSON text.
    pub fn from_json(field: &'static str, value: &Value) -> Result<Self, TypeError> {
        match value {
            Value::Number(n) => Ok(match n.as_u64() {
                Some(u) => Self::Integer(u),
                None => Self::Text(n.to_string()),
            }),
            Value::String(s) => Ok(Self::Text(s.clone())),
            other => Err(TypeError::UnsupportedValue {
                field,
                value: other.to_string(),
            }),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Integer(n) => Value::from(*n),
            Self::Text(s) => Value::from(s.as_str()),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical_text())
    }
}

impl From<u64> for FieldValue {
    fn from(n: u64) -> Self {
        Self::Integer(n)
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Declared kind of a field, used to normalize values before hashing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldKind {
    /// Unsigned integer. Numeric strings are parsed and re-rendered, so `1`,
    /// `"1"` and `"001"` all commit to the same bytes.
    Integer,
    /// Free text, taken verbatim. Numbers are rendered in base 10.
    Text,
}

/// One declared field: its payload name and kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldSchema {
    pub name: &'static str,
    pub kind: FieldKind,
}

impl FieldSchema {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind }
    }

    /// Bring a value into the single form this field commits to.
    pub fn normalize(&self, value: &FieldValue) -> Result<FieldValue, TypeError> {
        match (self.kind, value) {
            (FieldKind::Integer, FieldValue::Integer(n)) => Ok(FieldValue::Integer(*n)),
            (FieldKind::Integer, FieldValue::Text(s)) => {
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return Err(TypeError::NotAnInteger {
                        field: self.name,
                        value: s.clone(),
                    });
                }
                s.parse::<u64>()
                    .map(FieldValue::Integer)
                    .map_err(|_| TypeError::NotAnInteger {
                        field: self.name,
                        value: s.clone(),
                    })
            }
            (FieldKind::Text, FieldValue::Integer(n)) => Ok(FieldValue::Text(n.to_string())),
            (FieldKind::Text, FieldValue::Text(s)) => Ok(FieldValue::Text(s.clone())),
        }
    }
}

/// The declared, ordered field set of a record.
///
/// Position in `fields` is leaf position: field `i` always hashes into leaf
/// `i`. Reordering the declaration produces roots that are incompatible with
/// every record committed under the previous order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RecordSchema {
    pub name: &'static str,
    pub fields: [FieldSchema; FIELD_COUNT],
}

impl RecordSchema {
    /// The product record: id, name, manufacturing date, batch.
    pub const PRODUCT: Self = Self {
        name: "product-v1",
        fields: [
            FieldSchema::new("product_id", FieldKind::Integer),
            FieldSchema::new("product_name", FieldKind::Text),
            FieldSchema::new("product_mdate", FieldKind::Text),
            FieldSchema::new("product_batch", FieldKind::Text),
        ],
    };

    /// Field names in leaf order.
    pub fn field_names(&self) -> [&'static str; FIELD_COUNT] {
        self.fields.map(|f| f.name)
    }

    /// Normalize all four values against their declared kinds.
    pub fn normalize(
        &self,
        values: &[FieldValue; FIELD_COUNT],
    ) -> Result<[FieldValue; FIELD_COUNT], TypeError> {
        let mut out: [FieldValue; FIELD_COUNT] = Default::default();
        for (slot, (schema, value)) in out.iter_mut().zip(self.fields.iter().zip(values)) {
            *slot = schema.normalize(value)?;
        }
        Ok(out)
    }

    /// Read the four fields out of a JSON object, in leaf order.
    pub fn fields_from_json(&self, value: &Value) -> Result<[FieldValue; FIELD_COUNT], TypeError> {
        let object = value.as_object().ok_or(TypeError::NotAnObject)?;
        let mut out: [FieldValue; FIELD_COUNT] = Default::default();
        for (slot, schema) in out.iter_mut().zip(self.fields.iter()) {
            let raw = object
                .get(schema.name)
                .ok_or(TypeError::MissingField(schema.name))?;
            *slot = schema.normalize(&FieldValue::from_json(schema.name, raw)?)?;
        }
        Ok(out)
    }

    /// Encode the content-store payload: a JSON object keyed by field name,
    /// keys written in declared order.
    pub fn encode_payload(&self, values: &[FieldValue; FIELD_COUNT]) -> Result<Vec<u8>, TypeError> {
        serde_json::to_vec(&PayloadView {
            schema: self,
            values,
        })
        .map_err(|e| TypeError::Serialization(e.to_string()))
    }

    /// Decode a fetched payload back into leaf-ordered values.
    pub fn decode_payload(&self, bytes: &[u8]) -> Result<[FieldValue; FIELD_COUNT], TypeError> {
        let value: Value =
            serde_json::from_slice(bytes).map_err(|e| TypeError::Serialization(e.to_string()))?;
        self.fields_from_json(&value)
    }
}

impl Default for FieldValue {
    fn default() -> Self {
        Self::Text(String::new())
    }
}

struct PayloadView<'a> {
    schema: &'a RecordSchema,
    values: &'a [FieldValue; FIELD_COUNT],
}

impl Serialize for PayloadView<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FIELD_COUNT))?;
        for (field, value) in self.schema.fields.iter().zip(self.values) {
            map.serialize_entry(field.name, &value.to_json())?;
        }
        map.end()
    }
}
