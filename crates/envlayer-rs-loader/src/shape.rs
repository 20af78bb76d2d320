//! Destination shape validation.
//!
//! Runs before any file or environment access. A destination must serialize as
//! a struct with named fields, every descriptor must name one of its fields,
//! and its snapshot must decode back into the same type.

use crate::ShapeError;
use envlayer_rs_schema::{FieldDescriptor, FieldKind, variable_name};
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde::ser::{self, Impossible};
use serde_json::{Map, Value};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Top-level serde shape of a value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Struct with named fields.
    Record,
    /// Map with runtime keys.
    Map,
    /// Sequence or array.
    Sequence,
    /// Tuple or tuple struct.
    Tuple,
    /// Single-field tuple struct.
    Newtype,
    /// Enum variant of any form.
    Enum,
    /// `()` or a unit struct.
    Unit,
    /// `None`.
    Absent,
    /// Primitive value, named by type.
    Scalar(&'static str),
    /// Serialization failed before the shape was known.
    Unknown,
}

impl Shape {
    /// Short human readable name.
    pub fn describe(self) -> &'static str {
        match self {
            Shape::Record => "a struct",
            Shape::Map => "a map",
            Shape::Sequence => "a sequence",
            Shape::Tuple => "a tuple",
            Shape::Newtype => "a newtype struct",
            Shape::Enum => "an enum",
            Shape::Unit => "a unit value",
            Shape::Absent => "None",
            Shape::Scalar(name) => name,
            Shape::Unknown => "an unserializable value",
        }
    }
}

/// Detect the top-level shape of `value` without serializing its contents.
pub fn detect<T: Serialize + ?Sized>(value: &T) -> Shape {
    match value.serialize(ShapeDetector) {
        Ok(shape) | Err(DetectStop::Found(shape)) => shape,
        Err(DetectStop::Failed(_)) => Shape::Unknown,
    }
}

/// Descriptor table plus the destination snapshot it was checked against.
#[derive(Debug, Clone)]
pub(crate) struct Validated {
    pub(crate) fields: Vec<FieldDescriptor>,
    pub(crate) snapshot: Map<String, Value>,
}

/// Check `destination` and its descriptors; return the snapshot on success.
///
/// Fields marked `#[serde(skip)]` never reach the snapshot, so a load resets
/// them to their `Default`. Describing one is a [`ShapeError::UnknownField`].
pub(crate) fn validate<T: Serialize + DeserializeOwned>(
    destination: &T,
    fields: Vec<FieldDescriptor>,
    prefix: &str,
) -> Result<Validated, ShapeError> {
    let shape = detect(destination);
    if shape != Shape::Record {
        return Err(ShapeError::NotARecord {
            found: shape.describe(),
        });
    }

    let snapshot = match serde_json::to_value(destination)? {
        Value::Object(map) => map,
        other => {
            return Err(ShapeError::NotARecord {
                found: json_kind(&other),
            });
        }
    };

    let mut variables = HashMap::new();
    check_fields(&fields, Some(&snapshot), "", prefix, &mut variables)?;

    // serde_json writes NaN and infinities as null, which f64 will not accept back.
    if let Err(err) = serde_json::from_value::<T>(Value::Object(snapshot.clone())) {
        return Err(match null_float(&fields, &snapshot, "") {
            Some(path) => ShapeError::NonFiniteFloat { path },
            None => ShapeError::RoundTrip(err),
        });
    }
    debug!(
        "validated config destination (fields={}, variables={})",
        fields.len(),
        variables.len()
    );
    Ok(Validated { fields, snapshot })
}

fn check_fields(
    fields: &[FieldDescriptor],
    snapshot: Option<&Map<String, Value>>,
    path_prefix: &str,
    var_prefix: &str,
    variables: &mut HashMap<String, String>,
) -> Result<(), ShapeError> {
    let mut names = HashSet::new();
    for field in fields {
        let path = field_path(path_prefix, &field.name);
        if !names.insert(field.name.to_ascii_lowercase()) {
            return Err(ShapeError::DuplicateField { path });
        }

        if snapshot.is_some_and(|map| !map.contains_key(&field.name)) {
            return Err(ShapeError::UnknownField { path });
        }

        let current = snapshot.and_then(|map| map.get(&field.name));
        if let FieldKind::Record(children) = &field.kind {
            let nested = match current {
                Some(Value::Object(map)) => Some(map),
                None | Some(Value::Null) => None,
                Some(other) => {
                    return Err(ShapeError::NestedNotARecord {
                        path,
                        found: json_kind(other),
                    });
                }
            };
            if field.ignored {
                continue;
            }
            let variable = variable_name(var_prefix, field);
            check_fields(children, nested, &path, &variable, variables)?;
            continue;
        }

        if field.ignored {
            continue;
        }
        let variable = variable_name(var_prefix, field);
        if let Some(first) = variables.insert(variable.clone(), path.clone()) {
            return Err(ShapeError::DuplicateVariable {
                variable,
                first,
                second: path,
            });
        }
    }
    Ok(())
}

/// Path of the first float field, element, or entry whose snapshot value is null.
fn null_float(
    fields: &[FieldDescriptor],
    snapshot: &Map<String, Value>,
    path_prefix: &str,
) -> Option<String> {
    fields.iter().find_map(|field| {
        let path = field_path(path_prefix, &field.name);
        match (&field.kind, snapshot.get(&field.name)?) {
            (FieldKind::Float, Value::Null) => Some(path),
            (FieldKind::List(inner), Value::Array(items))
                if **inner == FieldKind::Float && items.iter().any(Value::is_null) =>
            {
                Some(path)
            }
            (FieldKind::Map(inner), Value::Object(entries))
                if **inner == FieldKind::Float && entries.values().any(Value::is_null) =>
            {
                Some(path)
            }
            (FieldKind::Record(children), Value::Object(nested)) => {
                null_float(children, nested, &path)
            }
            _ => None,
        }
    })
}

/// Dotted path of a field below `prefix`.
pub(crate) fn field_path(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

/// Name of a JSON value's type, for error messages.
pub(crate) fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "a sequence",
        Value::Object(_) => "a map",
    }
}

/// Serializer that reports the first shape it sees.
struct ShapeDetector;

/// Early exit carrying the discovered shape.
#[derive(Debug)]
enum DetectStop {
    Found(Shape),
    Failed(String),
}

impl fmt::Display for DetectStop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectStop::Found(shape) => write!(f, "found {}", shape.describe()),
            DetectStop::Failed(msg) => f.write_str(msg),
        }
    }
}

impl std::error::Error for DetectStop {}

impl ser::Error for DetectStop {
    fn custom<T: fmt::Display>(msg: T) -> Self {
        DetectStop::Failed(msg.to_string())
    }
}

type Detected = Result<Shape, DetectStop>;

impl ser::Serializer for ShapeDetector {
    type Ok = Shape;
    type Error = DetectStop;
    type SerializeSeq = Impossible<Shape, DetectStop>;
    type SerializeTuple = Impossible<Shape, DetectStop>;
    type SerializeTupleStruct = Impossible<Shape, DetectStop>;
    type SerializeTupleVariant = Impossible<Shape, DetectStop>;
    type SerializeMap = Impossible<Shape, DetectStop>;
    type SerializeStruct = Impossible<Shape, DetectStop>;
    type SerializeStructVariant = Impossible<Shape, DetectStop>;

    fn serialize_bool(self, _: bool) -> Detected {
        Ok(Shape::Scalar("bool"))
    }

    fn serialize_i8(self, _: i8) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_i16(self, _: i16) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_i32(self, _: i32) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_i64(self, _: i64) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_u8(self, _: u8) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_u16(self, _: u16) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_u32(self, _: u32) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_u64(self, _: u64) -> Detected {
        Ok(Shape::Scalar("an integer"))
    }

    fn serialize_f32(self, _: f32) -> Detected {
        Ok(Shape::Scalar("a float"))
    }

    fn serialize_f64(self, _: f64) -> Detected {
        Ok(Shape::Scalar("a float"))
    }

    fn serialize_char(self, _: char) -> Detected {
        Ok(Shape::Scalar("a char"))
    }

    fn serialize_str(self, _: &str) -> Detected {
        Ok(Shape::Scalar("a string"))
    }

    fn serialize_bytes(self, _: &[u8]) -> Detected {
        Ok(Shape::Scalar("bytes"))
    }

    fn serialize_none(self) -> Detected {
        Ok(Shape::Absent)
    }

    fn serialize_some<T: ?Sized + Serialize>(self, value: &T) -> Detected {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Detected {
        Ok(Shape::Unit)
    }

    fn serialize_unit_struct(self, _: &'static str) -> Detected {
        Ok(Shape::Unit)
    }

    fn serialize_unit_variant(self, _: &'static str, _: u32, _: &'static str) -> Detected {
        Ok(Shape::Enum)
    }

    fn serialize_newtype_struct<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: &T,
    ) -> Detected {
        Ok(Shape::Newtype)
    }

    fn serialize_newtype_variant<T: ?Sized + Serialize>(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: &T,
    ) -> Detected {
        Ok(Shape::Enum)
    }

    fn serialize_seq(self, _: Option<usize>) -> Result<Self::SerializeSeq, DetectStop> {
        Err(DetectStop::Found(Shape::Sequence))
    }

    fn serialize_tuple(self, _: usize) -> Result<Self::SerializeTuple, DetectStop> {
        Err(DetectStop::Found(Shape::Tuple))
    }

    fn serialize_tuple_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleStruct, DetectStop> {
        Err(DetectStop::Found(Shape::Tuple))
    }

    fn serialize_tuple_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeTupleVariant, DetectStop> {
        Err(DetectStop::Found(Shape::Enum))
    }

    fn serialize_map(self, _: Option<usize>) -> Result<Self::SerializeMap, DetectStop> {
        Err(DetectStop::Found(Shape::Map))
    }

    fn serialize_struct(
        self,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStruct, DetectStop> {
        Err(DetectStop::Found(Shape::Record))
    }

    fn serialize_struct_variant(
        self,
        _: &'static str,
        _: u32,
        _: &'static str,
        _: usize,
    ) -> Result<Self::SerializeStructVariant, DetectStop> {
        Err(DetectStop::Found(Shape::Enum))
    }
}
