use crate::error::{Error, Result};

use aws_sdk_dynamodb::{primitives::Blob, types};
use serde::{Deserialize, Deserializer, Serialize, Serializer, de};
use serde_dynamo::{from_attribute_value, from_item, to_attribute_value, to_item};
use std::{collections, fmt};

/// Generic decoded value tree.
///
/// Mirrors [`types::AttributeValue`] one to one; numbers stay decimal text.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::common::codec;
///
/// let value = codec::decode(AttributeValue::N("42".to_string())).unwrap();
/// assert_eq!(value, codec::Value::Number("42".to_string()));
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Explicit null; never dropped by [`decode`].
    Null,
    /// Boolean.
    Bool(bool),
    /// Number, as decimal text.
    Number(String),
    /// String.
    String(String),
    /// Binary.
    Binary(Vec<u8>),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Map of attribute names to values.
    Map(collections::BTreeMap<String, Value>),
    /// Set of strings.
    StringSet(Vec<String>),
    /// Set of numbers, as decimal text.
    NumberSet(Vec<String>),
    /// Set of binaries.
    BinarySet(Vec<Vec<u8>>),
}

impl Value {
    /// The numeric value of a [`Value::Number`], if it parses.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(number) => number.parse().ok(),
            _ => None,
        }
    }
}

impl From<Value> for types::AttributeValue {
    fn from(value: Value) -> Self {
        match value {
            Value::Null => Self::Null(true),
            Value::Bool(boolean) => Self::Bool(boolean),
            Value::Number(number) => Self::N(number),
            Value::String(string) => Self::S(string),
            Value::Binary(bytes) => Self::B(Blob::new(bytes)),
            Value::List(list) => Self::L(list.into_iter().map(Self::from).collect()),
            Value::Map(map) => Self::M(
                map.into_iter()
                    .map(|(key, value)| (key, Self::from(value)))
                    .collect(),
            ),
            Value::StringSet(set) => Self::Ss(set),
            Value::NumberSet(set) => Self::Ns(set),
            Value::BinarySet(set) => Self::Bs(set.into_iter().map(Blob::new).collect()),
        }
    }
}

/// Byte sequence that encodes as a binary attribute.
///
/// `Vec<u8>` serializes as a sequence and would become a list of numbers; wrap it to get a
/// binary attribute instead.
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct Bytes(pub Vec<u8>);

impl Serialize for Bytes {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_bytes(&self.0)
    }
}

struct BytesVisitor;

impl<'de> de::Visitor<'de> for BytesVisitor {
    type Value = Bytes;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a byte sequence")
    }

    fn visit_bytes<E: de::Error>(self, bytes: &[u8]) -> std::result::Result<Bytes, E> {
        Ok(Bytes(bytes.to_vec()))
    }

    fn visit_byte_buf<E: de::Error>(self, bytes: Vec<u8>) -> std::result::Result<Bytes, E> {
        Ok(Bytes(bytes))
    }

    fn visit_seq<A: de::SeqAccess<'de>>(self, mut seq: A) -> std::result::Result<Bytes, A::Error> {
        let mut bytes = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(byte) = seq.next_element()? {
            bytes.push(byte);
        }
        Ok(Bytes(bytes))
    }
}

impl<'de> Deserialize<'de> for Bytes {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        deserializer.deserialize_byte_buf(BytesVisitor)
    }
}

/// Kind of set an operand is encoded as.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SetKind {
    /// String set.
    String,
    /// Number set.
    Number,
    /// Binary set.
    Binary,
}

/// Encode a native value into an attribute value.
///
/// Scalars become strings, numbers or binaries; structs and maps become maps; sequences become
/// lists.
pub fn encode<T: Serialize>(value: T) -> Result<types::AttributeValue> {
    let value = to_attribute_value(value)?;
    Ok(value)
}

/// Encode a native value into an item.
pub fn encode_item<T: Serialize>(
    value: T,
) -> Result<collections::HashMap<String, types::AttributeValue>> {
    let item = to_item(value)?;
    Ok(item)
}

fn string_element(value: types::AttributeValue) -> Option<String> {
    match value {
        types::AttributeValue::S(string) => Some(string),
        _ => None,
    }
}

fn number_element(value: types::AttributeValue) -> Option<String> {
    match value {
        types::AttributeValue::N(number) => Some(number),
        _ => None,
    }
}

fn byte_list(list: &[types::AttributeValue]) -> Option<Vec<u8>> {
    list.iter()
        .map(|value| match value {
            types::AttributeValue::N(number) => number.parse::<u8>().ok(),
            _ => None,
        })
        .collect()
}

fn binary_element(value: types::AttributeValue) -> Option<Blob> {
    match value {
        types::AttributeValue::B(blob) => Some(blob),
        types::AttributeValue::L(list) => byte_list(&list).map(Blob::new),
        _ => None,
    }
}

fn set_elements<E: PartialEq>(
    elements: Vec<types::AttributeValue>,
    kind: SetKind,
    convert: impl Fn(types::AttributeValue) -> Option<E>,
) -> Result<Vec<E>> {
    if elements.is_empty() {
        return Err(Error::Encoding(format!("empty {kind:?} set")));
    }
    let mut set: Vec<E> = Vec::with_capacity(elements.len());
    for (position, element) in elements.into_iter().enumerate() {
        let element = convert(element).ok_or_else(|| {
            Error::Encoding(format!(
                "element {position} does not match the {kind:?} set kind"
            ))
        })?;
        if !set.contains(&element) {
            set.push(element);
        }
    }
    Ok(set)
}

/// Encode a native value as a set of the given kind.
///
/// A scalar becomes a singleton set, a homogeneous sequence becomes a set, and for
/// [`SetKind::Binary`] a sequence of byte sequences becomes one element per inner sequence.
/// Elements that do not match `kind` are rejected rather than producing a mixed set.
///
/// ```rust
/// use aws_sdk_dynamodb::types::AttributeValue;
/// use dynamodb_access::common::codec;
///
/// let set = codec::encode_as_set(vec!["a", "b"], codec::SetKind::String).unwrap();
/// assert_eq!(set, AttributeValue::Ss(vec!["a".to_string(), "b".to_string()]));
/// assert!(codec::encode_as_set(("a", 1), codec::SetKind::String).is_err());
/// ```
pub fn encode_as_set<T: Serialize>(value: T, kind: SetKind) -> Result<types::AttributeValue> {
    let encoded = to_attribute_value(value)?;
    let elements = match (encoded, kind) {
        // a flat list of bytes is a single binary, not a set of numbers
        (types::AttributeValue::L(list), SetKind::Binary)
            if !list.is_empty() && byte_list(&list).is_some() =>
        {
            vec![types::AttributeValue::L(list)]
        }
        (types::AttributeValue::L(list), _) => list,
        (types::AttributeValue::Ss(set), SetKind::String) => {
            set.into_iter().map(types::AttributeValue::S).collect()
        }
        (types::AttributeValue::Ns(set), SetKind::Number) => {
            set.into_iter().map(types::AttributeValue::N).collect()
        }
        (types::AttributeValue::Bs(set), SetKind::Binary) => {
            set.into_iter().map(types::AttributeValue::B).collect()
        }
        (scalar, _) => vec![scalar],
    };
    let set = match kind {
        SetKind::String => types::AttributeValue::Ss(set_elements(elements, kind, string_element)?),
        SetKind::Number => types::AttributeValue::Ns(set_elements(elements, kind, number_element)?),
        SetKind::Binary => types::AttributeValue::Bs(set_elements(elements, kind, binary_element)?),
    };
    Ok(set)
}

/// Decode an attribute value into the generic value tree.
pub fn decode(value: types::AttributeValue) -> Result<Value> {
    let value = match value {
        types::AttributeValue::Null(_) => Value::Null,
        types::AttributeValue::Bool(boolean) => Value::Bool(boolean),
        types::AttributeValue::N(number) => Value::Number(number),
        types::AttributeValue::S(string) => Value::String(string),
        types::AttributeValue::B(blob) => Value::Binary(blob.into_inner()),
        types::AttributeValue::L(list) => {
            Value::List(list.into_iter().map(decode).collect::<Result<_>>()?)
        }
        types::AttributeValue::M(map) => Value::Map(decode_item(map)?),
        types::AttributeValue::Ss(set) => Value::StringSet(set),
        types::AttributeValue::Ns(set) => Value::NumberSet(set),
        types::AttributeValue::Bs(set) => {
            Value::BinarySet(set.into_iter().map(Blob::into_inner).collect())
        }
        other => return Err(Error::Decode(format!("unsupported attribute value {other:?}"))),
    };
    Ok(value)
}

/// Decode an item into a map of generic values.
pub fn decode_item(
    item: collections::HashMap<String, types::AttributeValue>,
) -> Result<collections::BTreeMap<String, Value>> {
    item.into_iter()
        .map(|(name, value)| Ok((name, decode(value)?)))
        .collect()
}

/// Decode an attribute value into a native type.
pub fn decode_as<T: de::DeserializeOwned>(value: types::AttributeValue) -> Result<T> {
    from_attribute_value(value).map_err(|error| Error::Decode(error.to_string()))
}

/// Decode an item into a native type.
pub fn decode_item_as<T: de::DeserializeOwned>(
    item: collections::HashMap<String, types::AttributeValue>,
) -> Result<T> {
    from_item(item).map_err(|error| Error::Decode(error.to_string()))
}
