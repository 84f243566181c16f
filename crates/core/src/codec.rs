//! Canonical value codec
//!
//! Every value that crosses the facade boundary goes through this module.
//! The store holds text only, so writes encode and reads decode:
//!
//! - Values that serialize to a plain string (`&str`, `String`, unit enum
//!   variants, string newtypes, timestamps) are stored verbatim. Encoding
//!   text is the identity; nothing is re-quoted.
//! - Every other value is stored as JSON.
//!
//! ## Decoding
//!
//! Decoding is driven by the target type through [`TextDeserializer`]:
//! targets that ask for a string receive the raw text, everything else is
//! parsed as JSON. This keeps `decode::<T>(&encode(&v)?)? == v` for every
//! target whose `Deserialize` impl names the shape it expects, without
//! inspecting types at runtime. Unknown struct fields are ignored, so stored
//! values survive schema evolution in both directions.
//!
//! ## Self-describing targets
//!
//! Text is stored without quotes, so the text `42` cannot record whether it
//! came from the number or the string. Targets that decode through
//! `deserialize_any` see the JSON reading whenever the text is valid JSON:
//!
//! - `serde_json::Value::String("42")` decodes as `Value::Number(42)`
//! - `#[serde(untagged)]` enums pick the first variant matching the JSON
//!   reading, so a string payload of `"7"` lands in a numeric variant
//!
//! Option targets have the same gap: the text `null` means `None`, so
//! `Some("null".to_string())` as `Option<String>` decodes as `None`.
//!
//! Use concrete field types or tagged enums for values that may hold
//! number-like text.
//!
//! Absent input (`None`) decodes to `None` and is never an error.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use serde::de::{self, DeserializeOwned, IntoDeserializer, Visitor};
use serde::{Deserializer, Serialize};
use serde_json::Value as JsonValue;

use crate::error::{Error, Result};

// =============================================================================
// Encoding
// =============================================================================

/// Encode a value to its text representation
///
/// # Errors
///
/// Returns `EncodingError` if the value cannot be represented, e.g. a map
/// whose keys do not serialize to strings.
///
/// # Example
///
/// ```
/// use typedkv_core::codec::encode;
///
/// assert_eq!(encode("abc").unwrap(), "abc");
/// assert_eq!(encode(&42).unwrap(), "42");
/// assert_eq!(encode(&vec![1, 2]).unwrap(), "[1,2]");
/// ```
pub fn encode<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    match serde_json::to_value(value) {
        Ok(JsonValue::String(text)) => Ok(text),
        Ok(other) => Ok(other.to_string()),
        Err(e) => Err(Error::EncodingError(e.to_string())),
    }
}

/// Encode every element, preserving order
pub fn encode_all<I>(values: I) -> Result<Vec<String>>
where
    I: IntoIterator,
    I::Item: Serialize,
{
    values.into_iter().map(|v| encode(&v)).collect()
}

/// Encode both key and value of every entry
pub fn encode_pairs<I, K, V>(entries: I) -> Result<Vec<(String, String)>>
where
    I: IntoIterator<Item = (K, V)>,
    K: Serialize,
    V: Serialize,
{
    entries
        .into_iter()
        .map(|(k, v)| Ok((encode(&k)?, encode(&v)?)))
        .collect()
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode text into `T`
///
/// # Errors
///
/// Returns `DecodingError` if the text cannot be parsed as `T`.
///
/// # Example
///
/// ```
/// use typedkv_core::codec::decode;
///
/// let n: i64 = decode("15").unwrap();
/// assert_eq!(n, 15);
///
/// let s: String = decode("plain text").unwrap();
/// assert_eq!(s, "plain text");
/// ```
pub fn decode<T: DeserializeOwned>(text: &str) -> Result<T> {
    T::deserialize(TextDeserializer::new(text)).map_err(decoding_error::<T>)
}

/// Decode optional text; `None` stays `None`
pub fn decode_opt<T: DeserializeOwned>(text: Option<String>) -> Result<Option<T>> {
    text.as_deref().map(decode).transpose()
}

/// Decode every element, preserving order
pub fn decode_all<T, I>(texts: I) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    texts.into_iter().map(|t| decode(t.as_ref())).collect()
}

/// Decode element-wise; `None` elements stay `None` in place
pub fn decode_each<T, I>(texts: I) -> Result<Vec<Option<T>>>
where
    T: DeserializeOwned,
    I: IntoIterator<Item = Option<String>>,
{
    texts.into_iter().map(decode_opt).collect()
}

/// Decode a collection of members into a set
pub fn decode_set<T, I>(texts: I) -> Result<HashSet<T>>
where
    T: DeserializeOwned + Eq + Hash,
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    texts.into_iter().map(|t| decode(t.as_ref())).collect()
}

/// Decode field/value pairs into a map
pub fn decode_map<K, V, I>(entries: I) -> Result<HashMap<K, V>>
where
    K: DeserializeOwned + Eq + Hash,
    V: DeserializeOwned,
    I: IntoIterator<Item = (String, String)>,
{
    entries
        .into_iter()
        .map(|(k, v)| Ok((decode(&k)?, decode(&v)?)))
        .collect()
}

fn decoding_error<T>(e: serde_json::Error) -> Error {
    let target = std::any::type_name::<T>();
    tracing::debug!(target: "typedkv::codec", target_type = target, error = %e, "Decoding failed");
    Error::DecodingError {
        target,
        message: e.to_string(),
    }
}

// =============================================================================
// TextDeserializer
// =============================================================================

/// Deserializer over a stored text value
///
/// String-shaped requests (`str`, `string`, `identifier`, newtype wrappers,
/// unit enum variants) see the raw text. All other requests are answered
/// by parsing the text as JSON. `deserialize_any` parses JSON when the text
/// is valid JSON and falls back to the raw text otherwise.
#[derive(Debug, Clone, Copy)]
pub struct TextDeserializer<'de> {
    text: &'de str,
}

impl<'de> TextDeserializer<'de> {
    /// Wrap stored text
    pub fn new(text: &'de str) -> Self {
        Self { text }
    }

    fn json(&self) -> serde_json::Deserializer<serde_json::de::StrRead<'de>> {
        serde_json::Deserializer::from_str(self.text)
    }

    fn is_json(&self) -> bool {
        serde_json::from_str::<de::IgnoredAny>(self.text).is_ok()
    }
}

macro_rules! forward_to_json {
    ($($method:ident)*) => {
        $(
            fn $method<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
            where
                V: Visitor<'de>,
            {
                let mut de = self.json();
                let value = (&mut de).$method(visitor)?;
                de.end()?;
                Ok(value)
            }
        )*
    };
}

impl<'de> Deserializer<'de> for TextDeserializer<'de> {
    type Error = serde_json::Error;

    fn deserialize_any<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.is_json() {
            let mut de = self.json();
            let value = (&mut de).deserialize_any(visitor)?;
            de.end()?;
            Ok(value)
        } else {
            visitor.visit_borrowed_str(self.text)
        }
    }

    forward_to_json! {
        deserialize_bool
        deserialize_i8 deserialize_i16 deserialize_i32 deserialize_i64 deserialize_i128
        deserialize_u8 deserialize_u16 deserialize_u32 deserialize_u64 deserialize_u128
        deserialize_f32 deserialize_f64
        deserialize_bytes deserialize_byte_buf
        deserialize_unit deserialize_seq deserialize_map
        deserialize_ignored_any
    }

    fn deserialize_char<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let mut chars = self.text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => visitor.visit_char(c),
            _ => {
                let mut de = self.json();
                let value = (&mut de).deserialize_char(visitor)?;
                de.end()?;
                Ok(value)
            }
        }
    }

    fn deserialize_str<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text)
    }

    fn deserialize_string<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text)
    }

    fn deserialize_identifier<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_borrowed_str(self.text)
    }

    fn deserialize_option<V>(self, visitor: V) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.text == "null" {
            visitor.visit_none()
        } else {
            visitor.visit_some(self)
        }
    }

    fn deserialize_newtype_struct<V>(
        self,
        _name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_unit_struct<V>(
        self,
        name: &'static str,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let mut de = self.json();
        let value = (&mut de).deserialize_unit_struct(name, visitor)?;
        de.end()?;
        Ok(value)
    }

    fn deserialize_tuple<V>(
        self,
        len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let mut de = self.json();
        let value = (&mut de).deserialize_tuple(len, visitor)?;
        de.end()?;
        Ok(value)
    }

    fn deserialize_tuple_struct<V>(
        self,
        name: &'static str,
        len: usize,
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let mut de = self.json();
        let value = (&mut de).deserialize_tuple_struct(name, len, visitor)?;
        de.end()?;
        Ok(value)
    }

    fn deserialize_struct<V>(
        self,
        name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        let mut de = self.json();
        let value = (&mut de).deserialize_struct(name, fields, visitor)?;
        de.end()?;
        Ok(value)
    }

    fn deserialize_enum<V>(
        self,
        name: &'static str,
        variants: &'static [&'static str],
        visitor: V,
    ) -> std::result::Result<V::Value, Self::Error>
    where
        V: Visitor<'de>,
    {
        if self.is_json() {
            let mut de = self.json();
            let value = (&mut de).deserialize_enum(name, variants, visitor)?;
            de.end()?;
            Ok(value)
        } else {
            // Unit variants are stored as their bare name
            visitor.visit_enum(IntoDeserializer::<'de, serde_json::Error>::into_deserializer(
                self.text,
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::BTreeMap;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: u64,
        name: String,
        tags: Vec<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct UserV1 {
        id: u64,
        name: String,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    enum Status {
        Active,
        Suspended,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Shape {
        Circle { radius: f64 },
        Unit,
    }

    #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
    struct SessionId(String);

    fn user() -> User {
        User {
            id: 7,
            name: "Alice".to_string(),
            tags: vec!["admin".to_string()],
        }
    }

    #[test]
    fn test_encode_text_is_identity() {
        assert_eq!(encode("abc").unwrap(), "abc");
        assert_eq!(encode(&"abc".to_string()).unwrap(), "abc");
        assert_eq!(encode("").unwrap(), "");
        assert_eq!(encode("\"already quoted\"").unwrap(), "\"already quoted\"");
    }

    #[test]
    fn test_encode_structured_is_json() {
        assert_eq!(encode(&42i64).unwrap(), "42");
        assert_eq!(encode(&true).unwrap(), "true");
        assert_eq!(
            encode(&user()).unwrap(),
            r#"{"id":7,"name":"Alice","tags":["admin"]}"#
        );
    }

    #[test]
    fn test_encode_unit_variant_and_newtype_as_text() {
        assert_eq!(encode(&Status::Active).unwrap(), "Active");
        assert_eq!(encode(&SessionId("s-1".into())).unwrap(), "s-1");
    }

    #[test]
    fn test_encode_rejects_non_string_map_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "pair");
        let err = encode(&map).unwrap_err();
        assert!(matches!(err, Error::EncodingError(_)));
    }

    #[test]
    fn test_encode_all_preserves_order() {
        assert_eq!(encode_all([3, 1, 2]).unwrap(), vec!["3", "1", "2"]);
        assert!(encode_all(Vec::<i32>::new()).unwrap().is_empty());
    }

    #[test]
    fn test_encode_pairs_encodes_keys_and_values() {
        let pairs = encode_pairs(vec![(1, "one"), (2, "two")]).unwrap();
        assert_eq!(
            pairs,
            vec![
                ("1".to_string(), "one".to_string()),
                ("2".to_string(), "two".to_string())
            ]
        );
    }

    #[test]
    fn test_decode_struct_round_trip() {
        let text = encode(&user()).unwrap();
        let back: User = decode(&text).unwrap();
        assert_eq!(back, user());
    }

    #[test]
    fn test_decode_ignores_unknown_fields() {
        let text = encode(&user()).unwrap();
        let old: UserV1 = decode(&text).unwrap();
        assert_eq!(old.id, 7);
        assert_eq!(old.name, "Alice");
    }

    #[test]
    fn test_decode_text_targets_get_raw_text() {
        let s: String = decode("123").unwrap();
        assert_eq!(s, "123");
        let s: String = decode("\"quoted\"").unwrap();
        assert_eq!(s, "\"quoted\"");
        let s: String = decode("").unwrap();
        assert_eq!(s, "");
    }

    #[test]
    fn test_decode_numbers() {
        let n: i64 = decode("-12").unwrap();
        assert_eq!(n, -12);
        let f: f64 = decode("2.5").unwrap();
        assert_eq!(f, 2.5);
        let err = decode::<u32>("not a number").unwrap_err();
        match err {
            Error::DecodingError { target, .. } => assert_eq!(target, "u32"),
            other => panic!("Wrong error variant: {:?}", other),
        }
    }

    #[test]
    fn test_decode_enums() {
        let status: Status = decode("Suspended").unwrap();
        assert_eq!(status, Status::Suspended);

        let shape = Shape::Circle { radius: 1.5 };
        let back: Shape = decode(&encode(&shape).unwrap()).unwrap();
        assert_eq!(back, shape);
        let unit: Shape = decode(&encode(&Shape::Unit).unwrap()).unwrap();
        assert_eq!(unit, Shape::Unit);
    }

    #[test]
    fn test_decode_newtype_and_char() {
        let id: SessionId = decode("s-9").unwrap();
        assert_eq!(id, SessionId("s-9".into()));
        let c: char = decode("x").unwrap();
        assert_eq!(c, 'x');
    }

    #[test]
    fn test_decode_option_target() {
        let none: Option<i32> = decode("null").unwrap();
        assert_eq!(none, None);
        let some: Option<i32> = decode("5").unwrap();
        assert_eq!(some, Some(5));
    }

    #[test]
    fn test_decode_dynamic_json_value() {
        let obj: JsonValue = decode(r#"{"a":1}"#).unwrap();
        assert_eq!(obj["a"], 1);
        let text: JsonValue = decode("plain").unwrap();
        assert_eq!(text, JsonValue::String("plain".into()));
    }

    #[test]
    fn test_decode_trailing_garbage_fails() {
        assert!(decode::<i64>("12 13").is_err());
        assert!(decode::<Vec<i32>>("[1,2]x").is_err());
    }

    #[test]
    fn test_decode_opt_absent_is_none() {
        let v: Option<User> = decode_opt(None).unwrap();
        assert!(v.is_none());
    }

    #[test]
    fn test_decode_each_keeps_nones_in_place() {
        let decoded: Vec<Option<i32>> =
            decode_each(vec![Some("1".to_string()), None, Some("3".to_string())]).unwrap();
        assert_eq!(decoded, vec![Some(1), None, Some(3)]);
    }

    #[test]
    fn test_decode_set_and_map() {
        let set: HashSet<Status> = decode_set(["Active", "Suspended"]).unwrap();
        assert_eq!(set.len(), 2);

        let map: HashMap<u32, Vec<bool>> = decode_map(vec![
            ("1".to_string(), "[true]".to_string()),
            ("2".to_string(), "[]".to_string()),
        ])
        .unwrap();
        assert_eq!(map[&1], vec![true]);
        assert!(map[&2].is_empty());
    }

    #[test]
    fn test_map_value_round_trip() {
        let mut map = BTreeMap::new();
        map.insert("x".to_string(), vec![1u8, 2]);
        let back: BTreeMap<String, Vec<u8>> = decode(&encode(&map).unwrap()).unwrap();
        assert_eq!(back, map);
    }

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    #[serde(untagged)]
    enum Id {
        Num(u64),
        Name(String),
    }

    #[test]
    fn test_self_describing_targets_read_text_as_json() {
        let text = JsonValue::String("42".to_string());
        let back: JsonValue = decode(&encode(&text).unwrap()).unwrap();
        assert_eq!(back, serde_json::json!(42));

        let plain = JsonValue::String("hello".to_string());
        let back: JsonValue = decode(&encode(&plain).unwrap()).unwrap();
        assert_eq!(back, plain);

        let back: Id = decode(&encode(&Id::Name("7".to_string())).unwrap()).unwrap();
        assert_eq!(back, Id::Num(7));
        let back: Id = decode(&encode(&Id::Name("ada".to_string())).unwrap()).unwrap();
        assert_eq!(back, Id::Name("ada".to_string()));

        let null_text = Some("null".to_string());
        let back: Option<String> = decode(&encode(&null_text).unwrap()).unwrap();
        assert_eq!(back, None);
    }
}
