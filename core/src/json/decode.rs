//! `serde::Deserializer` over a parsed `serde_json::Value` that reverses the
//! [`SerializerOptions`] policy.
//!
//! `deserialize_struct` is told the Rust field names, so incoming keys are
//! matched against the wire name of each field and handed to the visitor under
//! the field's own name. Every other object (maps, untyped documents) keeps its
//! keys untouched, and only null struct fields are skipped.

use serde::de::value::StringDeserializer;
use serde::de::{self, DeserializeSeed, Deserializer as _, Unexpected, Visitor};
use serde_json::{Error, Map, Value};

use super::wire_name;
use crate::options::SerializerOptions;

pub(super) struct Decoder {
    value: Value,
    options: SerializerOptions,
}

impl Decoder {
    pub(super) fn new(value: Value, options: SerializerOptions) -> Self {
        Self { value, options }
    }
}

impl<'de> de::Deserializer<'de> for Decoder {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_unit(),
            Value::Bool(b) => visitor.visit_bool(b),
            Value::Number(n) => n.deserialize_any(visitor),
            Value::String(s) => visitor.visit_string(s),
            Value::Array(items) => visit_array(items, self.options, visitor),
            Value::Object(object) => {
                let entries: Vec<_> = object.into_iter().collect();
                visitor.visit_map(MapDecoder::new(entries, self.options))
            }
        }
    }

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Null => visitor.visit_none(),
            _ => visitor.visit_some(self),
        }
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_struct<V>(
        self,
        _name: &'static str,
        fields: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::Object(object) => {
                let entries = struct_entries(object, fields, &self.options);
                visitor.visit_map(MapDecoder::new(entries, self.options))
            }
            Value::Array(items) => visit_array(items, self.options, visitor),
            other => Err(de::Error::invalid_type(unexpected(&other), &visitor)),
        }
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        match self.value {
            Value::String(variant) => visitor.visit_enum(StringDeserializer::<Error>::new(variant)),
            Value::Object(object) => {
                let mut entries = object.into_iter();
                match (entries.next(), entries.next()) {
                    (Some((variant, value)), None) => visitor.visit_enum(EnumDecoder {
                        variant,
                        value,
                        options: self.options,
                    }),
                    _ => Err(de::Error::invalid_value(
                        Unexpected::Map,
                        &"map with a single key",
                    )),
                }
            }
            other => Err(de::Error::invalid_type(unexpected(&other), &"string or map")),
        }
    }

    serde::forward_to_deserialize_any! {
        bool i8 i16 i32 i64 i128 u8 u16 u32 u64 u128 f32 f64 char str string
        bytes byte_buf unit unit_struct seq tuple tuple_struct map identifier
        ignored_any
    }
}

fn visit_array<'de, V>(items: Vec<Value>, options: SerializerOptions, visitor: V) -> Result<V::Value, Error>
where
    V: Visitor<'de>,
{
    let len = items.len();
    let mut seq = SeqDecoder {
        items: items.into_iter(),
        options,
    };
    let value = visitor.visit_seq(&mut seq)?;
    if seq.items.as_slice().is_empty() {
        Ok(value)
    } else {
        Err(de::Error::invalid_length(len, &"fewer elements in array"))
    }
}

/// Map wire keys back to the struct's field names, dropping null fields when
/// the options say so. Unknown keys pass through unchanged.
fn struct_entries(
    object: Map<String, Value>,
    fields: &'static [&'static str],
    options: &SerializerOptions,
) -> Vec<(String, Value)> {
    let names: Vec<_> = fields
        .iter()
        .map(|field| (wire_name(options, field), *field))
        .collect();
    object
        .into_iter()
        .filter(|(_, value)| !(options.ignore_null_values && value.is_null()))
        .map(|(key, value)| {
            let key = names
                .iter()
                .find(|(wire, _)| *wire == key)
                .map_or(key, |(_, field)| (*field).to_owned());
            (key, value)
        })
        .collect()
}

fn unexpected(value: &Value) -> Unexpected<'_> {
    match value {
        Value::Null => Unexpected::Unit,
        Value::Bool(b) => Unexpected::Bool(*b),
        Value::Number(_) => Unexpected::Other("number"),
        Value::String(s) => Unexpected::Str(s),
        Value::Array(_) => Unexpected::Seq,
        Value::Object(_) => Unexpected::Map,
    }
}

struct SeqDecoder {
    items: std::vec::IntoIter<Value>,
    options: SerializerOptions,
}

impl<'de> de::SeqAccess<'de> for SeqDecoder {
    type Error = Error;

    fn next_element_seed<T>(&mut self, seed: T) -> Result<Option<T::Value>, Error>
    where
        T: DeserializeSeed<'de>,
    {
        match self.items.next() {
            Some(value) => seed.deserialize(Decoder::new(value, self.options)).map(Some),
            None => Ok(None),
        }
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.items.len())
    }
}

struct MapDecoder {
    entries: std::vec::IntoIter<(String, Value)>,
    pending: Option<Value>,
    options: SerializerOptions,
}

impl MapDecoder {
    fn new(entries: Vec<(String, Value)>, options: SerializerOptions) -> Self {
        Self {
            entries: entries.into_iter(),
            pending: None,
            options,
        }
    }
}

impl<'de> de::MapAccess<'de> for MapDecoder {
    type Error = Error;

    fn next_key_seed<K>(&mut self, seed: K) -> Result<Option<K::Value>, Error>
    where
        K: DeserializeSeed<'de>,
    {
        match self.entries.next() {
            Some((key, value)) => {
                self.pending = Some(value);
                seed.deserialize(MapKey(key)).map(Some)
            }
            None => Ok(None),
        }
    }

    fn next_value_seed<V>(&mut self, seed: V) -> Result<V::Value, Error>
    where
        V: DeserializeSeed<'de>,
    {
        let value = self
            .pending
            .take()
            .ok_or_else(|| <Error as de::Error>::custom("map value requested before its key"))?;
        seed.deserialize(Decoder::new(value, self.options))
    }

    fn size_hint(&self) -> Option<usize> {
        Some(self.entries.len())
    }
}

/// Object key. Numeric and boolean keys are parsed back from their string
/// form, matching what the encoder writes.
struct MapKey(String);

macro_rules! parse_key {
    ($($method:ident => $visit:ident),* $(,)?) => {
        $(
            fn $method<V>(self, visitor: V) -> Result<V::Value, Error>
            where
                V: Visitor<'de>,
            {
                match self.0.parse() {
                    Ok(parsed) => visitor.$visit(parsed),
                    Err(_) => visitor.visit_string(self.0),
                }
            }
        )*
    };
}

impl<'de> de::Deserializer<'de> for MapKey {
    type Error = Error;

    fn deserialize_any<V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_string(self.0)
    }

    parse_key!(
        deserialize_bool => visit_bool,
        deserialize_i8 => visit_i8,
        deserialize_i16 => visit_i16,
        deserialize_i32 => visit_i32,
        deserialize_i64 => visit_i64,
        deserialize_i128 => visit_i128,
        deserialize_u8 => visit_u8,
        deserialize_u16 => visit_u16,
        deserialize_u32 => visit_u32,
        deserialize_u64 => visit_u64,
        deserialize_u128 => visit_u128,
    );

    fn deserialize_option<V>(self, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_some(self)
    }

    fn deserialize_newtype_struct<V>(self, _name: &'static str, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_newtype_struct(self)
    }

    fn deserialize_enum<V>(
        self,
        _name: &'static str,
        _variants: &'static [&'static str],
        visitor: V,
    ) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        visitor.visit_enum(StringDeserializer::<Error>::new(self.0))
    }

    serde::forward_to_deserialize_any! {
        f32 f64 char str string bytes byte_buf unit unit_struct seq tuple
        tuple_struct map struct identifier ignored_any
    }
}

struct EnumDecoder {
    variant: String,
    value: Value,
    options: SerializerOptions,
}

impl<'de> de::EnumAccess<'de> for EnumDecoder {
    type Error = Error;
    type Variant = VariantDecoder;

    fn variant_seed<V>(self, seed: V) -> Result<(V::Value, VariantDecoder), Error>
    where
        V: DeserializeSeed<'de>,
    {
        let variant = seed.deserialize(StringDeserializer::<Error>::new(self.variant))?;
        Ok((
            variant,
            VariantDecoder {
                value: self.value,
                options: self.options,
            },
        ))
    }
}

struct VariantDecoder {
    value: Value,
    options: SerializerOptions,
}

impl<'de> de::VariantAccess<'de> for VariantDecoder {
    type Error = Error;

    fn unit_variant(self) -> Result<(), Error> {
        match self.value {
            Value::Null => Ok(()),
            other => Err(de::Error::invalid_type(unexpected(&other), &"unit variant")),
        }
    }

    fn newtype_variant_seed<T>(self, seed: T) -> Result<T::Value, Error>
    where
        T: DeserializeSeed<'de>,
    {
        seed.deserialize(Decoder::new(self.value, self.options))
    }

    fn tuple_variant<V>(self, _len: usize, visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        Decoder::new(self.value, self.options).deserialize_seq(visitor)
    }

    fn struct_variant<V>(self, fields: &'static [&'static str], visitor: V) -> Result<V::Value, Error>
    where
        V: Visitor<'de>,
    {
        Decoder::new(self.value, self.options).deserialize_struct("", fields, visitor)
    }
}
