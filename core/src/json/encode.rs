//! `serde::Serializer` that builds a `serde_json::Value` under a
//! [`SerializerOptions`] policy.
//!
//! Only struct field names go through the naming policy, and only null struct
//! fields are dropped. Map keys, enum variant names and array elements are
//! emitted exactly as serde hands them over.

use serde::ser::{self, Serialize, Serializer as _};
use serde_json::{Error, Map, Value};

use super::wire_name;
use crate::options::SerializerOptions;

#[derive(Clone, Copy)]
pub(super) struct Encoder {
    pub(super) options: SerializerOptions,
}

macro_rules! delegate_primitive {
    ($($method:ident($ty:ty)),* $(,)?) => {
        $(
            fn $method(self, v: $ty) -> Result<Value, Error> {
                ser::Serializer::$method(serde_json::value::Serializer, v)
            }
        )*
    };
}

impl ser::Serializer for Encoder {
    type Ok = Value;
    type Error = Error;

    type SerializeSeq = SeqEncoder;
    type SerializeTuple = SeqEncoder;
    type SerializeTupleStruct = SeqEncoder;
    type SerializeTupleVariant = TupleVariantEncoder;
    type SerializeMap = MapEncoder;
    type SerializeStruct = StructEncoder;
    type SerializeStructVariant = StructVariantEncoder;

    delegate_primitive!(
        serialize_bool(bool),
        serialize_i8(i8),
        serialize_i16(i16),
        serialize_i32(i32),
        serialize_i64(i64),
        serialize_i128(i128),
        serialize_u8(u8),
        serialize_u16(u16),
        serialize_u32(u32),
        serialize_u64(u64),
        serialize_u128(u128),
        serialize_f32(f32),
        serialize_f64(f64),
        serialize_char(char),
        serialize_str(&str),
        serialize_bytes(&[u8]),
    );

    fn serialize_none(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_some<T>(self, value: &T) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_unit(self) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_struct(self, _name: &'static str) -> Result<Value, Error> {
        Ok(Value::Null)
    }

    fn serialize_unit_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
    ) -> Result<Value, Error> {
        Ok(Value::String(variant.to_owned()))
    }

    fn serialize_newtype_struct<T>(self, _name: &'static str, value: &T) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        value.serialize(self)
    }

    fn serialize_newtype_variant<T>(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        value: &T,
    ) -> Result<Value, Error>
    where
        T: ?Sized + Serialize,
    {
        let mut object = Map::new();
        object.insert(variant.to_owned(), value.serialize(self)?);
        Ok(Value::Object(object))
    }

    fn serialize_seq(self, len: Option<usize>) -> Result<SeqEncoder, Error> {
        Ok(SeqEncoder {
            items: Vec::with_capacity(len.unwrap_or(0)),
            options: self.options,
        })
    }

    fn serialize_tuple(self, len: usize) -> Result<SeqEncoder, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_struct(self, _name: &'static str, len: usize) -> Result<SeqEncoder, Error> {
        self.serialize_seq(Some(len))
    }

    fn serialize_tuple_variant(
        self,
        _name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<TupleVariantEncoder, Error> {
        Ok(TupleVariantEncoder {
            variant,
            items: self.serialize_seq(Some(len))?,
        })
    }

    fn serialize_map(self, _len: Option<usize>) -> Result<MapEncoder, Error> {
        Ok(MapEncoder {
            entries: Map::new(),
            next_key: None,
            options: self.options,
        })
    }

    fn serialize_struct(self, _name: &'static str, _len: usize) -> Result<StructEncoder, Error> {
        Ok(StructEncoder {
            fields: Map::new(),
            options: self.options,
        })
    }

    fn serialize_struct_variant(
        self,
        name: &'static str,
        _variant_index: u32,
        variant: &'static str,
        len: usize,
    ) -> Result<StructVariantEncoder, Error> {
        Ok(StructVariantEncoder {
            variant,
            fields: self.serialize_struct(name, len)?,
        })
    }
}

pub(super) struct SeqEncoder {
    items: Vec<Value>,
    options: SerializerOptions,
}

impl ser::SerializeSeq for SeqEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        let encoder = Encoder {
            options: self.options,
        };
        self.items.push(value.serialize(encoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Array(self.items))
    }
}

impl ser::SerializeTuple for SeqEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_element<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Error> {
        ser::SerializeSeq::end(self)
    }
}

impl ser::SerializeTupleStruct for SeqEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(self, value)
    }

    fn end(self) -> Result<Value, Error> {
        ser::SerializeSeq::end(self)
    }
}

pub(super) struct TupleVariantEncoder {
    variant: &'static str,
    items: SeqEncoder,
}

impl ser::SerializeTupleVariant for TupleVariantEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeSeq::serialize_element(&mut self.items, value)
    }

    fn end(self) -> Result<Value, Error> {
        let mut object = Map::new();
        object.insert(self.variant.to_owned(), ser::SerializeSeq::end(self.items)?);
        Ok(Value::Object(object))
    }
}

pub(super) struct MapEncoder {
    entries: Map<String, Value>,
    next_key: Option<String>,
    options: SerializerOptions,
}

impl ser::SerializeMap for MapEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_key<T>(&mut self, key: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        let encoder = Encoder {
            options: self.options,
        };
        self.next_key = Some(map_key(key.serialize(encoder)?)?);
        Ok(())
    }

    fn serialize_value<T>(&mut self, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        let key = self
            .next_key
            .take()
            .ok_or_else(|| <Error as ser::Error>::custom("map value serialized before its key"))?;
        let encoder = Encoder {
            options: self.options,
        };
        self.entries.insert(key, value.serialize(encoder)?);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.entries))
    }
}

/// JSON object keys are strings; numbers and booleans are stringified the way
/// `serde_json` does it.
fn map_key(key: Value) -> Result<String, Error> {
    match key {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        _ => Err(ser::Error::custom("map key must be a string, number or bool")),
    }
}

pub(super) struct StructEncoder {
    fields: Map<String, Value>,
    options: SerializerOptions,
}

impl ser::SerializeStruct for StructEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        let encoder = Encoder {
            options: self.options,
        };
        let value = value.serialize(encoder)?;
        if value.is_null() && self.options.ignore_null_values {
            return Ok(());
        }
        self.fields
            .insert(wire_name(&self.options, key).into_owned(), value);
        Ok(())
    }

    fn end(self) -> Result<Value, Error> {
        Ok(Value::Object(self.fields))
    }
}

pub(super) struct StructVariantEncoder {
    variant: &'static str,
    fields: StructEncoder,
}

impl ser::SerializeStructVariant for StructVariantEncoder {
    type Ok = Value;
    type Error = Error;

    fn serialize_field<T>(&mut self, key: &'static str, value: &T) -> Result<(), Error>
    where
        T: ?Sized + Serialize,
    {
        ser::SerializeStruct::serialize_field(&mut self.fields, key, value)
    }

    fn end(self) -> Result<Value, Error> {
        let mut object = Map::new();
        object.insert(self.variant.to_owned(), ser::SerializeStruct::end(self.fields)?);
        Ok(Value::Object(object))
    }
}
