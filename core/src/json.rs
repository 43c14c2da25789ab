//! JSON encoding and decoding under a [`SerializerOptions`] policy.
//!
//! # Design
//! The policy is applied inside the serde data model rather than on finished
//! JSON text. The encoder sees every struct field by its Rust name and writes
//! the policy's wire name; the decoder is handed the struct's field list, so it
//! maps wire names back exactly. Names with digits (`line_1`), fields already
//! renamed by serde (`rename_all = "camelCase"`) and everything else that is
//! not a struct field round-trip unchanged: map keys, enum variant names,
//! untyped `serde_json::Value` documents.
//!
//! With `ignore_null_values`, null struct fields are left out on encode and
//! skipped on decode. Nulls inside arrays and maps are data and are kept.
//!
//! Flattened fields and internally tagged or untagged enums are decoded by
//! serde from buffered maps, which cannot be renamed. Under
//! [`NamingPolicy::CamelCase`] those types must already carry camelCase names
//! (`rename_all = "camelCase"` makes the rename a no-op both ways), or use
//! [`NamingPolicy::Preserve`].

mod decode;
mod encode;

use std::borrow::Cow;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{ApiError, Result};
use crate::options::{NamingPolicy, SerializerOptions};

/// Encode `value` as compact UTF-8 JSON.
///
/// A value that serializes to JSON `null` (e.g. `None`) is rejected as a
/// missing request payload.
pub fn to_vec<T>(value: &T, options: &SerializerOptions) -> Result<Vec<u8>>
where
    T: Serialize + ?Sized,
{
    let value = to_value(value, options)?;
    serde_json::to_vec(&value).map_err(ApiError::Serialization)
}

/// Encode `value` into a `serde_json::Value` with the policy applied.
pub fn to_value<T>(value: &T, options: &SerializerOptions) -> Result<Value>
where
    T: Serialize + ?Sized,
{
    let value = if is_passthrough(options) {
        serde_json::to_value(value)
    } else {
        value.serialize(encode::Encoder { options: *options })
    }
    .map_err(ApiError::Serialization)?;
    if value.is_null() {
        return Err(ApiError::null_request());
    }
    Ok(value)
}

/// Decode `bytes` into `T`.
///
/// Errors from serde are returned untouched inside
/// [`ApiError::Deserialization`]; an empty body is an EOF error.
pub fn from_slice<T>(bytes: &[u8], options: &SerializerOptions) -> Result<T>
where
    T: DeserializeOwned,
{
    if is_passthrough(options) {
        return serde_json::from_slice(bytes).map_err(ApiError::Deserialization);
    }
    let value: Value = serde_json::from_slice(bytes).map_err(ApiError::Deserialization)?;
    T::deserialize(decode::Decoder::new(value, *options)).map_err(ApiError::Deserialization)
}

/// Plain serde_json already does what these options ask for.
fn is_passthrough(options: &SerializerOptions) -> bool {
    options.naming_policy == NamingPolicy::Preserve && !options.ignore_null_values
}

/// Name a struct field is written under.
fn wire_name<'a>(options: &SerializerOptions, field: &'a str) -> Cow<'a, str> {
    match options.naming_policy {
        NamingPolicy::CamelCase => Cow::Owned(to_camel_case(field)),
        NamingPolicy::Preserve => Cow::Borrowed(field),
    }
}

/// `display_name` → `displayName`, `Name` → `name`, `line_1` → `line1`.
/// Leading underscores are kept.
fn to_camel_case(field: &str) -> String {
    let trimmed = field.trim_start_matches('_');
    let mut out = String::with_capacity(field.len());
    out.push_str(&field[..field.len() - trimmed.len()]);

    let mut first = true;
    let mut upper_next = false;
    for ch in trimmed.chars() {
        if ch == '_' {
            upper_next = true;
            continue;
        }
        if first {
            out.extend(ch.to_lowercase());
            first = false;
        } else if upper_next {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        upper_next = false;
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::collections::{BTreeMap, HashMap};

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Widget {
        name: String,
        other: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Order {
        order_id: u64,
        display_name: String,
        line_items: Vec<LineItem>,
        shipping_note: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct LineItem {
        sku_code: String,
        unit_price: f64,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Address {
        line_1: String,
        line_2: Option<String>,
        zone_2b_code: u8,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        account_name: String,
        user_ids: BTreeMap<String, u32>,
        quotas: HashMap<u16, Option<u32>>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    enum Shape {
        Circle { radius_m: f64 },
        Square(f64),
        Segment(f64, f64),
        Empty,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Drawing {
        shapes: Vec<Shape>,
        fill_colour: Option<String>,
    }

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    struct Listing {
        display_name: String,
        item_count: u32,
    }

    fn order() -> Order {
        Order {
            order_id: 7,
            display_name: "Spring order".to_string(),
            line_items: vec![LineItem {
                sku_code: "A-1".to_string(),
                unit_price: 2.5,
            }],
            shipping_note: None,
        }
    }

    fn address() -> Address {
        Address {
            line_1: "1 Main St".to_string(),
            line_2: Some("Flat 2".to_string()),
            zone_2b_code: 4,
        }
    }

    fn account() -> Account {
        Account {
            account_name: "ops".to_string(),
            user_ids: BTreeMap::from([("userId".to_string(), 1), ("max_items".to_string(), 2)]),
            quotas: HashMap::from([(10, Some(5)), (20, None)]),
        }
    }

    fn drawing() -> Drawing {
        Drawing {
            shapes: vec![
                Shape::Circle { radius_m: 1.5 },
                Shape::Square(2.0),
                Shape::Segment(0.0, 3.0),
                Shape::Empty,
            ],
            fill_colour: None,
        }
    }

    fn all_policies() -> [SerializerOptions; 4] {
        [
            SerializerOptions::DEFAULT,
            SerializerOptions::DEFAULT.with_ignore_null_values(false),
            SerializerOptions::DEFAULT.with_naming_policy(NamingPolicy::Preserve),
            SerializerOptions::DEFAULT
                .with_naming_policy(NamingPolicy::Preserve)
                .with_ignore_null_values(false),
        ]
    }

    fn assert_round_trip<T>(original: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        for options in all_policies() {
            let bytes = to_vec(original, &options).unwrap();
            let back: T = from_slice(&bytes, &options).unwrap();
            assert_eq!(&back, original, "{options:?}: {}", String::from_utf8_lossy(&bytes));
        }
    }

    #[test]
    fn default_options_omit_nulls() {
        let widget = Widget {
            name: "Foo".to_string(),
            other: None,
        };
        let bytes = to_vec(&widget, &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(bytes, br#"{"name":"Foo"}"#);
    }

    #[test]
    fn nested_keys_become_camel_case() {
        let value = to_value(&order(), &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(value["orderId"], 7);
        assert_eq!(value["displayName"], "Spring order");
        assert_eq!(value["lineItems"][0]["skuCode"], "A-1");
        assert_eq!(value["lineItems"][0]["unitPrice"], 2.5);
        assert!(value.get("shippingNote").is_none());
        assert!(value.get("display_name").is_none());
    }

    #[test]
    fn nulls_kept_when_not_ignored() {
        let options = SerializerOptions::DEFAULT.with_ignore_null_values(false);
        let value = to_value(&order(), &options).unwrap();
        assert!(value["shippingNote"].is_null());
    }

    #[test]
    fn preserve_policy_leaves_keys_alone() {
        let options = SerializerOptions::DEFAULT.with_naming_policy(NamingPolicy::Preserve);
        let value = to_value(&order(), &options).unwrap();
        assert_eq!(value["display_name"], "Spring order");
        assert!(value.get("shipping_note").is_none());
    }

    #[test]
    fn array_and_map_nulls_are_kept() {
        let items: Vec<Option<u8>> = vec![Some(1), None, Some(3)];
        let mut wrapper = BTreeMap::new();
        wrapper.insert("values", items);
        let bytes = to_vec(&wrapper, &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(bytes, br#"{"values":[1,null,3]}"#);

        let value = to_value(&account(), &SerializerOptions::DEFAULT).unwrap();
        assert!(value["quotas"]["20"].is_null());
        assert_eq!(value["quotas"]["10"], 5);
    }

    #[test]
    fn null_payload_is_rejected() {
        let err = to_vec(&Option::<Widget>::None, &SerializerOptions::DEFAULT).unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument { name: "request", .. }));
        let err = to_vec(&(), &SerializerOptions::DEFAULT).unwrap_err();
        assert!(err.is_invalid_argument());
        let options = SerializerOptions::DEFAULT
            .with_naming_policy(NamingPolicy::Preserve)
            .with_ignore_null_values(false);
        assert!(to_vec(&Option::<Widget>::None, &options).unwrap_err().is_invalid_argument());
    }

    #[test]
    fn bytes_round_trip_under_each_policy() {
        let mut with_note = order();
        with_note.shipping_note = Some("leave at door".to_string());
        assert_round_trip(&order());
        assert_round_trip(&with_note);
    }

    #[test]
    fn digit_suffixed_fields_round_trip() {
        let value = to_value(&address(), &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"line1": "1 Main St", "line2": "Flat 2", "zone2bCode": 4})
        );
        assert_round_trip(&address());
        assert_round_trip(&Address {
            line_2: None,
            ..address()
        });
    }

    #[test]
    fn map_keys_are_left_alone() {
        let value = to_value(&account(), &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(value["accountName"], "ops");
        assert_eq!(value["userIds"]["userId"], 1);
        assert_eq!(value["userIds"]["max_items"], 2);
        assert!(value["userIds"].get("user_id").is_none());
        assert_round_trip(&account());
    }

    #[test]
    fn enum_variants_keep_their_names() {
        let value = to_value(&drawing(), &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "shapes": [
                    {"Circle": {"radiusM": 1.5}},
                    {"Square": 2.0},
                    {"Segment": [0.0, 3.0]},
                    "Empty"
                ]
            })
        );
        assert_round_trip(&drawing());
    }

    #[test]
    fn renamed_types_decode_with_default_options() {
        let body = br#"{"displayName":"Lamp","itemCount":3}"#;
        let listing: Listing = from_slice(body, &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(
            listing,
            Listing {
                display_name: "Lamp".to_string(),
                item_count: 3
            }
        );
        assert_eq!(to_vec(&listing, &SerializerOptions::DEFAULT).unwrap(), body);
        assert_round_trip(&listing);
    }

    #[test]
    fn untyped_documents_pass_through() {
        let document = serde_json::json!({"snake_key": 1, "camelKey": null, "items": [true, null]});
        let value = to_value(&document, &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(value, document);
        assert_round_trip(&document);
    }

    #[test]
    fn decode_accepts_camel_case_and_null_fields() {
        let body = br#"{"orderId":1,"displayName":"x","lineItems":[],"shippingNote":null}"#;
        let order: Order = from_slice(body, &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(order.order_id, 1);
        assert_eq!(order.shipping_note, None);

        let body = br#"{"order_id":2,"display_name":"y","line_items":[]}"#;
        let order: Order = from_slice(body, &SerializerOptions::DEFAULT).unwrap();
        assert_eq!(order.order_id, 2);
    }

    #[test]
    fn decode_errors_are_deserialization_errors() {
        let bodies: [&[u8]; 5] = [
            b"",
            b"not json",
            br#"{"name":1}"#,
            br#"{"other":"x"}"#,
            br#"["a",null,"extra"]"#,
        ];
        for body in bodies {
            let err = from_slice::<Widget>(body, &SerializerOptions::DEFAULT).unwrap_err();
            assert!(matches!(err, ApiError::Deserialization(_)), "{body:?}");
        }
        let err = from_slice::<Shape>(br#"{"Circle":{"radiusM":1},"Square":2}"#, &SerializerOptions::DEFAULT)
            .unwrap_err();
        assert!(matches!(err, ApiError::Deserialization(_)));
    }

    #[test]
    fn case_conversion() {
        assert_eq!(to_camel_case("display_name"), "displayName");
        assert_eq!(to_camel_case("name"), "name");
        assert_eq!(to_camel_case("Name"), "name");
        assert_eq!(to_camel_case("displayName"), "displayName");
        assert_eq!(to_camel_case("_private_field"), "_privateField");
        assert_eq!(to_camel_case("line_1"), "line1");
        assert_eq!(to_camel_case("a_b_c"), "aBC");
    }
}
