//! Duplicate object key detection
//!
//! `serde_json::Value` silently keeps the last of duplicated keys, but a
//! duplicated name in an RDAP response is a conformance finding of its own.
//! This scan drives the deserializer directly and reports the first key
//! that repeats among its siblings, in document order.

use std::collections::HashSet;
use std::fmt;

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};

/// Returns the first duplicated object key in `text`, if any.
///
/// `None` both for well-formed unique-key documents and for text that is
/// not JSON at all; syntactic validity is judged elsewhere.
pub fn find_duplicate_key(text: &str) -> Option<String> {
    let mut deserializer = serde_json::Deserializer::from_str(text);
    DupKeyScan.deserialize(&mut deserializer).ok().flatten()
}

struct DupKeyScan;

impl<'de> DeserializeSeed<'de> for DupKeyScan {
    type Value = Option<String>;

    fn deserialize<D>(self, deserializer: D) -> Result<Self::Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for DupKeyScan {
    type Value = Option<String>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("any JSON value")
    }

    fn visit_bool<E>(self, _: bool) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_i64<E>(self, _: i64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_u64<E>(self, _: u64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_f64<E>(self, _: f64) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_str<E>(self, _: &str) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut seen = HashSet::new();
        while let Some(key) = map.next_key::<String>()? {
            if !seen.insert(key.clone()) {
                let _: IgnoredAny = map.next_value()?;
                return Ok(Some(key));
            }
            if let Some(duplicate) = map.next_value_seed(DupKeyScan)? {
                return Ok(Some(duplicate));
            }
        }
        Ok(None)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        while let Some(element) = seq.next_element_seed(DupKeyScan)? {
            if element.is_some() {
                return Ok(element);
            }
        }
        Ok(None)
    }
}
