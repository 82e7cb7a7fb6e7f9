//! Lenient numeric deserializers
//!
//! The backend is asked for integers but occasionally emits `34.0`.
//! Whole floats are accepted; fractional or negative values are not.

use serde::de::{self, Deserializer, Unexpected, Visitor};
use std::fmt;

pub(crate) fn whole_number<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(WholeNumber)
}

struct WholeNumber;

impl<'de> Visitor<'de> for WholeNumber {
    type Value = u32;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a non-negative whole number")
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<u32, E> {
        u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Unsigned(v), &self))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<u32, E> {
        u32::try_from(v).map_err(|_| E::invalid_value(Unexpected::Signed(v), &self))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn visit_f64<E: de::Error>(self, v: f64) -> Result<u32, E> {
        if v.fract() == 0.0 && (0.0..=f64::from(u32::MAX)).contains(&v) {
            Ok(v as u32)
        } else {
            Err(E::invalid_value(Unexpected::Float(v), &self))
        }
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Holder {
        #[serde(deserialize_with = "super::whole_number")]
        n: u32,
    }

    #[test]
    fn accepts_integers_and_whole_floats() {
        let a: Holder = serde_json::from_str(r#"{"n": 34}"#).unwrap();
        let b: Holder = serde_json::from_str(r#"{"n": 34.0}"#).unwrap();
        assert_eq!(a.n, 34);
        assert_eq!(b.n, 34);
    }

    #[test]
    fn rejects_fractions_and_negatives() {
        assert!(serde_json::from_str::<Holder>(r#"{"n": 34.5}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"n": -1}"#).is_err());
        assert!(serde_json::from_str::<Holder>(r#"{"n": "34"}"#).is_err());
    }
}
