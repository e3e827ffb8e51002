//! Serde support for fixed-size arrays longer than serde's built-in 32.
//!
//! Use with `#[serde(with = "crate::serde_arrays")]`.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S, T, const N: usize>(arr: &[T; N], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: Serialize,
{
    arr.as_slice().serialize(serializer)
}

pub fn deserialize<'de, D, T, const N: usize>(deserializer: D) -> Result<[T; N], D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items = Vec::<T>::deserialize(deserializer)?;
    let len = items.len();
    items
        .try_into()
        .map_err(|_| D::Error::invalid_length(len, &format!("an array of length {N}").as_str()))
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wide {
        #[serde(with = "super")]
        bytes: [u8; 40],
    }

    #[test]
    fn wide_array_survives_json() {
        let mut wide = Wide { bytes: [0; 40] };
        wide.bytes[39] = 9;
        let json = serde_json::to_string(&wide).expect("serialize");
        let back: Wide = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, wide);
    }

    #[test]
    fn wrong_length_is_rejected() {
        let json = format!("{{\"bytes\":{:?}}}", vec![0u8; 39]);
        assert!(serde_json::from_str::<Wide>(&json).is_err());
    }
}
