//! Serde helper for optional binary data as a base64 string

use base64ct::Base64;
use base64ct::Encoding;
use serde::Deserialize;
use serde::Deserializer;
use serde::Serializer;
use serde::de::Error;

#[allow(clippy::ref_option)] // signature required by `#[serde(with)]`
pub fn serialize<S: Serializer>(data: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error> {
    match data {
        Some(data) => serializer.serialize_some(&Base64::encode_string(data)),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error> {
    Option::<String>::deserialize(deserializer)?
        .map(|encoded| {
            Base64::decode_vec(&encoded)
                .map_err(|_| D::Error::custom("expected a base64 encoded string"))
        })
        .transpose()
}
