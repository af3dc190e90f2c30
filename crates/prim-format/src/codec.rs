//! `serde` adapters for the base64-encoded binary fields (§6: TOML has no
//! native byte-string type, the same workaround `emu-c64`'s `mcp.rs` uses
//! for JSON-RPC blobs applies here).

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub fn serialize<S>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    STANDARD.encode(bytes).serialize(serializer)
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let text = String::deserialize(deserializer)?;
    STANDARD.decode(&text).map_err(D::Error::custom)
}

pub mod option {
    use super::{Deserialize, Deserializer, Serialize, Serializer, STANDARD};
    use base64::Engine as _;
    use serde::de::Error as _;

    pub fn serialize<S>(bytes: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        bytes
            .as_ref()
            .map(|b| STANDARD.encode(b))
            .serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let text = Option::<String>::deserialize(deserializer)?;
        text.map(|t| STANDARD.decode(&t).map_err(D::Error::custom))
            .transpose()
    }
}
