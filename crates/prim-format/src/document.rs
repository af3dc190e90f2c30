//! The persisted key/value document shared by every CLI binary (§6).

use prim_core::{Memory, SIZE};
use serde::{Deserialize, Serialize};

use crate::codec;
use crate::error::FormatError;

/// `type` field values, recorded verbatim from §6.
pub const TYPE_TOKENIZER: &str = "tokenizer";
pub const TYPE_TOKENFORTH: &str = "tokenforth";

/// A snapshot of the shared data model, as read or written by every
/// `prim-*` binary: the memory image, the dictionary, the two literal
/// maps, and (for tokenizer output) the raw token stream.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    #[serde(with = "codec")]
    pub memory: Vec<u8>,
    pub symbols: Vec<String>,
    #[serde(rename = "num-literals")]
    pub num_literals: Vec<u16>,
    #[serde(rename = "string-literals")]
    pub string_literals: Vec<u16>,
    #[serde(
        rename = "tokens",
        default,
        skip_serializing_if = "Option::is_none",
        with = "codec::option"
    )]
    pub tokens: Option<Vec<u8>>,
    #[serde(rename = "type")]
    pub doc_type: String,
    pub title: String,
    pub date: String,
    #[serde(rename = "input-toml", default, skip_serializing_if = "Option::is_none")]
    pub input_toml: Option<String>,
}

impl Document {
    /// Parse a document from TOML text, applying the comma-collapse
    /// workaround (§6, §9d) to every string list.
    pub fn from_toml(text: &str) -> Result<Self, FormatError> {
        let mut doc: Self = toml::from_str(text)?;
        uncollapse_commas(&mut doc.symbols);
        Ok(doc)
    }

    /// Render this document back to TOML text.
    pub fn to_toml(&self) -> Result<String, FormatError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rebuild a [`Memory`] image from the `memory` field.
    ///
    /// Fails if the stored blob isn't exactly [`SIZE`] bytes — a document
    /// from a foreign or corrupted writer.
    pub fn to_memory(&self) -> Result<Memory, FormatError> {
        let bytes: [u8; SIZE] = self.memory.as_slice().try_into().map_err(|_| {
            FormatError::BadShape(format!(
                "memory field is {} bytes, expected {SIZE}",
                self.memory.len()
            ))
        })?;
        Ok(Memory::from_bytes(bytes))
    }

    /// Capture a [`Memory`] image into the `memory` field.
    pub fn set_memory(&mut self, memory: &Memory) {
        self.memory = memory.as_bytes().to_vec();
    }
}

/// Undo the serialization-layer quirk (§6, §9d): a standalone `","`
/// element in a string list arrives back as two consecutive empty
/// strings. Compress every such run back into one `","` element.
fn uncollapse_commas(list: &mut Vec<String>) {
    let mut out = Vec::with_capacity(list.len());
    let mut iter = list.drain(..).peekable();
    while let Some(item) = iter.next() {
        if item.is_empty() && iter.peek().is_some_and(String::is_empty) {
            iter.next();
            out.push(",".to_string());
        } else {
            out.push(item);
        }
    }
    drop(iter);
    *list = out;
}

#[cfg(test)]
mod tests {
    use super::*;
    use prim_core::Bus;

    fn sample() -> Document {
        Document {
            memory: vec![0u8; SIZE],
            symbols: vec!["H".to_string(), "LATEST".to_string()],
            num_literals: vec![20, 30],
            string_literals: vec![40],
            tokens: Some(vec![1, 2, 3]),
            doc_type: TYPE_TOKENIZER.to_string(),
            title: "demo".to_string(),
            date: "2026-08-01".to_string(),
            input_toml: None,
        }
    }

    #[test]
    fn round_trips_through_toml_text() {
        let doc = sample();
        let text = doc.to_toml().unwrap();
        let back = Document::from_toml(&text).unwrap();
        assert_eq!(back.symbols, doc.symbols);
        assert_eq!(back.num_literals, doc.num_literals);
        assert_eq!(back.tokens, doc.tokens);
        assert_eq!(back.memory.len(), SIZE);
    }

    #[test]
    fn comma_collapse_is_reversed_on_load() {
        let mut doc = sample();
        doc.symbols = vec!["A".to_string(), String::new(), String::new(), "B".to_string()];
        let text = doc.to_toml().unwrap();
        let back = Document::from_toml(&text).unwrap();
        assert_eq!(
            back.symbols,
            vec!["A".to_string(), ",".to_string(), "B".to_string()]
        );
    }

    #[test]
    fn undersized_memory_field_is_rejected() {
        let mut doc = sample();
        doc.memory = vec![0u8; 10];
        assert!(doc.to_memory().is_err());
    }

    #[test]
    fn memory_round_trips_through_document() {
        let mut mem = Memory::new();
        mem.write8(20, 0xAB);
        let mut doc = sample();
        doc.set_memory(&mem);
        let back = doc.to_memory().unwrap();
        assert_eq!(back.as_bytes()[20], 0xAB);
    }
}
