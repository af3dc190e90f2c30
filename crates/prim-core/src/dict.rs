//! Dictionary / index table and literal-address maps (§3).
//!
//! `HERE` and `LATEST` are fixed pointer cells; `DICT` is the base of a
//! descending table of entry addresses. Each definition writes `HERE`
//! into the next free descending slot and steps `LATEST` down by 2. The
//! *ordinal* of a name is its zero-based index into that table, counting
//! from `DICT` downward.

use std::collections::BTreeSet;

use crate::Bus;

/// Address of the 16-bit `HERE` pointer cell.
pub const HERE: u16 = 10;

/// Address of the 16-bit `LATEST` pointer cell.
pub const LATEST: u16 = 12;

/// Initial value of `HERE`: the first free byte past the fixed pointer
/// cells, and the start of user-compiled code for any fresh image.
pub const CODE_START: u16 = 12;

/// Base of the descending dictionary table (entry *k* at `DICT - 2*k`).
pub const DICT: u16 = 0xFEFE;

/// Scratch region used to execute immediate-mode opcode bursts.
pub const AREA: u16 = DICT + 2;

/// Reset `HERE`/`LATEST` to their initial values on a fresh image.
pub fn init(bus: &mut impl Bus) {
    bus.write16(HERE, CODE_START);
    bus.write16(LATEST, DICT);
}

/// Read the current value of `HERE`.
pub fn here(bus: &mut impl Bus) -> u16 {
    bus.read16(HERE)
}

/// Read the current value of `LATEST`.
pub fn latest(bus: &mut impl Bus) -> u16 {
    bus.read16(LATEST)
}

/// Number of names currently defined: `(DICT - LATEST) / 2`.
pub fn entry_count(bus: &mut impl Bus) -> u16 {
    (DICT.wrapping_sub(latest(bus))) / 2
}

/// Append a new definition at the current `HERE`, advancing `LATEST`
/// downward by 2. Returns the ordinal assigned to the new entry.
pub fn append_entry(bus: &mut impl Bus, addr: u16) -> u16 {
    let ordinal = entry_count(bus);
    let lat = latest(bus);
    bus.write16(lat, addr);
    bus.write16(LATEST, lat - 2);
    ordinal
}

/// Address of the *k*-th entry's address cell (`DICT - 2*k`), regardless
/// of whether that slot has been written yet.
#[must_use]
pub const fn entry_slot(ordinal: u16) -> u16 {
    DICT - 2 * ordinal
}

/// Look up the address a dictionary ordinal resolves to.
///
/// Returns `None` if `ordinal` is outside the currently-defined range
/// (§4.7: "Any WORD_CALL/WORD_ADDRESS with an ordinal outside the
/// current dictionary is fatal").
pub fn lookup(bus: &mut impl Bus, ordinal: u16) -> Option<u16> {
    if ordinal >= entry_count(bus) {
        return None;
    }
    Some(bus.read16(entry_slot(ordinal)))
}

/// The two sets of code addresses the token interpreter records so the
/// disassembler can tell code from in-line data (§3).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LiteralMaps {
    /// Each address points at a 2-byte in-line number.
    pub numbers: BTreeSet<u16>,
    /// Each address points at a length-prefixed byte string.
    pub strings: BTreeSet<u16>,
}

impl LiteralMaps {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_number_literal(&self, addr: u16) -> bool {
        self.numbers.contains(&addr)
    }

    #[must_use]
    pub fn is_string_literal(&self, addr: u16) -> bool {
        self.strings.contains(&addr)
    }
}

/// Named dictionary, kept in lockstep with the in-memory descending
/// table: `names[ordinal]` is the name registered for that ordinal.
///
/// The memory image remains the single source of truth for *addresses*
/// (§9: "a re-implementation should keep this indirection"); this struct
/// only carries the names, which have no representation in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    names: Vec<String>,
}

impl Dictionary {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A dictionary pre-seeded with `H` (ordinal 0) and `LATEST` (ordinal
    /// 1), the two definitions every Prim source is required to define
    /// first (§4.6: "an implementer may pre-seed them when starting from
    /// an empty image").
    #[must_use]
    pub fn seeded() -> Self {
        let mut dict = Self::new();
        dict.register("H");
        dict.register("LATEST");
        dict
    }

    /// Register `name` for the next ordinal. Callers are responsible for
    /// also calling `append_entry` on the memory image so the two stay in
    /// lockstep.
    pub fn register(&mut self, name: impl Into<String>) -> u16 {
        let ordinal = self.names.len() as u16;
        self.names.push(name.into());
        ordinal
    }

    #[must_use]
    pub fn ordinal_of(&self, name: &str) -> Option<u16> {
        self.names.iter().position(|n| n == name).map(|i| i as u16)
    }

    #[must_use]
    pub fn name_of(&self, ordinal: u16) -> Option<&str> {
        self.names.get(ordinal as usize).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}
