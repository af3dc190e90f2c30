//! The closed Prim opcode set (§4.1).
//!
//! One byte per instruction: bits 0..6 select the operation, bit 7 is the
//! return-on-this-instruction modifier. `PUSH8`/`PUSH` carry 1/2 in-line
//! little-endian operand bytes; every other instruction is one byte.

/// Bit 7 of an opcode byte: pop the return stack into `PC` after the
/// instruction completes.
pub const RETURN_BIT: u8 = 0x80;

/// Mask selecting the 7-bit operation field.
pub const OP_MASK: u8 = 0x7F;

/// A single Prim operation (the 7-bit field, return bit stripped).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Op {
    Nop = 0,
    Call = 1,
    Jp = 2,
    Jz = 3,
    And = 4,
    Or = 5,
    Xor = 6,
    Not = 7,
    Sr = 8,
    Srw = 9,
    Sl = 10,
    Slw = 11,
    Add = 12,
    Sub = 13,
    Lts = 14,
    Ltu = 15,
    Swap = 16,
    Over = 17,
    Dup = 18,
    Nip = 19,
    Rot = 20,
    Nrot = 21,
    Drop = 22,
    Rdrop = 23,
    Carry = 24,
    ToR = 25,
    FromR = 26,
    Int = 27,
    Fetch = 28,
    ByteFetch = 29,
    Store = 30,
    ByteStore = 31,
    Push8 = 32,
    Push = 33,
    Break = 34,
    Simend = 35,
}

/// Every enumerator, in encoding order. Used to build the mnemonic tables
/// and to assert the opcode set stays closed.
pub const ALL: &[Op] = &[
    Op::Nop,
    Op::Call,
    Op::Jp,
    Op::Jz,
    Op::And,
    Op::Or,
    Op::Xor,
    Op::Not,
    Op::Sr,
    Op::Srw,
    Op::Sl,
    Op::Slw,
    Op::Add,
    Op::Sub,
    Op::Lts,
    Op::Ltu,
    Op::Swap,
    Op::Over,
    Op::Dup,
    Op::Nip,
    Op::Rot,
    Op::Nrot,
    Op::Drop,
    Op::Rdrop,
    Op::Carry,
    Op::ToR,
    Op::FromR,
    Op::Int,
    Op::Fetch,
    Op::ByteFetch,
    Op::Store,
    Op::ByteStore,
    Op::Push8,
    Op::Push,
    Op::Break,
    Op::Simend,
];

impl Op {
    /// Canonical mnemonic, with no `.RET` suffix.
    #[must_use]
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Self::Nop => "NOP",
            Self::Call => "CALL",
            Self::Jp => "JP",
            Self::Jz => "JZ",
            Self::And => "AND",
            Self::Or => "OR",
            Self::Xor => "XOR",
            Self::Not => "NOT",
            Self::Sr => "SR",
            Self::Srw => "SRW",
            Self::Sl => "SL",
            Self::Slw => "SLW",
            Self::Add => "ADD",
            Self::Sub => "SUB",
            Self::Lts => "LTS",
            Self::Ltu => "LTU",
            Self::Swap => "SWAP",
            Self::Over => "OVER",
            Self::Dup => "DUP",
            Self::Nip => "NIP",
            Self::Rot => "ROT",
            Self::Nrot => "NROT",
            Self::Drop => "DROP",
            Self::Rdrop => "RDROP",
            Self::Carry => "CARRY",
            Self::ToR => "TO_R",
            Self::FromR => "FROM_R",
            Self::Int => "INT",
            Self::Fetch => "FETCH",
            Self::ByteFetch => "BYTE_FETCH",
            Self::Store => "STORE",
            Self::ByteStore => "BYTE_STORE",
            Self::Push8 => "PUSH8",
            Self::Push => "PUSH",
            Self::Break => "BREAK",
            Self::Simend => "SIMEND",
        }
    }

    /// Number of bytes this instruction occupies, including any in-line
    /// operand and the opcode byte itself, but excluding the return bit
    /// (which never adds a byte).
    #[must_use]
    pub const fn len(self) -> u16 {
        match self {
            Self::Push8 => 2,
            Self::Push => 3,
            _ => 1,
        }
    }

    /// Decode the 7-bit operation field. Unassigned slots in 0..127 decode
    /// as `Nop` (§4.3: "invalid opcodes act as NOP").
    #[must_use]
    pub const fn from_field(field: u8) -> Self {
        match field & OP_MASK {
            0 => Self::Nop,
            1 => Self::Call,
            2 => Self::Jp,
            3 => Self::Jz,
            4 => Self::And,
            5 => Self::Or,
            6 => Self::Xor,
            7 => Self::Not,
            8 => Self::Sr,
            9 => Self::Srw,
            10 => Self::Sl,
            11 => Self::Slw,
            12 => Self::Add,
            13 => Self::Sub,
            14 => Self::Lts,
            15 => Self::Ltu,
            16 => Self::Swap,
            17 => Self::Over,
            18 => Self::Dup,
            19 => Self::Nip,
            20 => Self::Rot,
            21 => Self::Nrot,
            22 => Self::Drop,
            23 => Self::Rdrop,
            24 => Self::Carry,
            25 => Self::ToR,
            26 => Self::FromR,
            27 => Self::Int,
            28 => Self::Fetch,
            29 => Self::ByteFetch,
            30 => Self::Store,
            31 => Self::ByteStore,
            32 => Self::Push8,
            33 => Self::Push,
            34 => Self::Break,
            35 => Self::Simend,
            _ => Self::Nop,
        }
    }

    /// Decode a full opcode byte into (operation, return-bit-set).
    #[must_use]
    pub const fn decode(byte: u8) -> (Self, bool) {
        (Self::from_field(byte), byte & RETURN_BIT != 0)
    }

    /// Encode this operation as a byte, optionally with the return bit set.
    #[must_use]
    pub const fn encode(self, with_return: bool) -> u8 {
        let base = self as u8;
        if with_return {
            base | RETURN_BIT
        } else {
            base
        }
    }

    /// Look up a mnemonic (case-sensitive, as emitted by `mnemonic()`,
    /// plus the aliases documented in §4.1). Does not handle the `.RET`
    /// suffix; callers strip that first.
    #[must_use]
    pub fn from_mnemonic(name: &str) -> Option<Self> {
        ALL.iter()
            .copied()
            .find(|op| op.mnemonic() == name)
            .or_else(|| alias(name))
    }
}

fn alias(name: &str) -> Option<Op> {
    Some(match name {
        "+" => Op::Add,
        "-" => Op::Sub,
        "<" => Op::Lts,
        "<U" => Op::Ltu,
        "@" => Op::Fetch,
        "C@" => Op::ByteFetch,
        "!" => Op::Store,
        "C!" => Op::ByteStore,
        ">R" => Op::ToR,
        "R>" => Op::FromR,
        "-ROT" => Op::Nrot,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_is_total_over_all_7_bit_fields() {
        for field in 0u8..=127 {
            // Must not panic; every field maps to some Op.
            let _ = Op::from_field(field);
        }
    }

    #[test]
    fn return_bit_round_trips() {
        let (op, ret) = Op::decode(Op::Add.encode(true));
        assert_eq!(op, Op::Add);
        assert!(ret);
        let (op, ret) = Op::decode(Op::Add.encode(false));
        assert_eq!(op, Op::Add);
        assert!(!ret);
    }

    #[test]
    fn aliases_resolve_to_canonical_ops() {
        assert_eq!(Op::from_mnemonic("+"), Some(Op::Add));
        assert_eq!(Op::from_mnemonic("<U"), Some(Op::Ltu));
        assert_eq!(Op::from_mnemonic("-ROT"), Some(Op::Nrot));
        assert_eq!(Op::from_mnemonic("R>"), Some(Op::FromR));
        assert_eq!(Op::from_mnemonic("NOPE"), None);
    }

    #[test]
    fn push_forms_have_expected_length() {
        assert_eq!(Op::Push8.len(), 2);
        assert_eq!(Op::Push.len(), 3);
        assert_eq!(Op::Nop.len(), 1);
    }
}
