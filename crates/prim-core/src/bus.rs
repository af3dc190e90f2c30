//! Byte-addressable bus interface.

/// Byte-addressable memory and I/O bus.
///
/// The CPU accesses all of its state — code, data, and the two
/// memory-mapped UART cells — through this trait. `Memory` is the only
/// implementation the workspace ships, but keeping the CPU generic over
/// `Bus` lets tests substitute a bare byte array when a scenario has no
/// use for UART semantics.
pub trait Bus {
    /// Read one byte at `address`, wrapping modulo 2^16.
    fn read8(&mut self, address: u16) -> u8;

    /// Write one byte at `address`, wrapping modulo 2^16.
    fn write8(&mut self, address: u16, value: u8);

    /// Read a little-endian 16-bit value as two sequential 8-bit reads.
    fn read16(&mut self, address: u16) -> u16 {
        let lo = self.read8(address);
        let hi = self.read8(address.wrapping_add(1));
        u16::from(lo) | (u16::from(hi) << 8)
    }

    /// Write a little-endian 16-bit value as two sequential 8-bit writes.
    fn write16(&mut self, address: u16, value: u16) {
        self.write8(address, (value & 0xFF) as u8);
        self.write8(address.wrapping_add(1), (value >> 8) as u8);
    }
}
