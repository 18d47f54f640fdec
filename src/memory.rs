//! Data memory.
//!
//! `Dmem` models the 4 KiB scratch memory the vector unit normally talks to.
//! Every byte address wraps at 4 KiB, so an access that runs off the end
//! continues at address 0.

use byteorder::{BigEndian, ByteOrder};

use crate::traits::{BusError, MemoryBus};

/// Data memory size in bytes.
pub const DMEM_SIZE: usize = 0x1000;

const DMEM_MASK: u32 = DMEM_SIZE as u32 - 1;

/// 4 KiB big-endian data memory.
#[derive(Clone)]
pub struct Dmem {
    bytes: Box<[u8; DMEM_SIZE]>,
}

impl Default for Dmem {
    fn default() -> Self {
        Self::new()
    }
}

impl Dmem {
    /// Create a zero-filled memory.
    pub fn new() -> Self {
        Self {
            bytes: Box::new([0; DMEM_SIZE]),
        }
    }

    /// Raw contents.
    pub fn as_bytes(&self) -> &[u8; DMEM_SIZE] {
        &self.bytes
    }

    /// Read one byte.
    #[inline]
    pub fn read_u8(&self, address: u32) -> u8 {
        self.bytes[(address & DMEM_MASK) as usize]
    }

    /// Write one byte.
    #[inline]
    pub fn write_u8(&mut self, address: u32, value: u8) {
        self.bytes[(address & DMEM_MASK) as usize] = value;
    }

    /// Read a big-endian halfword.
    pub fn read_u16(&self, address: u32) -> u16 {
        let mut buf = [0u8; 2];
        self.copy_out(address, &mut buf);
        BigEndian::read_u16(&buf)
    }

    /// Write a big-endian halfword.
    pub fn write_u16(&mut self, address: u32, value: u16) {
        let mut buf = [0u8; 2];
        BigEndian::write_u16(&mut buf, value);
        self.copy_in(address, &buf);
    }

    /// Read a big-endian word.
    pub fn read_u32(&self, address: u32) -> u32 {
        let mut buf = [0u8; 4];
        self.copy_out(address, &mut buf);
        BigEndian::read_u32(&buf)
    }

    /// Write a big-endian word.
    pub fn write_u32(&mut self, address: u32, value: u32) {
        let mut buf = [0u8; 4];
        BigEndian::write_u32(&mut buf, value);
        self.copy_in(address, &buf);
    }

    /// Copy a byte slice in, wrapping at the end of memory.
    pub fn copy_in(&mut self, address: u32, data: &[u8]) {
        for (i, byte) in data.iter().enumerate() {
            self.write_u8(address.wrapping_add(i as u32), *byte);
        }
    }

    /// Copy a byte slice out, wrapping at the end of memory.
    pub fn copy_out(&self, address: u32, data: &mut [u8]) {
        for (i, byte) in data.iter_mut().enumerate() {
            *byte = self.read_u8(address.wrapping_add(i as u32));
        }
    }
}

impl MemoryBus for Dmem {
    fn read(&mut self, address: u32, data: &mut [u8]) -> Result<(), BusError> {
        self.copy_out(address, data);
        Ok(())
    }

    fn write(&mut self, address: u32, data: &[u8]) -> Result<(), BusError> {
        self.copy_in(address, data);
        Ok(())
    }
}

impl std::fmt::Debug for Dmem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let used = self.bytes.iter().filter(|b| **b != 0).count();
        write!(f, "Dmem {{ {} non-zero bytes }}", used)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_big_endian_helpers() {
        let mut dmem = Dmem::new();
        dmem.write_u32(0x100, 0x1122_3344);
        assert_eq!(dmem.read_u8(0x100), 0x11);
        assert_eq!(dmem.read_u8(0x103), 0x44);
        assert_eq!(dmem.read_u16(0x101), 0x2233);

        dmem.write_u16(0x200, 0xBEEF);
        assert_eq!(dmem.read_u32(0x1FE), 0x0000_BEEF);
    }

    #[test]
    fn test_address_wraps_at_4k() {
        let mut dmem = Dmem::new();
        dmem.write_u32(0xFFE, 0xAABB_CCDD);
        assert_eq!(dmem.read_u8(0xFFF), 0xBB);
        assert_eq!(dmem.read_u8(0x000), 0xCC);
        assert_eq!(dmem.read_u8(0x001), 0xDD);
        assert_eq!(dmem.read_u8(0x1001), 0xDD);
    }

    #[test]
    fn test_bus_interface() {
        let mut dmem = Dmem::new();
        MemoryBus::write(&mut dmem, 0x10, &[1, 2, 3]).unwrap();

        let mut buf = [0u8; 4];
        MemoryBus::read(&mut dmem, 0x0F, &mut buf).unwrap();
        assert_eq!(buf, [0, 1, 2, 3]);
    }
}
