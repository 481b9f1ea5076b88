/// Size of a logical block in bytes. Block 0 holds a classic MBR, so this cannot change.
pub const BLOCK_SIZE: usize = 512;

/// Byte offset into the flash region.
#[derive(Debug, PartialEq, Eq, Clone, Copy, PartialOrd, Ord)]
pub struct PhysicalAddress(pub u32);

/// Logical block with no backing flash.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct OutOfRange(pub u32);

pub(crate) const CRC: crc::Crc<u32> = crc::Crc::<u32>::new(&crc::CRC_32_CKSUM);
