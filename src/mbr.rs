//! Synthetic master boot record for block 0.
//!
//! Layout of the 512 byte sector:
//!
//! | offset | len | contents                          |
//! |--------|-----|-----------------------------------|
//! | 0      | 446 | boot code, zeroed                 |
//! | 446    | 64  | four 16 byte partition entries    |
//! | 510    | 2   | signature `0x55 0xAA`             |
//!
//! Entries are encoded byte by byte from the offsets below rather than from a struct layout.

use zerocopy::{AsBytes, FromBytes, LayoutVerified};

use crate::config::Config;
use crate::util::BLOCK_SIZE;

pub const PARTITION_TABLE_OFFSET: usize = 446;
pub const PARTITION_ENTRY_LEN: usize = 16;
pub const NUM_PARTITION_ENTRIES: usize = 4;
pub const SIGNATURE_OFFSET: usize = 510;
pub const MBR_SIGNATURE: [u8; 2] = [0x55, 0xAA];

pub const PARTITION_TYPE_EMPTY: u8 = 0x00;
pub const PARTITION_TYPE_FAT12: u8 = 0x01;

const BOOT_FLAG_OFFSET: usize = 0;
const START_CHS_OFFSET: usize = 1;
const TYPE_OFFSET: usize = 4;
const END_CHS_OFFSET: usize = 5;
const START_BLOCK_OFFSET: usize = 8;
const NUM_BLOCKS_OFFSET: usize = 12;
const CHS_LEN: usize = 3;

/// CHS fields of a populated entry. Tells readers to use the LBA fields instead.
const CHS_LBA_ONLY: [u8; CHS_LEN] = [0xFF; CHS_LEN];
const CHS_EMPTY: [u8; CHS_LEN] = [0x00; CHS_LEN];

/// Encode one partition table entry.
pub fn build_partition(
    boot: u8,
    partition_type: u8,
    start_block: u32,
    num_blocks: u32,
) -> [u8; PARTITION_ENTRY_LEN] {
    let mut buf = [0u8; PARTITION_ENTRY_LEN];
    buf[BOOT_FLAG_OFFSET] = boot;

    let start_chs = if num_blocks == 0 {
        CHS_EMPTY
    } else {
        CHS_LBA_ONLY
    };
    buf[START_CHS_OFFSET..START_CHS_OFFSET + CHS_LEN].copy_from_slice(&start_chs);

    buf[TYPE_OFFSET] = partition_type;

    let end_chs = if num_blocks == 0 {
        CHS_EMPTY
    } else {
        CHS_LBA_ONLY
    };
    buf[END_CHS_OFFSET..END_CHS_OFFSET + CHS_LEN].copy_from_slice(&end_chs);

    buf[START_BLOCK_OFFSET..START_BLOCK_OFFSET + 4].copy_from_slice(&start_block.to_le_bytes());
    buf[NUM_BLOCKS_OFFSET..NUM_BLOCKS_OFFSET + 4].copy_from_slice(&num_blocks.to_le_bytes());
    buf
}

/// Fill `dest` with an MBR advertising the single data partition described by `config`.
pub fn write_mbr(config: &Config, dest: &mut [u8; BLOCK_SIZE]) {
    dest[..PARTITION_TABLE_OFFSET].fill(0);

    let entries = [
        build_partition(
            0,
            config.partition_type,
            config.part1_start_block,
            config.part1_num_blocks,
        ),
        build_partition(0, PARTITION_TYPE_EMPTY, 0, 0),
        build_partition(0, PARTITION_TYPE_EMPTY, 0, 0),
        build_partition(0, PARTITION_TYPE_EMPTY, 0, 0),
    ];
    for (i, entry) in entries.iter().enumerate() {
        let offset = PARTITION_TABLE_OFFSET + i * PARTITION_ENTRY_LEN;
        dest[offset..offset + PARTITION_ENTRY_LEN].copy_from_slice(entry);
    }

    dest[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2].copy_from_slice(&MBR_SIGNATURE);
}

/// True if the sector ends with the boot signature.
pub fn has_signature(sector: &[u8]) -> bool {
    sector.len() == BLOCK_SIZE && sector[SIGNATURE_OFFSET..SIGNATURE_OFFSET + 2] == MBR_SIGNATURE
}

/// Decoded view of a 16 byte partition table entry.
#[derive(Debug, AsBytes, FromBytes, Clone, PartialEq, Eq)]
#[repr(C)]
pub struct PartitionEntry {
    boot: u8,
    start_chs: [u8; CHS_LEN],
    partition_type: u8,
    end_chs: [u8; CHS_LEN],
    start_block: [u8; 4],
    num_blocks: [u8; 4],
}

impl PartitionEntry {
    pub fn parse(bytes: &[u8]) -> Option<Self> {
        let entry: Option<LayoutVerified<_, PartitionEntry>> = LayoutVerified::new(bytes);
        entry.map(|entry| (*entry).clone())
    }

    /// Entry `index` (0 to 3) of the partition table in an MBR sector.
    pub fn from_mbr(sector: &[u8], index: usize) -> Option<Self> {
        if index >= NUM_PARTITION_ENTRIES || sector.len() != BLOCK_SIZE {
            return None;
        }
        let offset = PARTITION_TABLE_OFFSET + index * PARTITION_ENTRY_LEN;
        Self::parse(&sector[offset..offset + PARTITION_ENTRY_LEN])
    }

    pub fn boot(&self) -> u8 {
        self.boot
    }

    pub fn partition_type(&self) -> u8 {
        self.partition_type
    }

    pub fn start_block(&self) -> u32 {
        u32::from_le_bytes(self.start_block)
    }

    pub fn num_blocks(&self) -> u32 {
        u32::from_le_bytes(self.num_blocks)
    }

    /// Unused slots are all zero.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().iter().all(|b| *b == 0)
    }

    /// Populated entries leave CHS addressing to the LBA fields.
    pub fn is_lba_only(&self) -> bool {
        self.start_chs == CHS_LBA_ONLY && self.end_chs == CHS_LBA_ONLY
    }
}
