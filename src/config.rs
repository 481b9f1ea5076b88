use log::error;

use crate::mbr::PARTITION_TYPE_FAT12;
use crate::util::{OutOfRange, PhysicalAddress, BLOCK_SIZE};

/// Where the single data partition lives, both logically and on flash.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct Config {
    /// First logical block of the partition. Block 0 is the synthetic MBR.
    pub part1_start_block: u32,
    pub part1_num_blocks: u32,
    /// Flash byte address backing `part1_start_block`.
    pub flash_start_addr: u32,
    /// Type byte advertised in the partition table.
    pub partition_type: u8,
    /// Read back and checksum every programmed block.
    pub verify_writes: bool,
}

impl Config {
    pub const fn new(part1_start_block: u32, part1_num_blocks: u32, flash_start_addr: u32) -> Self {
        Config {
            part1_start_block,
            part1_num_blocks,
            flash_start_addr,
            partition_type: PARTITION_TYPE_FAT12,
            verify_writes: false,
        }
    }

    pub const fn with_partition_type(mut self, partition_type: u8) -> Self {
        self.partition_type = partition_type;
        self
    }

    pub const fn with_write_verify(mut self, verify_writes: bool) -> Self {
        self.verify_writes = verify_writes;
        self
    }

    pub const fn block_count(&self) -> u32 {
        self.part1_start_block + self.part1_num_blocks
    }

    /// Map a logical block of the data partition to its flash address.
    pub fn translate(&self, block: u32) -> Result<PhysicalAddress, OutOfRange> {
        if block < self.part1_start_block || block - self.part1_start_block >= self.part1_num_blocks
        {
            return Err(OutOfRange(block));
        }
        (block - self.part1_start_block)
            .checked_mul(BLOCK_SIZE as u32)
            .and_then(|offset| self.flash_start_addr.checked_add(offset))
            .map(PhysicalAddress)
            .ok_or(OutOfRange(block))
    }

    /// Check the layout against a peripheral with the given erase page size.
    pub fn validate(&self, page_size: u32) -> bool {
        if page_size == 0 || BLOCK_SIZE as u32 % page_size != 0 {
            error!(
                "Page size {} does not evenly divide block size {}.",
                page_size, BLOCK_SIZE
            );
            return false;
        }

        if self.part1_start_block == 0 || self.part1_num_blocks == 0 {
            error!(
                "Partition start {} count {} overlaps the MBR or is empty.",
                self.part1_start_block, self.part1_num_blocks
            );
            return false;
        }

        if self
            .part1_start_block
            .checked_add(self.part1_num_blocks)
            .is_none()
        {
            error!("Partition end overflows the block range.");
            return false;
        }

        let span = (self.part1_num_blocks as u64) * BLOCK_SIZE as u64;
        if self.flash_start_addr as u64 + span > u32::MAX as u64 + 1 {
            error!(
                "Partition at 0x{:x} spanning {} bytes runs past the address space.",
                self.flash_start_addr, span
            );
            return false;
        }

        true
    }
}
