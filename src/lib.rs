//! Presents a region of raw NVM flash as a fixed size block device holding a single FAT
//! partition.
//!
//! Block 0 is a master boot record computed on every read and never stored. Blocks of the data
//! partition map linearly onto flash, and every write erases the backing pages before
//! programming them.
#![no_std]

#[cfg(test)]
#[macro_use]
extern crate std;

pub mod block_device;
pub mod config;
pub mod error;
pub mod flash;
pub mod indicator;
pub mod mbr;
pub mod util;

#[cfg(test)]
mod tests_util;

use log::{debug, error, info, trace};

pub use crate::block_device::BlockDevice;
pub use crate::config::Config;
pub use crate::error::ErrorKind;
pub use crate::flash::NvmFlash;
pub use crate::indicator::{ActivityIndicator, NoIndicator};
pub use crate::util::{OutOfRange, PhysicalAddress, BLOCK_SIZE};

use crate::indicator::ActiveWrite;
use crate::util::CRC;

/// Block translator over an initialized flash peripheral.
pub struct FlashDisk<F: NvmFlash, L: ActivityIndicator = NoIndicator> {
    flash: F,
    indicator: L,
    config: Config,
    pages_per_block: u32,
}

impl<F: NvmFlash, L: ActivityIndicator> FlashDisk<F, L> {
    /// Bring up the indicator and the flash controller and take ownership of both.
    pub fn init(
        mut flash: F,
        mut indicator: L,
        config: Config,
    ) -> Result<Self, ErrorKind<F::Error>> {
        indicator.configure();
        indicator.set_active(false);

        flash.enable_clock().map_err(|e| {
            error!("Failure to enable flash bus clock: {:?}", e);
            ErrorKind::InitFailed(e)
        })?;
        flash.init().map_err(|e| {
            error!("Failure to initialize flash: {:?}", e);
            ErrorKind::InitFailed(e)
        })?;

        let page_size = flash.page_size();
        if !config.validate(page_size) {
            return Err(ErrorKind::InvalidGeometry);
        }

        info!(
            "Flash disk up: {} blocks, partition at block {} backed by 0x{:x}, page size {}.",
            config.block_count(),
            config.part1_start_block,
            config.flash_start_addr,
            page_size
        );
        Ok(FlashDisk {
            flash,
            indicator,
            config,
            pages_per_block: BLOCK_SIZE as u32 / page_size,
        })
    }

    /// Give back the peripheral and indicator.
    pub fn release(self) -> (F, L) {
        (self.flash, self.indicator)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn flash(&self) -> &F {
        &self.flash
    }

    pub fn indicator(&self) -> &L {
        &self.indicator
    }

    pub fn block_size(&self) -> u32 {
        BLOCK_SIZE as u32
    }

    pub fn block_count(&self) -> u32 {
        self.config.block_count()
    }

    pub fn translate(&self, block: u32) -> Result<PhysicalAddress, OutOfRange> {
        self.config.translate(block)
    }

    pub fn read_block(
        &mut self,
        dest: &mut [u8; BLOCK_SIZE],
        block: u32,
    ) -> Result<(), ErrorKind<F::Error>> {
        if block == 0 {
            mbr::write_mbr(&self.config, dest);
            return Ok(());
        }

        let PhysicalAddress(addr) = self
            .config
            .translate(block)
            .map_err(|OutOfRange(block)| ErrorKind::InvalidBlock(block))?;
        trace!("rd block: {} addr: 0x{:x}", block, addr);
        self.flash.read(addr, &mut dest[..]).map_err(|e| {
            error!("Failure to read block {} at 0x{:x}: {:?}", block, addr, e);
            ErrorKind::ReadFailed(e)
        })
    }

    pub fn write_block(
        &mut self,
        src: &[u8; BLOCK_SIZE],
        block: u32,
    ) -> Result<(), ErrorKind<F::Error>> {
        if block == 0 {
            trace!("Discarding write to MBR.");
            return Ok(());
        }

        let _active = ActiveWrite::start(&mut self.indicator);

        let PhysicalAddress(addr) = self
            .config
            .translate(block)
            .map_err(|OutOfRange(block)| ErrorKind::InvalidBlock(block))?;

        debug!(
            "wr block: {} erase addr: 0x{:x} pages: {}",
            block, addr, self.pages_per_block
        );
        self.flash.erase(addr, self.pages_per_block).map_err(|e| {
            error!("Failure to erase block {} at 0x{:x}: {:?}", block, addr, e);
            ErrorKind::EraseFailed(e)
        })?;

        debug!("wr block: {} program addr: 0x{:x}", block, addr);
        self.flash.write(addr, &src[..]).map_err(|e| {
            error!("Failure to program block {} at 0x{:x}: {:?}", block, addr, e);
            ErrorKind::WriteFailed(e)
        })?;

        if self.config.verify_writes {
            let mut readback = [0u8; BLOCK_SIZE];
            self.flash.read(addr, &mut readback).map_err(|e| {
                error!("Failure to read back block {} at 0x{:x}: {:?}", block, addr, e);
                ErrorKind::ReadFailed(e)
            })?;
            let expected = CRC.checksum(&src[..]);
            let actual = CRC.checksum(&readback);
            if expected != actual {
                error!(
                    "Block {} read back crc 0x{:08x} expected 0x{:08x}.",
                    block, actual, expected
                );
                return Err(ErrorKind::VerifyFailed(block));
            }
        }

        Ok(())
    }

    pub fn read_blocks(
        &mut self,
        dest: &mut [u8],
        start_block: u32,
        count: u32,
    ) -> Result<(), ErrorKind<F::Error>> {
        BlockDevice::read_blocks(self, dest, start_block, count)
    }

    pub fn write_blocks(
        &mut self,
        src: &[u8],
        start_block: u32,
        count: u32,
    ) -> Result<(), ErrorKind<F::Error>> {
        BlockDevice::write_blocks(self, src, start_block, count)
    }

    pub fn flush(&mut self) -> Result<(), ErrorKind<F::Error>> {
        Ok(())
    }
}

impl<F: NvmFlash, L: ActivityIndicator> BlockDevice for FlashDisk<F, L> {
    type Error = F::Error;

    fn block_count(&self) -> u32 {
        self.config.block_count()
    }

    fn read_block(
        &mut self,
        dest: &mut [u8; BLOCK_SIZE],
        block: u32,
    ) -> Result<(), ErrorKind<F::Error>> {
        FlashDisk::read_block(self, dest, block)
    }

    fn write_block(
        &mut self,
        src: &[u8; BLOCK_SIZE],
        block: u32,
    ) -> Result<(), ErrorKind<F::Error>> {
        FlashDisk::write_block(self, src, block)
    }
}
