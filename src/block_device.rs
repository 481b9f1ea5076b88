use crate::error::ErrorKind;
use crate::util::BLOCK_SIZE;

/// Fixed size logical block device, as consumed by a FAT driver or a mass storage class.
///
/// Requests are serialized by the caller; implementations do no locking.
pub trait BlockDevice {
    type Error: core::fmt::Debug;

    fn block_size(&self) -> u32 {
        BLOCK_SIZE as u32
    }

    fn block_count(&self) -> u32;

    fn read_block(
        &mut self,
        dest: &mut [u8; BLOCK_SIZE],
        block: u32,
    ) -> Result<(), ErrorKind<Self::Error>>;

    fn write_block(&mut self, src: &[u8; BLOCK_SIZE], block: u32)
        -> Result<(), ErrorKind<Self::Error>>;

    /// Read `count` consecutive blocks into `dest`, stopping at the first failure.
    fn read_blocks(
        &mut self,
        dest: &mut [u8],
        start_block: u32,
        count: u32,
    ) -> Result<(), ErrorKind<Self::Error>> {
        let end_block = block_range_end(dest.len(), start_block, count)?;
        for (chunk, block) in dest
            .chunks_exact_mut(BLOCK_SIZE)
            .zip(start_block..end_block)
        {
            let chunk: &mut [u8; BLOCK_SIZE] = chunk
                .try_into()
                .map_err(|_| ErrorKind::InsufficientSpace)?;
            self.read_block(chunk, block)?;
        }
        Ok(())
    }

    /// Write `count` consecutive blocks from `src`, stopping at the first failure.
    fn write_blocks(
        &mut self,
        src: &[u8],
        start_block: u32,
        count: u32,
    ) -> Result<(), ErrorKind<Self::Error>> {
        let end_block = block_range_end(src.len(), start_block, count)?;
        for (chunk, block) in src.chunks_exact(BLOCK_SIZE).zip(start_block..end_block) {
            let chunk: &[u8; BLOCK_SIZE] = chunk
                .try_into()
                .map_err(|_| ErrorKind::InsufficientSpace)?;
            self.write_block(chunk, block)?;
        }
        Ok(())
    }

    /// Nothing is buffered across calls.
    fn flush(&mut self) -> Result<(), ErrorKind<Self::Error>> {
        Ok(())
    }
}

fn block_range_end<E>(buf_len: usize, start_block: u32, count: u32) -> Result<u32, ErrorKind<E>> {
    if (buf_len / BLOCK_SIZE) < count as usize {
        return Err(ErrorKind::InsufficientSpace);
    }
    start_block
        .checked_add(count)
        .ok_or(ErrorKind::InvalidBlock(start_block))
}
