use std::vec::Vec;

use crate::flash::NvmFlash;
use crate::indicator::ActivityIndicator;

pub(crate) fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Fault {
    Busy,
    Ecc,
    Locked,
    Misaligned,
    OutOfBounds,
}

/// Every call made on a `RamFlash`, in order. Addresses and lengths are in bytes, except the
/// page count of an erase.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub(crate) enum Op {
    EnableClock,
    Init,
    Read(u32, usize),
    Erase(u32, u32),
    Write(u32, usize),
}

/// NOR flash held in memory. Erase sets bytes to 0xFF and programming can only clear bits.
pub(crate) struct RamFlash {
    pub(crate) mem: Vec<u8>,
    pub(crate) page_size: u32,
    pub(crate) ops: Vec<Op>,
    pub(crate) fail_clock: Option<Fault>,
    pub(crate) fail_init: Option<Fault>,
    pub(crate) fail_read: Option<Fault>,
    pub(crate) fail_erase: Option<Fault>,
    pub(crate) fail_write: Option<Fault>,
    /// Bits that refuse to program to zero.
    pub(crate) stuck_bits: Option<u8>,
}

impl RamFlash {
    pub(crate) fn new(nbytes: usize, page_size: u32) -> Self {
        RamFlash {
            mem: vec![0xFF; nbytes],
            page_size,
            ops: Vec::new(),
            fail_clock: None,
            fail_init: None,
            fail_read: None,
            fail_erase: None,
            fail_write: None,
            stuck_bits: None,
        }
    }

    fn span(&self, addr: u32, len: usize) -> Result<core::ops::Range<usize>, Fault> {
        let start = addr as usize;
        let end = start + len;
        if end > self.mem.len() {
            return Err(Fault::OutOfBounds);
        }
        Ok(start..end)
    }
}

impl NvmFlash for RamFlash {
    type Error = Fault;

    fn enable_clock(&mut self) -> Result<(), Fault> {
        self.ops.push(Op::EnableClock);
        self.fail_clock.map_or(Ok(()), Err)
    }

    fn init(&mut self) -> Result<(), Fault> {
        self.ops.push(Op::Init);
        self.fail_init.map_or(Ok(()), Err)
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Fault> {
        self.ops.push(Op::Read(addr, data.len()));
        if let Some(fault) = self.fail_read {
            return Err(fault);
        }
        let span = self.span(addr, data.len())?;
        data.copy_from_slice(&self.mem[span]);
        Ok(())
    }

    fn erase(&mut self, addr: u32, num_pages: u32) -> Result<(), Fault> {
        self.ops.push(Op::Erase(addr, num_pages));
        if let Some(fault) = self.fail_erase {
            return Err(fault);
        }
        if addr % self.page_size != 0 {
            return Err(Fault::Misaligned);
        }
        let span = self.span(addr, (num_pages * self.page_size) as usize)?;
        self.mem[span].fill(0xFF);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), Fault> {
        self.ops.push(Op::Write(addr, data.len()));
        if let Some(fault) = self.fail_write {
            return Err(fault);
        }
        let span = self.span(addr, data.len())?;
        let stuck = self.stuck_bits.unwrap_or(0);
        for (cell, byte) in self.mem[span].iter_mut().zip(data) {
            *cell &= *byte | stuck;
        }
        Ok(())
    }
}

#[derive(Debug, Default)]
pub(crate) struct RecordingIndicator {
    pub(crate) configured: bool,
    pub(crate) active: bool,
    pub(crate) history: Vec<bool>,
}

impl ActivityIndicator for RecordingIndicator {
    fn configure(&mut self) {
        self.configured = true;
    }

    fn set_active(&mut self, active: bool) {
        self.active = active;
        self.history.push(active);
    }
}
