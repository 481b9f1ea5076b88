use core::fmt;

/// Failures reported by the block translator.
///
/// `E` is the error type of the underlying flash peripheral, which is carried through verbatim.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ErrorKind<E> {
    /// Logical block outside the addressable data range.
    InvalidBlock(u32),
    /// Peripheral bring-up failed. Not recoverable at this layer.
    InitFailed(E),
    ReadFailed(E),
    EraseFailed(E),
    WriteFailed(E),
    /// Read back after programming did not match what was written.
    VerifyFailed(u32),
    /// Partition layout cannot be served by this peripheral.
    InvalidGeometry,
    /// Caller supplied buffer is smaller than the requested block range.
    InsufficientSpace,
}

impl<E: fmt::Debug> fmt::Display for ErrorKind<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::InvalidBlock(block) => write!(f, "invalid block {}", block),
            ErrorKind::InitFailed(e) => write!(f, "flash init failed: {:?}", e),
            ErrorKind::ReadFailed(e) => write!(f, "flash read failed: {:?}", e),
            ErrorKind::EraseFailed(e) => write!(f, "flash erase failed: {:?}", e),
            ErrorKind::WriteFailed(e) => write!(f, "flash write failed: {:?}", e),
            ErrorKind::VerifyFailed(block) => write!(f, "verify failed for block {}", block),
            ErrorKind::InvalidGeometry => write!(f, "invalid partition geometry"),
            ErrorKind::InsufficientSpace => write!(f, "buffer too small for block range"),
        }
    }
}
