/// Raw NVM flash controller.
///
/// Addresses are byte offsets into the flash region. A programmed region must have been erased
/// first; programming can only clear bits.
pub trait NvmFlash {
    type Error: core::fmt::Debug;

    /// Power the controller's bus clock. Platforms without a gated clock keep the default.
    fn enable_clock(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }

    fn init(&mut self) -> Result<(), Self::Error>;

    /// Erase granularity in bytes.
    fn page_size(&self) -> u32;

    fn read(&mut self, addr: u32, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Erase `num_pages` pages starting at `addr`.
    fn erase(&mut self, addr: u32, num_pages: u32) -> Result<(), Self::Error>;

    fn write(&mut self, addr: u32, data: &[u8]) -> Result<(), Self::Error>;
}
