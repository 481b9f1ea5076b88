use flashdisk::{Config, FlashDisk, NoIndicator, NvmFlash, BLOCK_SIZE};
use log::{debug, info, LevelFilter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use structopt::StructOpt;

/// Flash dump held in memory while the disk works on it.
struct FileFlash {
    mem: Vec<u8>,
    page_size: u32,
}

impl FileFlash {
    fn load(path: &Path, min_len: usize, page_size: u32) -> io::Result<Self> {
        let mut mem = match fs::read(path) {
            Ok(mem) => mem,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(e),
        };
        if mem.len() < min_len {
            debug!(
                "Padding flash dump from {} to {} bytes with erased cells.",
                mem.len(),
                min_len
            );
            mem.resize(min_len, 0xFF);
        }
        Ok(FileFlash { mem, page_size })
    }

    fn span(&self, addr: u32, len: usize) -> io::Result<std::ops::Range<usize>> {
        let start = addr as usize;
        if start + len > self.mem.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("0x{:x}+{} past end of flash dump", addr, len),
            ));
        }
        Ok(start..start + len)
    }
}

impl NvmFlash for FileFlash {
    type Error = io::Error;

    fn init(&mut self) -> io::Result<()> {
        Ok(())
    }

    fn page_size(&self) -> u32 {
        self.page_size
    }

    fn read(&mut self, addr: u32, data: &mut [u8]) -> io::Result<()> {
        let span = self.span(addr, data.len())?;
        data.copy_from_slice(&self.mem[span]);
        Ok(())
    }

    fn erase(&mut self, addr: u32, num_pages: u32) -> io::Result<()> {
        let span = self.span(addr, (num_pages * self.page_size) as usize)?;
        self.mem[span].fill(0xFF);
        Ok(())
    }

    fn write(&mut self, addr: u32, data: &[u8]) -> io::Result<()> {
        let span = self.span(addr, data.len())?;
        for (cell, byte) in self.mem[span].iter_mut().zip(data) {
            *cell &= *byte;
        }
        Ok(())
    }
}

fn parse_int(src: &str) -> Result<u32, std::num::ParseIntError> {
    match src.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => src.parse(),
    }
}

#[derive(StructOpt)]
#[structopt(name = "flashdisk-image", about = "Convert between flash dumps and disk images.")]
struct Opt {
    /// First logical block of the data partition.
    #[structopt(long, default_value = "1")]
    start_block: u32,
    #[structopt(long)]
    num_blocks: u32,
    /// Byte offset of the partition within the flash dump.
    #[structopt(long, default_value = "0", parse(try_from_str = parse_int))]
    flash_offset: u32,
    #[structopt(long, default_value = "64")]
    page_size: u32,
    /// Read back every block after programming.
    #[structopt(long)]
    verify: bool,
    #[structopt(long, default_value = "info")]
    log_level: LevelFilter,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt)]
enum Command {
    /// Write a disk image, MBR included, from a flash dump.
    Export {
        #[structopt(parse(from_os_str))]
        flash: PathBuf,
        #[structopt(parse(from_os_str))]
        image: PathBuf,
    },
    /// Store the data partition of a disk image into a flash dump.
    Import {
        #[structopt(parse(from_os_str))]
        image: PathBuf,
        #[structopt(parse(from_os_str))]
        flash: PathBuf,
    },
}

fn disk_error<E: std::fmt::Debug>(err: flashdisk::ErrorKind<E>) -> io::Error {
    io::Error::new(io::ErrorKind::Other, err.to_string())
}

fn open_disk(opt: &Opt, flash: &Path) -> io::Result<FlashDisk<FileFlash>> {
    let config = Config::new(opt.start_block, opt.num_blocks, opt.flash_offset)
        .with_write_verify(opt.verify);
    let min_len = opt.flash_offset as usize + opt.num_blocks as usize * BLOCK_SIZE;
    let flash = FileFlash::load(flash, min_len, opt.page_size)?;
    FlashDisk::init(flash, NoIndicator, config).map_err(disk_error)
}

fn export(opt: &Opt, flash: &Path, image: &Path) -> io::Result<()> {
    let mut disk = open_disk(opt, flash)?;
    let count = disk.block_count();
    let mut bytes = vec![0u8; count as usize * BLOCK_SIZE];
    disk.read_blocks(&mut bytes, 0, count).map_err(disk_error)?;
    fs::write(image, &bytes)?;
    info!("Exported {} blocks to {}.", count, image.display());
    Ok(())
}

fn import(opt: &Opt, image: &Path, flash: &Path) -> io::Result<()> {
    let mut disk = open_disk(opt, flash)?;
    let bytes = fs::read(image)?;
    let count = core::cmp::min(disk.block_count() as usize, bytes.len() / BLOCK_SIZE) as u32;
    // Block 0 would be discarded anyway.
    if count > 1 {
        disk.write_blocks(&bytes[BLOCK_SIZE..], 1, count - 1)
            .map_err(disk_error)?;
    }
    disk.flush().map_err(disk_error)?;

    let (flash_dump, _) = disk.release();
    fs::write(flash, &flash_dump.mem)?;
    info!("Imported {} blocks into {}.", count.saturating_sub(1), flash.display());
    Ok(())
}

fn main() -> io::Result<()> {
    let opt = Opt::from_args();

    env_logger::builder()
        .format_timestamp_nanos()
        .filter_level(opt.log_level)
        .init();

    match &opt.cmd {
        Command::Export { flash, image } => export(&opt, flash, image),
        Command::Import { image, flash } => import(&opt, image, flash),
    }
}
