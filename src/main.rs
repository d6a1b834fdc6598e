use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{anyhow, Result};
use clap::Parser;
use image::{ImageBuffer, Rgb as ImageRgb};
use tiny_jpeg_codec::{compress, decompress, CompressedImage, PixelGrid, Quality};

/// Compresses a 24-bit image, writes the compressed file, then reads it back and writes
/// the reconstructed image next to the input.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// BMP or PNG input
    input: PathBuf,

    /// 1 (smallest) to 99
    #[arg(short, long, default_value_t = Quality::default().value())]
    quality: u8,

    /// Defaults to `<input>.compressed.<quality>`
    #[arg(long)]
    compressed: Option<PathBuf>,

    /// Defaults to `<input>.uncompressed.<quality>.bmp`
    #[arg(short, long)]
    output: Option<PathBuf>,
}

fn with_suffix(path: &Path, suffix: String) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(suffix);
    name.into()
}

fn main() -> Result<()> {
    let args = Args::parse();
    let quality = Quality::new(args.quality as i64)?;

    let compressed_path = args
        .compressed
        .unwrap_or_else(|| with_suffix(&args.input, format!(".compressed.{}", args.quality)));
    let output_path = args
        .output
        .unwrap_or_else(|| with_suffix(&args.input, format!(".uncompressed.{}.bmp", args.quality)));

    let start = Instant::now();
    let img = image::open(&args.input)?.to_rgb8();
    let (w, h) = img.dimensions();
    let grid = PixelGrid::from_raw(w as usize, h as usize, w as usize * 3, img.into_raw())?;
    println!("{}x{} - loaded in {:?}", w, h, start.elapsed());

    let start = Instant::now();
    let compressed = compress(&grid, quality)?;
    compressed.save(&compressed_path)?;
    println!(
        "Compression: {:?}, {} bytes -> {:?}",
        start.elapsed(),
        std::fs::metadata(&compressed_path)?.len(),
        compressed_path
    );

    let start = Instant::now();
    let restored = decompress(&CompressedImage::load(&compressed_path)?)?;
    let buffer: ImageBuffer<ImageRgb<u8>, Vec<u8>> = ImageBuffer::from_raw(
        restored.width() as u32,
        restored.height() as u32,
        restored.to_packed_rgb(),
    )
    .ok_or(anyhow!("reconstructed buffer does not match its dimensions"))?;
    buffer.save(&output_path)?;
    println!("Decompression: {:?} -> {:?}", start.elapsed(), output_path);

    Ok(())
}
