//! Level-1 product inspector.
//!
//! Opens an OLCI or MERIS product directory and prints its structure, the
//! statistics of a band window and the geolocation of a pixel.

use anyhow::{Context, Result};
use clap::Parser;
use raster_reader::{Level1Reader, ReaderConfig};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use product_inspect::report::{default_band, locate_pixel, window_stats};
use product_inspect::{Args, ProductSummary, Report};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if args.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    let config = ReaderConfig::from_env();
    let reader = open(&args, config)?;
    info!(product = %reader.product().name, "Inspecting product");

    let window = match args.window {
        Some(window) => {
            let band = match args.band.as_deref() {
                Some(band) => band,
                None => default_band(&reader).context("Product has no bands")?,
            };
            let window = window.to_window().context("Invalid window")?;
            Some(window_stats(&reader, band, &window)?)
        }
        None => None,
    };
    let pixel = args
        .pixel
        .map(|pixel| locate_pixel(&reader, pixel.x, pixel.y))
        .transpose()?;

    let report = Report {
        product: ProductSummary::from_reader(&reader),
        window,
        pixel,
    };
    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }

    reader.close().context("Failed to close product")?;
    Ok(())
}

#[cfg(feature = "netcdf")]
fn open(args: &Args, config: ReaderConfig) -> Result<Level1Reader> {
    Level1Reader::open_path(&args.path, config)
        .with_context(|| format!("Failed to open product {}", args.path.display()))
}

#[cfg(not(feature = "netcdf"))]
fn open(args: &Args, _config: ReaderConfig) -> Result<Level1Reader> {
    anyhow::bail!(
        "cannot open {}: built without NetCDF support (rebuild with --features netcdf)",
        args.path.display()
    )
}
