//! Command-line arguments.

use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use product_common::{ProductResult, RasterWindow};

#[derive(Parser, Debug)]
#[command(name = "product-inspect")]
#[command(about = "Inspect OLCI and MERIS level-1 product directories")]
pub struct Args {
    /// Product directory, its xfdumanifest.xml, or a zipped product
    pub path: PathBuf,

    /// Window to summarise, as x,y,width,height
    #[arg(long)]
    pub window: Option<WindowArg>,

    /// Band to summarise (default: first spectral band)
    #[arg(long)]
    pub band: Option<String>,

    /// Pixel to geolocate, as x,y
    #[arg(long)]
    pub pixel: Option<PixelArg>,

    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,

    /// Log level
    #[arg(long, default_value = "warn", env = "LOG_LEVEL")]
    pub log_level: String,

    /// Emit logs as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

/// A window argument, `x,y,width,height`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowArg {
    pub x: usize,
    pub y: usize,
    pub width: usize,
    pub height: usize,
}

impl WindowArg {
    pub fn to_window(self) -> ProductResult<RasterWindow> {
        RasterWindow::new(self.x, self.y, self.width, self.height)
    }
}

impl FromStr for WindowArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_numbers(s)?.as_slice() {
            &[x, y, width, height] => Ok(Self { x, y, width, height }),
            _ => Err(format!("expected x,y,width,height, got '{}'", s)),
        }
    }
}

/// A pixel argument, `x,y`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelArg {
    pub x: usize,
    pub y: usize,
}

impl FromStr for PixelArg {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match parse_numbers(s)?.as_slice() {
            &[x, y] => Ok(Self { x, y }),
            _ => Err(format!("expected x,y, got '{}'", s)),
        }
    }
}

fn parse_numbers(s: &str) -> Result<Vec<usize>, String> {
    s.split(',')
        .map(|part| {
            part.trim()
                .parse::<usize>()
                .map_err(|_| format!("'{}' is not a non-negative integer", part.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_and_pixel() {
        assert_eq!(
            "10, 20,30,40".parse::<WindowArg>().unwrap(),
            WindowArg {
                x: 10,
                y: 20,
                width: 30,
                height: 40
            }
        );
        assert_eq!("3,4".parse::<PixelArg>().unwrap(), PixelArg { x: 3, y: 4 });
    }

    #[test]
    fn test_parse_rejects_malformed_values() {
        assert!("1,2,3".parse::<WindowArg>().is_err());
        assert!("1,-2".parse::<PixelArg>().is_err());
        assert!("a,b".parse::<PixelArg>().is_err());
    }

    #[test]
    fn test_args_from_command_line() {
        let args = Args::try_parse_from([
            "product-inspect",
            "/data/S3A_OL_1_EFR.SEN3",
            "--window",
            "0,0,16,8",
            "--pixel",
            "5,6",
            "--json",
        ])
        .unwrap();
        assert_eq!(args.path, PathBuf::from("/data/S3A_OL_1_EFR.SEN3"));
        assert_eq!(args.window.map(|w| w.width), Some(16));
        assert_eq!(args.pixel, Some(PixelArg { x: 5, y: 6 }));
        assert!(args.json);
        assert_eq!(args.band, None);
    }

    #[test]
    fn test_empty_window_is_rejected() {
        let window: WindowArg = "0,0,0,8".parse().unwrap();
        assert!(window.to_window().is_err());
    }
}
