use clap::{ArgGroup, Parser};
use std::error::Error;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};

use flexi_logger::Logger;

use contrib_heatmap_reader::heatmap::calendar::write_calendar_json_string;
use contrib_heatmap_reader::heatmap::reader::calendar_from_detection;
use contrib_heatmap_reader::heatmap::{ReaderConfig, Theme, detect_grids};
use contrib_heatmap_reader::plot_grid::save_plot_png;
use contrib_heatmap_reader::synthetic::write_demo_image;

#[derive(Parser, Debug)]
#[command(
    name = "heatmap",
    about = "Read contribution calendars out of heatmap screenshots",
    version,
    group(
        ArgGroup::new("source")
            .required(true)
            .multiple(true)
            .args(["input", "demo"])
    )
)]
struct Cli {
    /// Image file, or directory of images
    #[arg(short = 'i', long = "input")]
    input: Option<PathBuf>,

    /// Target years, paired with detected grids top to bottom
    #[arg(short = 'y', long = "years", value_delimiter = ',', default_values_t = [2022, 2023])]
    years: Vec<i32>,

    /// Palette theme (green or blue)
    #[arg(short = 't', long = "theme")]
    theme: Option<Theme>,

    /// JSON reader config; flags below override it
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Column x tolerance in pixels
    #[arg(long = "tolerance")]
    tolerance: Option<u32>,

    /// Average-y gap that separates grids
    #[arg(long = "gap")]
    gap: Option<f64>,

    /// Smallest region kept as a cell, in pixels
    #[arg(long = "min-region")]
    min_region: Option<usize>,

    /// Write `<stem>_calendar.json` here instead of printing to stdout
    #[arg(short = 'o', long = "out-dir")]
    out_dir: Option<PathBuf>,

    /// Also write a `<stem>_plot.png` detection overlay
    #[arg(long = "plot", short = 'p')]
    plot: bool,

    /// Write a synthetic two-grid heatmap to FILE and exit
    #[arg(long = "demo", value_name = "FILE")]
    demo: Option<PathBuf>,

    /// Log level when RUST_LOG is unset
    #[arg(long = "log-level", default_value = "info")]
    log_level: String,
}

fn is_image_file(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(OsStr::to_str) else {
        return false;
    };
    matches!(
        ext.to_ascii_lowercase().as_str(),
        "png" | "jpg" | "jpeg" | "bmp" | "gif" | "tif" | "tiff" | "webp"
    )
}

fn write_text_file(path: &Path, contents: &str) -> Result<(), Box<dyn Error>> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, contents)?;
    Ok(())
}

fn collect_images(input: &Path) -> Result<Vec<PathBuf>, Box<dyn Error>> {
    if input.is_file() {
        return Ok(vec![input.to_path_buf()]);
    }
    if !input.is_dir() {
        return Err(format!("No such file or directory: {}", input.display()).into());
    }

    let mut images: Vec<PathBuf> = fs::read_dir(input)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| p.is_file() && is_image_file(p))
        .collect();
    images.sort();
    Ok(images)
}

fn build_config(cli: &Cli) -> Result<ReaderConfig, Box<dyn Error>> {
    let mut config = match &cli.config {
        Some(path) => ReaderConfig::from_json_file(path)?,
        None => ReaderConfig::default(),
    };
    if let Some(theme) = cli.theme {
        config.theme = theme;
    }
    if let Some(tolerance) = cli.tolerance {
        config.column_tolerance = tolerance;
    }
    if let Some(gap) = cli.gap {
        config.grid_gap = gap;
    }
    if let Some(min_region) = cli.min_region {
        config.min_region_pixels = min_region;
    }
    config.validate()?;
    Ok(config)
}

fn output_path(cli: &Cli, image_path: &Path, suffix: &str) -> PathBuf {
    let stem = image_path
        .file_stem()
        .and_then(OsStr::to_str)
        .unwrap_or("heatmap");
    let name = format!("{stem}_{suffix}");
    match &cli.out_dir {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}

fn process_image(cli: &Cli, config: &ReaderConfig, image_path: &Path) -> Result<(), Box<dyn Error>> {
    let img = image::open(image_path)
        .map_err(|e| format!("Failed to open {}: {e}", image_path.display()))?;

    let detection = detect_grids(&img, config)?;
    let calendar = calendar_from_detection(&detection, &cli.years, config);
    log::info!(
        "{}: {} regions, {} columns, {} grids, {} years",
        image_path.display(),
        detection.regions.len(),
        detection.columns.len(),
        detection.groups.len(),
        calendar.years().count()
    );

    if cli.plot {
        let out_plot = output_path(cli, image_path, "plot.png");
        if let Some(parent) = out_plot.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        match save_plot_png(&out_plot, &detection, &config.palette()) {
            Ok(()) => log::info!("wrote {}", out_plot.display()),
            Err(e) => log::warn!("{e}"),
        }
    }

    let json = write_calendar_json_string(&calendar)?;
    if cli.out_dir.is_some() {
        let out_json = output_path(cli, image_path, "calendar.json");
        write_text_file(&out_json, &json)?;
        log::info!("wrote {}", out_json.display());
    } else {
        println!("{json}");
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let _logger = Logger::try_with_env_or_str(&cli.log_level)?
        .log_to_stderr()
        .start()?;

    if let Some(demo) = &cli.demo {
        write_demo_image(&demo.to_string_lossy())?;
        log::info!("wrote demo heatmap {}", demo.display());
        return Ok(());
    }

    let Some(input) = &cli.input else {
        return Ok(());
    };

    let config = build_config(&cli)?;
    let images = collect_images(input)?;
    if images.is_empty() {
        log::warn!("No images found in {}", input.display());
        return Ok(());
    }

    let mut failed = 0usize;
    for image_path in &images {
        if let Err(e) = process_image(&cli, &config, image_path) {
            log::error!("{}: {e}", image_path.display());
            failed += 1;
        }
    }

    if failed == images.len() {
        return Err(format!("all {failed} images failed").into());
    }
    Ok(())
}
