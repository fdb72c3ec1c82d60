//! vstroke CLI - inspect and convert stroke drawings.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::{LevelFilter, Log, Metadata, Record};
use vstroke::math::{Aabb, Rgba};
use vstroke::{build_all, codec, export, DrawingSettings, QuantizedPalette, Settings};

#[derive(Parser)]
#[command(name = "vstroke")]
#[command(about = "Inspect and convert freehand stroke drawings", long_about = None)]
struct Cli {
    /// More log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show strokes, samples and extents of a drawing
    Info {
        /// Stroke file (.csv is appended if missing)
        file: PathBuf,
    },
    /// Rewrite a drawing with fresh 1-based stroke and point numbers
    Renumber {
        /// Input stroke file
        input: PathBuf,
        /// Output stroke file
        output: PathBuf,
    },
    /// Build every LOD level and report mesh sizes
    Lods {
        /// Stroke file
        file: PathBuf,
        /// Number of LOD levels (overrides the config file)
        #[arg(short, long)]
        levels: Option<u32>,
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Export all strokes at one LOD level as binary STL
    Export {
        /// Stroke file
        input: PathBuf,
        /// Output .stl file
        output: PathBuf,
        /// LOD level to export
        #[arg(short, long, default_value_t = 0)]
        level: u32,
        /// Center the drawing horizontally on its average position
        #[arg(short, long)]
        relative: bool,
        /// Settings file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

/// Writes log records to stderr.
struct StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("[{}] {}", record.level(), record.args());
        }
    }

    fn flush(&self) {}
}

static LOGGER: StderrLogger = StderrLogger;

fn init_logger(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    // a logger may already be installed when embedded; keep it
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(level);
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    match cli.command {
        Commands::Info { file } => show_info(&file)?,
        Commands::Renumber { input, output } => renumber(&input, &output)?,
        Commands::Lods {
            file,
            levels,
            config,
        } => {
            let mut settings = load_settings(config.as_deref())?;
            if let Some(levels) = levels {
                settings.drawing.lod_levels = levels;
            }
            settings.validate()?;
            show_lods(&file, &settings)?;
        }
        Commands::Export {
            input,
            output,
            level,
            relative,
            config,
        } => {
            let mut settings = load_settings(config.as_deref())?.drawing;
            settings.lod_levels = level.saturating_add(1);
            settings.relative_placement |= relative;
            settings.validate()?;
            export_file(&input, &output, &settings)?;
        }
    }

    Ok(())
}

fn load_settings(config: Option<&Path>) -> Result<Settings> {
    match config {
        Some(path) => Settings::load(path).with_context(|| format!("reading {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn decode(file: &Path) -> Result<vstroke::StrokeCollection> {
    codec::decode_path(file).with_context(|| format!("reading {}", file.display()))
}

fn show_info(file: &Path) -> Result<()> {
    let strokes = decode(file)?;

    println!("vstroke drawing: {}", file.display());
    println!("  Strokes: {}", strokes.len());
    println!("  Samples: {}", strokes.sample_count());

    if strokes.is_empty() {
        return Ok(());
    }

    let avg = strokes.average();
    print!("{}", describe_bounds(&strokes.bounds()));
    println!("  Average: ({:.3}, {:.3}, {:.3})", avg.x, avg.y, avg.z);

    println!("\nStrokes:");
    for (i, record) in strokes.iter().enumerate() {
        println!(
            "  {}: {} samples, {:.2} s, length {:.3}",
            i + 1,
            record.len(),
            record.duration(),
            record.path_length()
        );
    }

    Ok(())
}

fn describe_bounds(bounds: &Aabb) -> String {
    let (center, size) = (bounds.center(), bounds.size());
    format!(
        "  Bounds: ({:.3}, {:.3}, {:.3}) .. ({:.3}, {:.3}, {:.3})\n  Center: ({:.3}, {:.3}, {:.3})\n  Size: {:.3} x {:.3} x {:.3}\n",
        bounds.min.x,
        bounds.min.y,
        bounds.min.z,
        bounds.max.x,
        bounds.max.y,
        bounds.max.z,
        center.x,
        center.y,
        center.z,
        size.x,
        size.y,
        size.z
    )
}

fn renumber(input: &Path, output: &Path) -> Result<()> {
    let strokes = decode(input)?;
    codec::encode_path(&strokes, output).with_context(|| format!("writing {}", output.display()))?;
    println!("Wrote {} strokes to {}", strokes.len(), output.display());
    Ok(())
}

fn show_lods(file: &Path, settings: &Settings) -> Result<()> {
    let strokes = decode(file)?;
    let palette = QuantizedPalette::from_settings(&settings.palette);
    let built = build_all(&strokes, &settings.drawing, &palette);
    let materials: HashSet<usize> = built.iter().map(|s| s.material).collect();

    let levels = settings.drawing.lod_levels as usize;
    let mut vertices = vec![0usize; levels];
    let mut triangles = vec![0usize; levels];
    for stroke in &built {
        for lod in &stroke.lods {
            vertices[lod.level as usize] += lod.mesh.vertices().len();
            triangles[lod.level as usize] += lod.mesh.num_triangles();
        }
    }

    println!(
        "{} strokes, {} materials, {} levels",
        built.len(),
        materials.len(),
        levels
    );
    for level in 0..levels {
        println!(
            "  level {} (stride {}): {} vertices, {} triangles",
            level,
            vstroke::ribbon::stride_for_level(level as u32),
            vertices[level],
            triangles[level]
        );
    }
    Ok(())
}

fn export_file(input: &Path, output: &Path, settings: &DrawingSettings) -> Result<()> {
    let strokes = decode(input)?;
    let level = settings.lod_levels.saturating_sub(1) as usize;
    let built = build_all(&strokes, settings, &|_: Rgba| ());
    export::write_stl(output, built.iter().filter_map(|s| s.lods.get(level)).map(|l| &l.mesh))
        .with_context(|| format!("writing {}", output.display()))?;
    println!("Exported STL to {}", output.display());
    Ok(())
}
