use clap::Parser;
use fractriage_core::cli::{init_logging, OutputFormat, TextReport};
use fractriage_core::{
    is_dicom_bytes, mime_from_name, parse_quality_min, preflight, DecisionThresholds,
    HeuristicQualityAssessor, ImageAsset, ImageRsCodec, PreflightReport, TriageConfig,
};
use log::{error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

/// CLI tool for checking a radiograph study before triage
#[derive(Parser, Debug)]
#[command(name = "fractriage")]
#[command(about = "Run local triage checks over a directory of hand/wrist radiographs")]
#[command(version)]
struct Cli {
    /// Directory containing PNG, JPEG or DICOM files
    #[arg(value_name = "DIRECTORY")]
    directory: PathBuf,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Minimum overall quality score accepted
    #[arg(long, env = "QUALITY_MIN")]
    quality_min: Option<String>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if !cli.directory.is_dir() {
        eprintln!("Error: {} is not a directory", cli.directory.display());
        process::exit(1);
    }

    info!("Processing directory: {}", cli.directory.display());

    let files = match collect_image_files(&cli.directory) {
        Ok(files) => files,
        Err(e) => {
            error!("Failed to read directory: {}", e);
            eprintln!("Error: Failed to read directory: {}", e);
            process::exit(1);
        }
    };

    if files.is_empty() {
        eprintln!("Error: No radiographs (.png, .jpg, .jpeg, .dcm) found in directory");
        process::exit(1);
    }

    info!("Found {} image files", files.len());

    let mut assets = Vec::new();
    for path in files {
        match load_asset(&path) {
            Ok(asset) => assets.push(asset),
            Err(e) => warn!("Skipping {}: {}", path.display(), e),
        }
    }

    if assets.is_empty() {
        eprintln!("Error: No image files could be read");
        process::exit(1);
    }

    let config = TriageConfig::default()
        .with_thresholds(DecisionThresholds::from_env())
        .with_quality_min(parse_quality_min(cli.quality_min.as_deref()));

    let assessor = HeuristicQualityAssessor::new(ImageRsCodec).with_threshold(config.quality_min);
    let report = preflight(assets, &assessor, &ImageRsCodec, &config);

    output_report(&report, cli.format);

    if !report.accepted() {
        process::exit(2);
    }
}

fn collect_image_files(directory: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(directory)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }

        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => {
                let ext = ext.to_ascii_lowercase();
                if matches!(ext.as_str(), "png" | "jpg" | "jpeg" | "dcm" | "dicom") {
                    files.push(path);
                }
            }
            None => {
                // Extensionless files are kept only when they carry a DICOM header
                if is_dicom_file(&path) {
                    info!("Found headerless DICOM file: {}", path.display());
                    files.push(path);
                }
            }
        }
    }

    // Upload order matters for dedup, so keep it stable
    files.sort();
    Ok(files)
}

fn is_dicom_file(path: &Path) -> bool {
    use std::io::Read;

    let mut file = match fs::File::open(path) {
        Ok(f) => f,
        Err(_) => return false,
    };

    let mut buffer = [0u8; 132];
    match file.read_exact(&mut buffer) {
        Ok(()) => is_dicom_bytes(&buffer),
        Err(_) => false,
    }
}

fn load_asset(path: &Path) -> std::io::Result<ImageAsset> {
    let bytes = fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime = if is_dicom_bytes(&bytes) {
        "application/dicom"
    } else {
        mime_from_name(&name)
    };
    Ok(ImageAsset::new(name, bytes, mime))
}

fn output_report(report: &PreflightReport, format: OutputFormat) {
    match format {
        OutputFormat::Text => println!("{}", TextReport::new(report)),
        OutputFormat::Json => match serde_json::to_string_pretty(report) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                error!("Failed to serialize to JSON: {}", e);
                eprintln!("Error: Failed to serialize to JSON: {}", e);
                process::exit(1);
            }
        },
    }
}
