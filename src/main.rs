use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use image::ImageReader;
use serde_json::json;

use marksheet::ExamPipeline;
use marksheet::inference::runtime::{RtenDetector, RtenDigitClassifier};

#[derive(Parser)]
#[command(name = "marksheet")]
#[command(about = "Read marks and the student identifier from a photographed exam answer sheet")]
struct Cli {
    /// Path to the answer-sheet image
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// Metadata JSON object passed through to the result (programme, semester, ...)
    #[arg(value_name = "METADATA")]
    metadata: Option<String>,

    /// Path to the region-detector model (.rten)
    #[arg(long, value_name = "FILE", default_value = "models/region-detector.rten")]
    detector_model: PathBuf,

    /// Path to the detector's class-name list, one name per line
    #[arg(long, value_name = "FILE", default_value = "models/region-labels.txt")]
    labels: PathBuf,

    /// Path to the handwritten-digit classifier model (.rten)
    #[arg(long, value_name = "FILE", default_value = "models/digit-classifier.rten")]
    classifier_model: PathBuf,

    /// Directory for annotated output images
    #[arg(long, value_name = "DIR", default_value = "processed_images")]
    output_dir: PathBuf,

    /// Print per-step progress to stderr
    #[arg(short, long)]
    verbose: bool,
}

fn run(args: &Cli) -> anyhow::Result<String> {
    let metadata = match &args.metadata {
        Some(raw) => serde_json::from_str(raw)
            .map_err(|e| anyhow::anyhow!("failed to parse metadata JSON: {e}"))?,
        None => json!({ "programme": "BCA", "semester": "4" }),
    };

    let image = ImageReader::open(&args.image_path)
        .map_err(|e| {
            anyhow::anyhow!("failed to read image {}: {e}", args.image_path.display())
        })?
        .decode()
        .map_err(|e| {
            anyhow::anyhow!("failed to decode image {}: {e}", args.image_path.display())
        })?;

    let detector = RtenDetector::load(&args.detector_model, &args.labels)?;
    let classifier = RtenDigitClassifier::load(&args.classifier_model)?;

    let pipeline = ExamPipeline::new(&detector, &classifier, &args.output_dir)
        .with_verbose(args.verbose);
    let result = pipeline.process(&image, metadata)?;

    Ok(serde_json::to_string(&result)?)
}

fn main() -> ExitCode {
    let args = Cli::parse();
    match run(&args) {
        Ok(payload) => {
            // the result document is the only bytes on stdout
            println!("{payload}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", json!({ "error": format!("{err:#}") }));
            ExitCode::FAILURE
        }
    }
}
