//! The `walltag tag` command: score, rename, and optionally write a manifest.

use std::path::{Path, PathBuf};

use clap::{Args, ValueEnum};
use walltag_core::{
    write_manifest, CategoryScorer, CategorySet, ClipEngine, Config, Device, FolderTagger,
    ImageDiscovery, RunReport,
};

/// Arguments for the `tag` command.
#[derive(Args, Debug, Default)]
pub struct TagArgs {
    /// Folder of images to tag
    pub folder: Option<PathBuf>,

    /// Write a CSV manifest (filename,tags) to this path
    #[arg(long, value_name = "CSV")]
    pub tag: Option<PathBuf>,

    /// Number of top-scoring categories to append (defaults to the configured value, 1)
    #[arg(long, value_name = "N")]
    pub top_k: Option<usize>,

    /// Execution device for model inference
    #[arg(long, value_enum)]
    pub device: Option<DeviceArg>,
}

/// Execution device choices exposed on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum DeviceArg {
    /// Pick an accelerator when available, fall back to CPU
    Auto,
    /// Force CPU execution
    Cpu,
    /// CUDA (NVIDIA GPUs)
    Cuda,
    /// CoreML (Apple platforms)
    Coreml,
}

impl From<DeviceArg> for Device {
    fn from(arg: DeviceArg) -> Self {
        match arg {
            DeviceArg::Auto => Device::Auto,
            DeviceArg::Cpu => Device::Cpu,
            DeviceArg::Cuda => Device::Cuda,
            DeviceArg::Coreml => Device::CoreMl,
        }
    }
}

/// Tagging context assembled by setup_tagger().
struct TagContext {
    tagger: FolderTagger<ClipEngine>,
    discovery: ImageDiscovery,
}

/// Execute the tag command.
pub async fn execute(args: TagArgs) -> anyhow::Result<()> {
    let Some(folder) = args.folder.clone() else {
        anyhow::bail!("No folder given.\n\nUsage: walltag <FOLDER> [--tag <CSV>] [--top-k <N>]");
    };

    let ctx = setup_tagger(&args, &folder)?;

    // An empty scan still runs the reporting tail below, so `--tag` on a
    // folder with no images produces a header-only manifest.
    let files = ctx.discovery.scan(&folder)?;
    if files.is_empty() {
        tracing::warn!("No supported image files found in {:?}", folder);
    } else {
        tracing::info!("Found {} image(s) to tag", files.len());
    }

    let progress = create_progress_bar(files.len() as u64);
    let start_time = std::time::Instant::now();
    let mut report = RunReport::new();

    for path in &files {
        match ctx.tagger.process_file(path) {
            Ok(tagged) => {
                progress.println(format!("  {} -> {}", tagged.file_name, tagged.new_name));
                report.record_tagged(tagged);
            }
            Err(e) => {
                let file_name = path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.display().to_string());
                tracing::error!("Failed: {:?} - {}", path, e);
                report.record_failure(file_name, e.to_string());
            }
        }

        // Update progress bar with rate
        progress.inc(1);
        let elapsed = start_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            let rate = report.total() as f64 / elapsed;
            progress.set_message(format!("{:.1} img/sec", rate));
        }
    }

    progress.finish_and_clear();

    write_requested_manifest(&report, args.tag.as_deref())?;

    let elapsed = start_time.elapsed();
    let rate = if elapsed.as_secs_f64() > 0.0 {
        report.tagged_count() as f64 / elapsed.as_secs_f64()
    } else {
        0.0
    };
    print_summary(&report, elapsed, rate);

    Ok(())
}

/// Validate the folder, load config/models, and assemble everything needed
/// for tagging. Label encoding happens here, once, before any image is read.
fn setup_tagger(args: &TagArgs, folder: &Path) -> anyhow::Result<TagContext> {
    if !folder.is_dir() {
        anyhow::bail!(
            "Folder does not exist: {:?}\n\n  Hint: Check the path and try again.",
            folder
        );
    }

    // Load configuration
    let mut config = Config::load()?;

    // Apply CLI overrides
    if let Some(top_k) = args.top_k {
        if top_k == 0 {
            anyhow::bail!("--top-k must be at least 1");
        }
        config.tagging.top_k = top_k;
    }
    if let Some(device) = args.device {
        config.model.device = device.into();
    }

    let categories = CategorySet::new(config.labels.categories.clone())?;

    if !ClipEngine::model_exists(&config.model, &config.model_dir()) {
        anyhow::bail!(
            "Model files for {} not found in {:?}.\n\n  \
             Hint: Run `walltag models download` first.",
            config.model.variant,
            config.model_dir()
        );
    }

    let engine = ClipEngine::load(&config.model, &config.model_dir())?;

    tracing::info!("Encoding {} category labels", categories.len());
    let embeddings = engine.encode_labels(categories.names())?;
    let scorer = CategoryScorer::from_embeddings(categories, embeddings)?;

    let discovery = ImageDiscovery::new(&config.processing);
    let tagger = FolderTagger::new(engine, scorer, config.tagging.top_k);

    Ok(TagContext { tagger, discovery })
}

/// Write the CSV manifest when a path was requested, skip otherwise.
///
/// Called for every completed run, including runs that tagged nothing, so
/// a requested manifest always exists afterwards (header-only at minimum).
fn write_requested_manifest(report: &RunReport, path: Option<&Path>) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    write_manifest(report, path)?;
    tracing::info!("Manifest written to {:?}", path);
    Ok(())
}

/// Create a progress bar for the tagging loop.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary table after the run.
fn print_summary(report: &RunReport, elapsed: std::time::Duration, rate: f64) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Tagged:       {:>8}", report.tagged_count());
    if report.failed_count() > 0 {
        eprintln!("    Failed:       {:>8}", report.failed_count());
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", report.total());
    eprintln!("    Duration:     {:>7.1}s", elapsed.as_secs_f64());
    eprintln!("    Rate:         {:>7.1} img/sec", rate);
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tag_args_default_fields_are_none() {
        let args = TagArgs::default();
        assert!(args.folder.is_none());
        assert!(args.tag.is_none());
        assert!(args.top_k.is_none());
        assert!(args.device.is_none());
    }

    #[test]
    fn device_arg_maps_to_core_device() {
        assert!(matches!(Device::from(DeviceArg::Auto), Device::Auto));
        assert!(matches!(Device::from(DeviceArg::Cpu), Device::Cpu));
        assert!(matches!(Device::from(DeviceArg::Cuda), Device::Cuda));
        assert!(matches!(Device::from(DeviceArg::Coreml), Device::CoreMl));
    }

    #[test]
    fn requested_manifest_on_empty_run_is_header_only() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tags.csv");

        let report = RunReport::new();
        write_requested_manifest(&report, Some(path.as_path())).unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "filename,tags\n");
    }

    #[test]
    fn manifest_skipped_when_no_path_requested() {
        assert!(write_requested_manifest(&RunReport::new(), None).is_ok());
    }

    #[tokio::test]
    async fn execute_without_folder_fails() {
        let err = execute(TagArgs::default()).await.unwrap_err();
        assert!(err.to_string().contains("No folder given"));
    }

    #[tokio::test]
    async fn execute_with_missing_folder_fails() {
        let args = TagArgs {
            folder: Some(PathBuf::from("/nonexistent/walltag_test_dir")),
            ..Default::default()
        };
        let err = execute(args).await.unwrap_err();
        assert!(err.to_string().contains("Folder does not exist"));
    }
}
