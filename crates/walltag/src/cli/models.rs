//! The `walltag models` command for managing CLIP models.

use clap::{Args, Subcommand};
use std::path::Path;
use walltag_core::pipeline::content_hash;
use walltag_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    #[command(subcommand)]
    pub command: ModelsCommand,
}

/// Subcommands for model management.
#[derive(Subcommand, Debug)]
pub enum ModelsCommand {
    /// Download a model variant (vision encoder + text encoder + tokenizer)
    Download {
        /// Variant to download (defaults to the configured one)
        #[arg(long)]
        variant: Option<String>,
    },

    /// List installed models
    List,

    /// Show model directory path
    Path,
}

/// Available CLIP model variants.
struct ModelVariant {
    name: &'static str,
    label: &'static str,
    repo: &'static str,
}

const VARIANTS: &[ModelVariant] = &[
    ModelVariant {
        name: "clip-vit-base-patch32",
        label: "ViT-B/32",
        repo: "Xenova/clip-vit-base-patch32",
    },
    ModelVariant {
        name: "clip-vit-base-patch16",
        label: "ViT-B/16",
        repo: "Xenova/clip-vit-base-patch16",
    },
];

/// Local filenames.
const VISUAL_MODEL_LOCAL_NAME: &str = "visual.onnx";
const TEXT_MODEL_LOCAL_NAME: &str = "text_model.onnx";
const TOKENIZER_LOCAL_NAME: &str = "tokenizer.json";

/// Remote path in the Hugging Face repo, and the local name it lands under.
const MODEL_FILES: &[(&str, &str)] = &[
    ("onnx/vision_model.onnx", VISUAL_MODEL_LOCAL_NAME),
    ("onnx/text_model.onnx", TEXT_MODEL_LOCAL_NAME),
    ("tokenizer.json", TOKENIZER_LOCAL_NAME),
];

/// Execute the models command.
pub async fn execute(args: ModelsArgs) -> anyhow::Result<()> {
    let config = Config::load()?;

    match args.command {
        ModelsCommand::Download { variant } => {
            let variant_name = variant.unwrap_or_else(|| config.model.variant.clone());
            let Some(variant) = find_variant(&variant_name) else {
                anyhow::bail!(
                    "Unknown model variant: {variant_name}\n  Known variants: {}",
                    VARIANTS
                        .iter()
                        .map(|v| v.name)
                        .collect::<Vec<_>>()
                        .join(", ")
                );
            };

            let client = reqwest::Client::new();
            download_variant(variant, &config, &client).await?;

            tracing::info!("All downloads complete.");
        }

        ModelsCommand::List => {
            let model_dir = config.model_dir();

            if !model_dir.exists() {
                println!("No models installed.");
                println!("Run `walltag models download` to download the default model.");
                return Ok(());
            }

            println!("Installed models:");
            println!("  Directory: {}\n", model_dir.display());

            for variant in VARIANTS {
                let status = variant_status(&model_dir.join(variant.name));
                let default_marker = if variant.name == config.model.variant {
                    "  (default)"
                } else {
                    ""
                };
                println!("    - {:30} {:14}{}", variant.name, status, default_marker);
            }
        }

        ModelsCommand::Path => {
            let model_dir = config.model_dir();
            println!("{}", model_dir.display());
        }
    }

    Ok(())
}

/// Download all three model files for a variant. Skips files already on disk.
async fn download_variant(
    variant: &ModelVariant,
    config: &Config,
    client: &reqwest::Client,
) -> anyhow::Result<()> {
    let variant_dir = config.model_dir().join(variant.name);
    std::fs::create_dir_all(&variant_dir)?;

    tracing::info!("Downloading {} ({})...", variant.label, variant.name);

    for (remote_path, local_name) in MODEL_FILES {
        let dest = variant_dir.join(local_name);

        if dest.exists() {
            tracing::info!("{} already exists at {:?}", local_name, dest);
            continue;
        }

        let url = format!(
            "https://huggingface.co/{}/resolve/main/{}",
            variant.repo, remote_path
        );

        tracing::info!("Downloading {}...", local_name);
        tracing::info!("  Source: {}", url);
        tracing::info!("  Destination: {:?}", dest);

        download_file(client, &url, &dest).await?;

        let file_size = std::fs::metadata(&dest)?.len();
        tracing::info!(
            "  {} complete ({:.1} MB)",
            local_name,
            file_size as f64 / (1024.0 * 1024.0)
        );
    }

    Ok(())
}

/// Download a file from a URL to a local path, streaming to disk.
///
/// The BLAKE3 digest of the completed file is logged so a download can be
/// audited later. On stream failure the partial file is removed.
async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> anyhow::Result<()> {
    let response = client
        .get(url)
        .send()
        .await?
        .error_for_status()
        .map_err(|e| anyhow::anyhow!("Download failed: {e}"))?;

    let total_size = response.content_length();
    if let Some(size) = total_size {
        tracing::info!("  Size: {:.1} MB", size as f64 / (1024.0 * 1024.0));
    }

    if let Err(e) = stream_to_disk(response, dest, total_size).await {
        // Never leave a truncated model on disk
        let _ = std::fs::remove_file(dest);
        return Err(e);
    }

    let digest = content_hash(dest)?;
    tracing::info!("  BLAKE3: {digest}");

    Ok(())
}

/// Write a response body to `dest`, logging progress every 50 MB.
async fn stream_to_disk(
    response: reqwest::Response,
    dest: &Path,
    total_size: Option<u64>,
) -> anyhow::Result<()> {
    use futures_util::StreamExt;
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(dest).await?;
    let mut stream = response.bytes_stream();
    let mut downloaded: u64 = 0;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk).await?;
        downloaded += chunk.len() as u64;

        if let Some(total) = total_size {
            if downloaded % (50 * 1024 * 1024) < chunk.len() as u64 {
                tracing::info!(
                    "  Progress: {:.0}%",
                    downloaded as f64 / total as f64 * 100.0
                );
            }
        }
    }

    file.flush().await?;
    Ok(())
}

/// Look up a variant by its directory name.
fn find_variant(name: &str) -> Option<&'static ModelVariant> {
    VARIANTS.iter().find(|v| v.name == name)
}

/// Install status for a variant directory.
fn variant_status(variant_dir: &Path) -> &'static str {
    let present = [
        VISUAL_MODEL_LOCAL_NAME,
        TEXT_MODEL_LOCAL_NAME,
        TOKENIZER_LOCAL_NAME,
    ]
    .iter()
    .filter(|file| variant_dir.join(file).exists())
    .count();

    match present {
        3 => "ready",
        0 => "not installed",
        _ => "partial",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_variant_known_name() {
        let variant = find_variant("clip-vit-base-patch32").unwrap();
        assert_eq!(variant.repo, "Xenova/clip-vit-base-patch32");
        assert_eq!(variant.label, "ViT-B/32");
    }

    #[test]
    fn find_variant_unknown_name() {
        assert!(find_variant("clip-vit-large").is_none());
    }

    #[test]
    fn variant_status_reflects_files_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(variant_status(dir.path()), "not installed");

        std::fs::write(dir.path().join(VISUAL_MODEL_LOCAL_NAME), b"x").unwrap();
        assert_eq!(variant_status(dir.path()), "partial");

        std::fs::write(dir.path().join(TEXT_MODEL_LOCAL_NAME), b"x").unwrap();
        std::fs::write(dir.path().join(TOKENIZER_LOCAL_NAME), b"x").unwrap();
        assert_eq!(variant_status(dir.path()), "ready");
    }
}
