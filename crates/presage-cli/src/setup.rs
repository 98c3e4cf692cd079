//! `presage setup` — downloads the detector weight files and records their
//! integrity digests.

use anyhow::{Context, Result};
use std::fs;
use std::io::{self, Read, Write};
use std::path::Path;

use presage_models::{record_digest, sidecar_path, verify_file, verify_models_dir, ModelFile, MODELS};

/// Download a single weight file with progress output, then record its
/// digest sidecar and move it into place atomically.
fn download_model(model: &ModelFile, dest: &Path) -> Result<()> {
    let tmp_path = dest.with_extension("part");

    println!("  downloading {} ({})...", model.name, model.size_display);

    let resp = ureq::get(model.url)
        .call()
        .with_context(|| format!("failed to download {}", model.url))?;

    let content_length = resp
        .headers()
        .get("Content-Length")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok());

    let mut reader = resp.into_body().into_reader();
    let mut file = fs::File::create(&tmp_path)
        .with_context(|| format!("failed to create {}", tmp_path.display()))?;

    let mut buf = [0u8; 65536];
    let mut total: u64 = 0;
    let mut last_pct: u64 = 0;

    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n])?;
        total += n as u64;

        // Print progress every 10%
        if let Some(len) = content_length {
            let pct = (total * 100) / len;
            if pct / 10 > last_pct / 10 {
                print!("  {pct}%\r");
                io::stdout().flush().ok();
                last_pct = pct;
            }
        }
    }

    file.flush()?;
    drop(file);

    // Record the digest against the temp file, then fix up the sidecar name
    // after the atomic rename.
    print!("  recording digest... ");
    io::stdout().flush().ok();
    let digest = record_digest(&tmp_path)
        .with_context(|| format!("failed to digest {}", tmp_path.display()))?;
    println!("{}", &digest[..12]);

    fs::rename(&tmp_path, dest).with_context(|| {
        format!(
            "failed to rename {} -> {}",
            tmp_path.display(),
            dest.display()
        )
    })?;
    fs::rename(sidecar_path(&tmp_path), sidecar_path(dest))
        .context("failed to move digest sidecar into place")?;

    Ok(())
}

/// Run the setup command: download the weight files and record digests.
pub fn run(model_dir: Option<String>, config_dir: &Path) -> Result<()> {
    let dir = match model_dir {
        Some(d) => std::path::PathBuf::from(d),
        None => config_dir.to_path_buf(),
    };

    println!("Model directory: {}", dir.display());

    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create directory {}", dir.display()))?;

    let mut downloaded = 0;
    let mut skipped = 0;

    for model in MODELS {
        let dest = dir.join(model.name);
        if dest.exists() {
            match verify_file(model.name, &dest) {
                Ok(()) => {
                    println!("  {} already present (digest ok)", model.name);
                    skipped += 1;
                    continue;
                }
                Err(presage_models::ModelIntegrityError::MissingDigest { .. }) => {
                    // File predates setup — adopt it by recording a digest.
                    record_digest(&dest)?;
                    println!("  {} already present (digest recorded)", model.name);
                    skipped += 1;
                    continue;
                }
                Err(_) => {
                    println!("  {} exists but digest differs — re-downloading", model.name);
                }
            }
        }

        download_model(model, &dest)?;
        downloaded += 1;
    }

    // Final pass over the whole directory, the same check a detector
    // implementation runs before loading.
    verify_models_dir(&dir).context("post-setup verification failed")?;

    println!();
    if downloaded > 0 {
        println!("Setup complete: {downloaded} file(s) downloaded, {skipped} already present.");
    } else {
        println!("All weight files already present. Nothing to download.");
    }

    Ok(())
}
