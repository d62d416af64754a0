mod cli;

use ladderforge::config;
use lf_av::{FfmpegEncoder, ToolRegistry, TranscodePipeline};
use lf_core::{list_completed_runs, RenditionLadder};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use std::path::{Path, PathBuf};
use std::sync::Arc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG if set. Encode progress lines are printed to stdout by
    // the `encode` command, so their tracing mirror stays quiet by default.
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ladderforge=debug,lf_core=debug,lf_media=debug,lf_av=debug,ladderforge::ffmpeg=trace"
                .to_string()
        } else {
            "ladderforge=info,ladderforge::encode=warn,lf_core=info,lf_media=info,lf_av=info"
                .to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Encode { input, output } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(encode(&input, output, cli.config.as_deref()))
        }
        Commands::List { output, json } => list_runs(output, json, cli.config.as_deref()),
        Commands::Ladder { manifest } => show_ladder(manifest, cli.config.as_deref()),
        Commands::Verify { root } => {
            let rt = tokio::runtime::Runtime::new()?;
            rt.block_on(verify(&root, cli.config.as_deref()))
        }
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
    }
}

async fn encode(input: &Path, output: Option<PathBuf>, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !input.is_file() {
        anyhow::bail!("Input file does not exist: {:?}", input);
    }

    let ladder = config.ladder()?;
    let base = output.unwrap_or_else(|| config.output.base_dir.clone());
    std::fs::create_dir_all(&base)
        .with_context(|| format!("Failed to create output directory: {:?}", base))?;

    let tools = ToolRegistry::discover(&config.tools);
    let encoder = FfmpegEncoder::from_registry(&tools)?;
    tracing::info!("Using ffmpeg at {}", encoder.program().display());

    let pipeline = TranscodePipeline::new(Arc::new(encoder), config.encode.clone(), base);
    let mut handle = pipeline.spawn(input.to_path_buf(), ladder);
    let cancel = handle.cancel_token();

    loop {
        tokio::select! {
            line = handle.next_line() => match line {
                Some(line) => println!("{line}"),
                None => break,
            },
            _ = tokio::signal::ctrl_c(), if !cancel.is_cancelled() => {
                eprintln!("Interrupted; cancelling encode...");
                cancel.cancel();
            }
        }
    }

    let root = handle.finish().await?;
    println!("\nEncoding complete!");
    println!("Output: {}", root.display());
    Ok(())
}

fn list_runs(output: Option<PathBuf>, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let base = output.unwrap_or(config.output.base_dir);

    let runs = list_completed_runs(&base)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No completed runs in {}", base.display());
        return Ok(());
    }

    for run in &runs {
        match lf_media::read_master_manifest(&run.root) {
            Ok(master) => println!(
                "{}  {} renditions  {}",
                run.name,
                master.variants.len(),
                run.manifest.display()
            ),
            Err(e) => {
                tracing::warn!("Unreadable manifest in {}: {}", run.root.display(), e);
                println!("{}  (unreadable manifest)  {}", run.name, run.manifest.display());
            }
        }
    }

    Ok(())
}

fn show_ladder(manifest: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let ladder = config.ladder()?;

    if manifest {
        print!("{}", lf_media::build_master_manifest(ladder.renditions()));
        return Ok(());
    }

    print_ladder(&ladder);
    Ok(())
}

fn print_ladder(ladder: &RenditionLadder) {
    println!(
        "{:<8} {:>10} {:>8} {:>8} {:>8} {:>10} {:>10}  CODECS",
        "NAME", "RESOLUTION", "BITRATE", "MAXRATE", "BUFSIZE", "BANDWIDTH", "AVERAGE"
    );
    for spec in ladder {
        println!(
            "{:<8} {:>10} {:>8} {:>8} {:>8} {:>10} {:>10}  {}",
            spec.name,
            spec.resolution(),
            spec.video_bitrate,
            spec.max_bitrate,
            spec.buffer_size,
            spec.bandwidth,
            spec.average_bandwidth,
            spec.codecs
        );
    }
}

async fn verify(root: &Path, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    let tools = ToolRegistry::discover(&config.tools);
    let ffprobe = tools.require("ffprobe")?;

    let checks = lf_av::verify_run(ffprobe, root).await?;

    let mut mismatches = 0;
    for check in &checks {
        let (w, h) = check.actual;
        if check.matches() {
            println!("✓ {} {}x{}", check.uri, w, h);
        } else {
            mismatches += 1;
            let expected = check
                .expected
                .map(|(ew, eh)| format!("{ew}x{eh}"))
                .unwrap_or_default();
            println!("✗ {} expected {}, got {}x{}", check.uri, expected, w, h);
        }
    }

    if mismatches > 0 {
        anyhow::bail!("{} of {} renditions have the wrong size", mismatches, checks.len());
    }
    println!("\nAll {} renditions match their advertised resolution", checks.len());
    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    println!("Checking external tools...\n");

    let tools = ToolRegistry::discover(&config.tools).check_all();
    let mut ffmpeg_ok = false;

    for tool in &tools {
        let status = if tool.available { "✓" } else { "✗" };
        if tool.name == "ffmpeg" {
            ffmpeg_ok = tool.available;
        }

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if ffmpeg_ok {
        println!("ffmpeg is available; encoding is possible.");
    } else {
        println!("ffmpeg is missing. Install it or set tools.ffmpeg_path in the config.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            config::Config::default()
        }
    };

    let ladder = config.ladder()?;
    println!("  Output base: {}", config.output.base_dir.display());
    println!("  Video encoder: {}", config.encode.video_encoder);
    println!("  Software fallback: {}", config.encode.allow_software_fallback);
    println!("  Renditions: {}", ladder.len());
    for spec in &ladder {
        println!("    {} {}", spec.name, spec.resolution());
    }

    for warning in config.validate() {
        println!("⚠ {}", warning);
    }

    Ok(())
}
