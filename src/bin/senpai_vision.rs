//! senpai-vision: 视觉工具命令行
//!
//! Usage:
//!   senpai-vision tools                                  Print the tool definitions
//!   senpai-vision query <image> <question>               Visual question answering
//!   senpai-vision detect <image> <object> [--out <png>]  Bounding boxes
//!   senpai-vision point <image> <object> [--out <png>]   Center points
//!   senpai-vision caption <image> [--length <len>]       Image description
//!   senpai-vision render <image> <annotations> --out <png>  Draw saved annotations

use anyhow::{anyhow, bail, Context, Result};
use senpai_vision::render::{AnnotatedImage, AnnotationSet, LabelFont, Layout};
use senpai_vision::tools;
use senpai_vision::types::ToolCall;
use senpai_vision::vision::{CaptionLength, VisionOperation};
use senpai_vision::{ImageReference, VisionClient, VisionConfig, VisionToolset};
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[tokio::main]
async fn main() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        print_usage();
        std::process::exit(1);
    }

    let outcome = match args[1].as_str() {
        "tools" => cmd_tools(),
        "query" | "detect" | "point" | "caption" => cmd_vision(&args[1], &args[2..]).await,
        "render" => cmd_render(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("senpai-vision {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    };

    if let Err(e) = outcome {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

fn print_usage() {
    println!(
        r#"senpai-vision: Moondream vision tools

USAGE:
    senpai-vision <COMMAND> [OPTIONS]

COMMANDS:
    tools                               Print tool definitions as JSON
    query <image> <question>            Answer a question about an image
    detect <image> <object>             Locate objects with bounding boxes
    point <image> <object>              Locate object center points
    caption <image>                     Describe an image
    render <image> <annotations>        Draw annotations (JSON file or inline JSON
                                        {{boundingBoxes?, points?, objectLabel?}})
    version                             Show version information
    help                                Show this help message

<image> is an http(s) URL, a data: URI, or a local file path.

OPTIONS:
    --config <path>     YAML config (api_key, base_url, timeout_ms, proxy_url)
    --length <len>      Caption length: short | normal | long
    --stream            Forward the streaming flag to the caption endpoint
    --out <path>        detect/point/render: write the annotated image as PNG
    --width <px>        Displayed width bound for --out
    --font <path>       TTF/OTF font for overlay labels
    --label <text>      Overlay label (defaults to the searched object)

ENVIRONMENT:
    MOONDREAM_API_KEY       API credential (falls back to the OS keyring)
    MOONDREAM_API_BASE      API base URL
    MOONDREAM_TIMEOUT_MS    Per-call deadline in milliseconds
    RUST_LOG                Log filter (logs go to stderr)"#
    );
}

/// Positional arguments plus `--flag value` / `--switch` options.
struct CliArgs {
    positional: Vec<String>,
    config: Option<PathBuf>,
    length: Option<String>,
    stream: bool,
    out: Option<PathBuf>,
    width: Option<u32>,
    font: Option<PathBuf>,
    label: Option<String>,
}

impl CliArgs {
    fn parse(args: &[String]) -> Result<Self> {
        let mut parsed = CliArgs {
            positional: Vec::new(),
            config: None,
            length: None,
            stream: false,
            out: None,
            width: None,
            font: None,
            label: None,
        };
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            let mut value = |flag: &str| {
                iter.next()
                    .cloned()
                    .ok_or_else(|| anyhow!("{flag} requires a value"))
            };
            match arg.as_str() {
                "--config" => parsed.config = Some(PathBuf::from(value("--config")?)),
                "--length" => parsed.length = Some(value("--length")?),
                "--stream" => parsed.stream = true,
                "--out" => parsed.out = Some(PathBuf::from(value("--out")?)),
                "--width" => {
                    let raw = value("--width")?;
                    parsed.width = Some(raw.parse().with_context(|| format!("invalid --width {raw}"))?);
                }
                "--font" => parsed.font = Some(PathBuf::from(value("--font")?)),
                "--label" => parsed.label = Some(value("--label")?),
                flag if flag.starts_with("--") => bail!("unknown option {flag}"),
                _ => parsed.positional.push(arg.clone()),
            }
        }
        Ok(parsed)
    }

    fn positional(&self, index: usize, name: &str) -> Result<&str> {
        self.positional
            .get(index)
            .map(String::as_str)
            .ok_or_else(|| anyhow!("missing <{name}>"))
    }
}

fn load_config(args: &CliArgs) -> Result<VisionConfig> {
    match &args.config {
        Some(path) => VisionConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => Ok(VisionConfig::default()),
    }
}

fn build_toolset(config: VisionConfig) -> Result<VisionToolset> {
    let client = VisionClient::builder().config(config).build()?;
    Ok(VisionToolset::new(Arc::new(client))?)
}

/// Local files become data URIs; URLs and data URIs pass through untouched.
fn image_argument(raw: &str) -> Result<ImageReference> {
    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("data:") {
        return Ok(ImageReference::parse(raw)?);
    }
    ImageReference::from_path(raw).with_context(|| format!("reading image {raw}"))
}

fn cmd_tools() -> Result<()> {
    println!("{}", serde_json::to_string_pretty(&tools::definitions()?)?);
    Ok(())
}

async fn cmd_vision(command: &str, args: &[String]) -> Result<()> {
    let args = CliArgs::parse(args)?;
    let image = image_argument(args.positional(0, "image")?)?;

    let (operation, arguments) = match command {
        "query" => (
            VisionOperation::Query,
            json!({"imageUrl": image.as_str(), "question": args.positional(1, "question")?}),
        ),
        "detect" => (
            VisionOperation::Detect,
            json!({"imageUrl": image.as_str(), "object": args.positional(1, "object")?}),
        ),
        "point" => (
            VisionOperation::Point,
            json!({"imageUrl": image.as_str(), "object": args.positional(1, "object")?}),
        ),
        _ => {
            let mut arguments = json!({"imageUrl": image.as_str()});
            if let Some(length) = &args.length {
                let length: CaptionLength = length.parse()?;
                arguments["length"] = Value::String(length.as_str().to_string());
            }
            if args.stream {
                arguments["stream"] = Value::Bool(true);
            }
            (VisionOperation::Caption, arguments)
        }
    };

    let toolset = build_toolset(load_config(&args)?)?;
    let call = ToolCall::new("cli", operation.tool_name(), arguments);
    let result = match toolset.invoke(&call).await {
        Ok(result) => result,
        Err(e) => {
            // Same shape the model sees.
            println!("{}", serde_json::to_string_pretty(&json!({"error": e.to_string()}))?);
            std::process::exit(1);
        }
    };
    println!("{}", serde_json::to_string_pretty(&result)?);

    if let Some(out) = &args.out {
        let annotations = AnnotationSet::from_result(&result)
            .ok_or_else(|| anyhow!("--out only applies to detect and point"))?;
        render_to_file(image, annotations, &args, out).await?;
        eprintln!("annotated image written to {}", out.display());
    }
    Ok(())
}

async fn cmd_render(args: &[String]) -> Result<()> {
    let args = CliArgs::parse(args)?;
    let image = image_argument(args.positional(0, "image")?)?;
    let raw = args.positional(1, "annotations")?;
    let text = if raw.trim_start().starts_with('{') {
        raw.to_string()
    } else {
        std::fs::read_to_string(raw).with_context(|| format!("reading {raw}"))?
    };
    let annotations: AnnotationSet =
        serde_json::from_str(&text).context("parsing annotations")?;
    let out = args
        .out
        .clone()
        .ok_or_else(|| anyhow!("render requires --out <path>"))?;

    render_to_file(image, annotations, &args, &out).await?;
    eprintln!("annotated image written to {}", out.display());
    Ok(())
}

async fn render_to_file(
    source: ImageReference,
    mut annotations: AnnotationSet,
    args: &CliArgs,
    out: &Path,
) -> Result<()> {
    if let Some(label) = &args.label {
        annotations.label = label.clone();
    }

    let font = match &args.font {
        Some(path) => LabelFont::from_path(path)?,
        None => LabelFont::none(),
    };
    let layout = Layout {
        max_width: args.width,
        ..Layout::default()
    };

    let mut component = AnnotatedImage::new(source, annotations)
        .with_font(font)
        .with_layout(layout);
    component.load(&reqwest::Client::new()).await?;
    let composed = component
        .compose()
        .ok_or_else(|| anyhow!("image did not load"))?;
    composed
        .save_with_format(out, image::ImageFormat::Png)
        .with_context(|| format!("writing {}", out.display()))?;
    Ok(())
}
