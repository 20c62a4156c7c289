use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "mvs-story", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compile a story into `.mvsj` (no assets) or `.mvsx` (with assets).
    Generate(GenerateArgs),
    /// Compile a story into a self-contained HTML page.
    Html(HtmlArgs),
    /// Write a compressed session blob for a story.
    Session(SessionArgs),
    /// Restore story JSON from a session blob.
    Restore(RestoreArgs),
}

#[derive(Parser, Debug)]
struct StoryInput {
    /// Input story JSON.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Extra asset file to ship with the story (entry name = file name). Repeatable.
    #[arg(long = "asset")]
    assets: Vec<PathBuf>,
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    #[command(flatten)]
    input: StoryInput,

    /// Output path.
    #[arg(long)]
    out: PathBuf,

    /// Interpreter operation budget per scene.
    #[arg(long)]
    max_operations: Option<u64>,
}

#[derive(Parser, Debug)]
struct HtmlArgs {
    #[command(flatten)]
    input: StoryInput,

    /// Output HTML path.
    #[arg(long)]
    out: PathBuf,

    /// Page title (defaults to the story title).
    #[arg(long)]
    title: Option<String>,

    /// Viewer release loaded from the CDN.
    #[arg(long)]
    viewer_version: Option<String>,
}

#[derive(Parser, Debug)]
struct SessionArgs {
    #[command(flatten)]
    input: StoryInput,

    /// Output session path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct RestoreArgs {
    /// Input session blob.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Output story JSON path.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Html(args) => cmd_html(args),
        Command::Session(args) => cmd_session(args),
        Command::Restore(args) => cmd_restore(args),
    }
}

fn read_story(input: &StoryInput) -> anyhow::Result<mvs_story::Story> {
    let f = File::open(&input.in_path)
        .with_context(|| format!("open story '{}'", input.in_path.display()))?;
    let r = BufReader::new(f);
    let mut story: mvs_story::Story =
        serde_json::from_reader(r).with_context(|| "parse story JSON")?;

    for path in &input.assets {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .with_context(|| format!("asset path '{}' has no file name", path.display()))?
            .to_string();
        let content =
            std::fs::read(path).with_context(|| format!("read asset '{}'", path.display()))?;
        story.assets.push(mvs_story::SceneAsset { name, content });
    }

    story.validate()?;
    Ok(story)
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))?;
    eprintln!("wrote {}", path.display());
    Ok(())
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let story = read_story(&args.input)?;

    let mut opts = mvs_story::GenerateOptions::default();
    if let Some(max) = args.max_operations {
        opts.limits.max_operations = max;
    }

    let output = mvs_story::generate_with(&story, &opts)?;
    let expected = output.format();
    if args.out.extension().and_then(|e| e.to_str()) != Some(expected) {
        tracing::warn!(
            out = %args.out.display(),
            format = expected,
            "output extension does not match the produced format"
        );
    }
    write_output(&args.out, &output.to_bytes()?)
}

fn cmd_html(args: HtmlArgs) -> anyhow::Result<()> {
    let story = read_story(&args.input)?;
    let opts = mvs_story::HtmlOptions {
        title: args.title,
        viewer_version: args.viewer_version,
    };
    let html = mvs_story::generate_html(&story, &opts)?;
    write_output(&args.out, html.as_bytes())
}

fn cmd_session(args: SessionArgs) -> anyhow::Result<()> {
    let story = read_story(&args.input)?;
    let bytes = mvs_story::prepare_session_data(&mvs_story::StoryContainer::new(story))?;
    write_output(&args.out, &bytes)
}

fn cmd_restore(args: RestoreArgs) -> anyhow::Result<()> {
    let bytes = std::fs::read(&args.in_path)
        .with_context(|| format!("read session '{}'", args.in_path.display()))?;
    let container = mvs_story::load_session_data(&bytes)?;
    let json =
        serde_json::to_vec_pretty(&container.story).with_context(|| "serialize story JSON")?;
    write_output(&args.out, &json)
}
