use std::io::{BufWriter, Write};
use std::path::{Component, Path, PathBuf};

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use spak_pack::{FormatKind, PakFormat, UcspReader};
use spak_types::ShaderPak;
use tempfile::NamedTempFile;
use walkdir::WalkDir;

use crate::cli::*;
use crate::config::SpakConfig;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = SpakConfig::load(cli.config.as_deref())?;
    match cli.command {
        Command::Pack(args) => cmd_pack(&config, args),
        Command::Unpack(args) => cmd_unpack(&config, args),
        Command::List(args) => cmd_list(&config, args),
        Command::Extract(args) => cmd_extract(&config, args),
        Command::Convert(args) => cmd_convert(&config, args),
    }
}

fn resolve(config: &SpakConfig, arg: Option<FormatArg>) -> FormatKind {
    arg.map(FormatKind::from).unwrap_or(config.format)
}

fn cmd_pack(config: &SpakConfig, args: PackArgs) -> anyhow::Result<()> {
    let kind = resolve(config, args.format);
    let pak = collect_dir(&args.dir)?;
    let codec = kind.codec(config.compressor(args.level));
    write_atomic(codec.as_ref(), &args.output, &pak)?;

    println!(
        "{} Packed {} shaders ({} bytes) into {} [{}]",
        "✓".green().bold(),
        pak.len().to_string().bold(),
        pak.total_bytes(),
        args.output.display(),
        kind.to_string().cyan()
    );
    Ok(())
}

fn cmd_unpack(config: &SpakConfig, args: UnpackArgs) -> anyhow::Result<()> {
    let kind = resolve(config, args.format);
    let pak = load(kind, &args.package)?;

    let mut written = 0usize;
    for (name, bytecode) in pak.iter() {
        let Some(relative) = safe_relative_path(name) else {
            tracing::warn!(name, "skipping shader whose name is not a safe relative path");
            continue;
        };
        let target = args.output.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&target, bytecode)
            .with_context(|| format!("writing {}", target.display()))?;
        written += 1;
    }

    println!(
        "{} Unpacked {} of {} shaders into {}",
        "✓".green().bold(),
        written.to_string().bold(),
        pak.len(),
        args.output.display()
    );
    Ok(())
}

#[derive(Serialize)]
struct ListedShader<'a> {
    name: &'a str,
    bytes: usize,
}

fn cmd_list(config: &SpakConfig, args: ListArgs) -> anyhow::Result<()> {
    let kind = resolve(config, args.format);
    let pak = load(kind, &args.package)?;

    match args.output {
        OutputFormat::Json => {
            let listed: Vec<ListedShader<'_>> = pak
                .iter()
                .map(|(name, bytecode)| ListedShader {
                    name,
                    bytes: bytecode.len(),
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&listed)?);
        }
        OutputFormat::Text => {
            for (name, bytecode) in pak.iter() {
                println!("{:>10}  {}", bytecode.len(), name.yellow());
            }
            println!(
                "{} shaders, {} bytes [{}]",
                pak.len().to_string().bold(),
                pak.total_bytes(),
                kind.to_string().cyan()
            );
        }
    }
    Ok(())
}

fn cmd_extract(config: &SpakConfig, args: ExtractArgs) -> anyhow::Result<()> {
    let kind = resolve(config, args.format);

    let bytecode = match kind {
        // Only the requested entry is read from an indexed package.
        FormatKind::Ucsp => UcspReader::open(&args.package)
            .and_then(|mut reader| reader.read(&args.name))
            .with_context(|| format!("reading {}", args.package.display()))?,
        _ => load(kind, &args.package)?
            .try_get(&args.name)
            .map(<[u8]>::to_vec),
    };
    let Some(bytecode) = bytecode else {
        bail!("no shader named {:?} in {}", args.name, args.package.display());
    };

    std::fs::write(&args.output, &bytecode)
        .with_context(|| format!("writing {}", args.output.display()))?;
    println!(
        "{} Extracted {} ({} bytes) to {}",
        "✓".green().bold(),
        args.name.yellow(),
        bytecode.len(),
        args.output.display()
    );
    Ok(())
}

fn cmd_convert(config: &SpakConfig, args: ConvertArgs) -> anyhow::Result<()> {
    let from = resolve(config, args.from);
    let to = FormatKind::from(args.to);

    let pak = load(from, &args.input)?;
    let codec = to.codec(config.compressor(args.level));
    write_atomic(codec.as_ref(), &args.output, &pak)?;

    println!(
        "{} Converted {} shaders: {} → {}",
        "✓".green().bold(),
        pak.len().to_string().bold(),
        from.to_string().cyan(),
        to.to_string().cyan()
    );
    Ok(())
}

fn load(kind: FormatKind, path: &Path) -> anyhow::Result<ShaderPak> {
    kind.codec(Default::default())
        .load(path)
        .with_context(|| format!("loading {} as {kind}", path.display()))
}

/// Build a package from every regular file under `dir`.
///
/// Shader names are paths relative to `dir` joined with `/`, visited in
/// file-name order so the same tree always packs to the same bytes.
fn collect_dir(dir: &Path) -> anyhow::Result<ShaderPak> {
    let mut pak = ShaderPak::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.with_context(|| format!("walking {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = shader_name(dir, entry.path())?;
        let bytecode = std::fs::read(entry.path())
            .with_context(|| format!("reading {}", entry.path().display()))?;
        tracing::debug!(name = %name, bytes = bytecode.len(), "adding shader");
        pak.add(name, bytecode);
    }
    Ok(pak)
}

fn shader_name(root: &Path, path: &Path) -> anyhow::Result<String> {
    let relative = path.strip_prefix(root)?;
    let mut parts = Vec::new();
    for component in relative.components() {
        match component.as_os_str().to_str() {
            Some(part) => parts.push(part),
            None => bail!("path is not valid UTF-8: {}", path.display()),
        }
    }
    Ok(parts.join("/"))
}

/// Map a shader name to a path that stays inside the output directory.
fn safe_relative_path(name: &str) -> Option<PathBuf> {
    let path = Path::new(name);
    let safe = !name.is_empty()
        && path
            .components()
            .all(|component| matches!(component, Component::Normal(_)));
    safe.then(|| path.to_path_buf())
}

/// Encode into a temporary file beside `output`, then rename over it.
fn write_atomic(codec: &dyn PakFormat, output: &Path, pak: &ShaderPak) -> anyhow::Result<()> {
    let parent = match output.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(parent)
        .with_context(|| format!("creating temporary file in {}", parent.display()))?;
    {
        let mut writer = BufWriter::new(tmp.as_file_mut());
        codec.write(&mut writer, pak)?;
        writer.flush()?;
    }
    tmp.persist(output)
        .with_context(|| format!("writing {}", output.display()))?;
    Ok(())
}
