use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use colored::Colorize;
use memodb_store::{Odb, OdbConfig, RawObject};
use memodb_types::{ObjectType, Oid};
use serde_json::json;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = load_config(cli.config.as_deref())?;
    match cli.command {
        Command::HashObject(args) => cmd_hash_object(args, &config, cli.format),
        Command::Resolve(args) => cmd_resolve(args, &config, cli.format),
        Command::Stats(args) => cmd_stats(args, &config, cli.format),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<OdbConfig> {
    let Some(path) = path else {
        return Ok(OdbConfig::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    OdbConfig::from_toml_str(&text).with_context(|| format!("parsing config {}", path.display()))
}

/// Write every file into `odb` as an object of `kind`.
fn load_files(
    odb: &mut Odb,
    paths: &[PathBuf],
    kind: ObjectType,
) -> anyhow::Result<Vec<(PathBuf, Oid)>> {
    paths
        .iter()
        .map(|path| {
            let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let oid = odb
                .write(&data, kind)
                .with_context(|| format!("storing {}", path.display()))?;
            Ok((path.clone(), oid))
        })
        .collect()
}

fn resolve(odb: &Odb, prefix: &str) -> anyhow::Result<(Oid, RawObject)> {
    let (short, nibbles) = Oid::from_hex_prefix(prefix)
        .with_context(|| format!("invalid object id prefix {prefix:?}"))?;
    Ok(odb.read_prefix(&short, nibbles)?)
}

fn cmd_hash_object(
    args: HashObjectArgs,
    config: &OdbConfig,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let odb = Odb::from_config(config)?;
    let mut rows = Vec::with_capacity(args.paths.len());
    for path in &args.paths {
        let data = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
        let oid = odb.hash(&data, args.kind)?;
        rows.push((path, oid));
    }

    match format {
        OutputFormat::Text => {
            for (_, oid) in &rows {
                println!("{oid}");
            }
        }
        OutputFormat::Json => {
            let out: Vec<_> = rows
                .iter()
                .map(|(path, oid)| {
                    json!({ "path": path, "oid": oid.to_hex(), "type": args.kind })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_resolve(args: ResolveArgs, config: &OdbConfig, format: OutputFormat) -> anyhow::Result<()> {
    if args.print && format == OutputFormat::Json {
        anyhow::bail!("--print writes raw object content and cannot be combined with --format json");
    }
    let mut odb = Odb::from_config(config)?;
    load_files(&mut odb, &args.paths, args.kind)?;
    let (oid, obj) = resolve(&odb, &args.prefix)?;

    if args.print {
        std::io::stdout().write_all(&obj.data)?;
        return Ok(());
    }
    match format {
        OutputFormat::Text => {
            println!("{} {} {}", oid.to_string().yellow(), obj.kind, obj.len());
        }
        OutputFormat::Json => {
            let out = json!({ "oid": oid.to_hex(), "type": obj.kind, "size": obj.len() });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

fn cmd_stats(args: StatsArgs, config: &OdbConfig, format: OutputFormat) -> anyhow::Result<()> {
    let mut odb = Odb::from_config(config)?;
    let loaded = load_files(&mut odb, &args.paths, args.kind)?;
    let unique: BTreeSet<Oid> = loaded.iter().map(|(_, oid)| *oid).collect();
    let mut bytes = 0usize;
    for oid in &unique {
        bytes += odb.read_header(oid)?.len;
    }

    match format {
        OutputFormat::Text => {
            println!(
                "{} {} files, {} objects, {} bytes",
                "✓".green().bold(),
                loaded.len(),
                unique.len().to_string().bold(),
                bytes
            );
        }
        OutputFormat::Json => {
            let out = json!({
                "files": loaded.len(),
                "objects": unique.len(),
                "bytes": bytes,
                "backends": odb.backend_count(),
            });
            println!("{}", serde_json::to_string_pretty(&out)?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn default_config_without_path() {
        assert_eq!(load_config(None).unwrap(), OdbConfig::default());
    }

    #[test]
    fn config_is_read_from_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "memodb.toml",
            b"[memory]\npriority = 42\ninitial_capacity = 8\n",
        );
        let config = load_config(Some(path.as_path())).unwrap();
        assert_eq!(config.memory.priority, 42);
        assert_eq!(config.memory.initial_capacity, 8);
    }

    #[test]
    fn missing_config_is_an_error() {
        let dir = TempDir::new().unwrap();
        let absent = dir.path().join("absent.toml");
        let err = load_config(Some(absent.as_path())).unwrap_err();
        assert!(err.to_string().contains("reading config"));
    }

    #[test]
    fn loaded_files_resolve_by_prefix() {
        let dir = TempDir::new().unwrap();
        let hello = write_file(&dir, "hello.txt", b"hello");
        let other = write_file(&dir, "other.txt", b"something else");

        let mut odb = Odb::from_config(&OdbConfig::default()).unwrap();
        let loaded = load_files(&mut odb, &[hello, other], ObjectType::Blob).unwrap();
        assert_eq!(loaded[0].1.to_hex(), "b6fc4c620b67d95f953a5c1c1230aaab5db5a1b0");

        let (oid, obj) = resolve(&odb, "b6fc4c62").unwrap();
        assert_eq!(oid, loaded[0].1);
        assert_eq!(obj.data, b"hello");
    }

    #[test]
    fn bad_prefix_is_rejected() {
        let odb = Odb::from_config(&OdbConfig::default()).unwrap();
        assert!(resolve(&odb, "not-hex").is_err());
        assert!(resolve(&odb, "abcd").unwrap_err().to_string().contains("abcd"));
    }

    #[test]
    fn oversized_capacity_in_config_fails_cleanly() {
        let dir = TempDir::new().unwrap();
        let path = write_file(
            &dir,
            "big.toml",
            b"[memory]\ninitial_capacity = 9223372036854775807\n",
        );
        let hello = write_file(&dir, "hello.txt", b"hello");
        let config = load_config(Some(path.as_path())).unwrap();
        let err = cmd_stats(
            StatsArgs {
                kind: ObjectType::Blob,
                paths: vec![hello],
            },
            &config,
            OutputFormat::Text,
        )
        .unwrap_err();
        assert!(err.to_string().contains("out of memory"));
    }

    #[test]
    fn print_conflicts_with_json_output() {
        let dir = TempDir::new().unwrap();
        let hello = write_file(&dir, "hello.txt", b"hello");
        let err = cmd_resolve(
            ResolveArgs {
                prefix: "b6fc".into(),
                paths: vec![hello],
                kind: ObjectType::Blob,
                print: true,
            },
            &OdbConfig::default(),
            OutputFormat::Json,
        )
        .unwrap_err();
        assert!(err.to_string().contains("--print"));
    }

    #[test]
    fn commands_run_against_files() {
        let dir = TempDir::new().unwrap();
        let hello = write_file(&dir, "hello.txt", b"hello");
        let config = OdbConfig::default();

        cmd_hash_object(
            HashObjectArgs {
                kind: ObjectType::Blob,
                paths: vec![hello.clone()],
            },
            &config,
            OutputFormat::Json,
        )
        .unwrap();
        cmd_resolve(
            ResolveArgs {
                prefix: "b6fc".into(),
                paths: vec![hello.clone()],
                kind: ObjectType::Blob,
                print: false,
            },
            &config,
            OutputFormat::Text,
        )
        .unwrap();
        cmd_stats(
            StatsArgs {
                kind: ObjectType::Blob,
                paths: vec![hello.clone(), hello],
            },
            &config,
            OutputFormat::Text,
        )
        .unwrap();
    }
}
