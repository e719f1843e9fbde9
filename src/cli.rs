//! Minimal CLI: provider directory → (ir | merged), dumped schema → ir
use std::path::PathBuf;
use anyhow::Context;
use clap::{Parser, Subcommand, Args};
use serde::Serialize;
use tf_schema_ir::{lower, path_de, source, BodySchema};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// convert Terraform provider schemas into the configuration-contract IR
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// raise log verbosity (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// resolve the providers in a directory and print the IR
    Ir(IrOut),
    /// resolve the providers in a directory and print the merged input schema
    Merged(MergedOut),
    /// lower previously dumped merged schemas
    Lower(LowerOut),
}

#[derive(Args, Debug, Clone)]
struct OutputSettings {
    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// pretty-print the JSON output
    #[arg(long, default_value_t = false)]
    pretty: bool,
}

#[derive(clap::Parser, Debug)]
struct IrOut {
    /// directory holding providers.json and schemas/
    dir: PathBuf,

    #[command(flatten)]
    output: OutputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct MergedOut {
    /// directory holding providers.json and schemas/
    dir: PathBuf,

    #[command(flatten)]
    output: OutputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

#[derive(clap::Parser, Debug)]
struct LowerOut {
    /// One or more merged schema dumps. May be literal paths or quoted glob patterns; later
    /// files win on key collisions
    #[arg(num_args = 1.., required = true)]
    input: Vec<String>,

    #[command(flatten)]
    output: OutputSettings,

    /// debugging
    #[arg(long)]
    no_op: bool,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl OutputSettings {
    fn emit<T: Serialize>(&self, value: &T) -> anyhow::Result<()> {
        let src = if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        };
        let src = src.map_err(tf_schema_ir::Error::from)?;
        if let Some(out) = self.out.as_ref() {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(tf_schema_ir::Error::from)?;
            }
            std::fs::write(out, &src).map_err(tf_schema_ir::Error::from)?;
        } else {
            println!("{src}");
        }
        Ok(())
    }
}

impl LowerOut {
    fn load_bodies(&self) -> anyhow::Result<Vec<BodySchema>> {
        let source_paths = resolve_file_path_patterns(&self.input).context("failed to resolve input file paths")?;
        let mut bodies = Vec::with_capacity(source_paths.len());
        for source_path in source_paths {
            let bytes = std::fs::read(&source_path).map_err(tf_schema_ir::Error::from)?;
            let body = path_de::from_slice_with_path::<BodySchema>(&bytes)
                .with_context(|| format!("failed to decode merged schema ({})", source_path.display()))?;
            bodies.push(body);
        }
        Ok(bodies)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }
    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Ir(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                let ir = tf_schema_ir::generate(&target.dir)?;
                target.output.emit(&ir)
            }
            Command::Merged(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                let merged = source::load_module_schema(&target.dir).map_err(tf_schema_ir::Error::from)?;
                target.output.emit(&merged)
            }
            Command::Lower(target) => {
                // debug path
                if target.no_op {
                    eprintln!("{self:#?}");
                    return Ok(())
                }
                let bodies = target.load_bodies()?;
                let refs: Vec<&BodySchema> = bodies.iter().collect();
                let ir = lower::lower_bodies(&refs).map_err(tf_schema_ir::Error::from)?;
                target.output.emit(&ir)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched = glob::glob(pattern)?.collect::<Result<Vec<_>, _>>()?;
            if matched.is_empty() {
                anyhow::bail!("glob pattern matched no files: {pattern}");
            }
            matched.sort();
            out.extend(matched);
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_subcommands_and_flags() {
        let cli = CommandLineInterface::try_parse_from(["tf-schema-ir", "-v", "ir", "providers", "--pretty", "-o", "ir.json"]).unwrap();
        assert_eq!(cli.verbose, 1);
        let Command::Ir(target) = cli.cmd else { panic!("expected ir") };
        assert_eq!(target.dir, PathBuf::from("providers"));
        assert!(target.output.pretty);
        assert_eq!(target.output.out, Some(PathBuf::from("ir.json")));
    }

    #[test]
    fn lower_requires_an_input() {
        assert!(CommandLineInterface::try_parse_from(["tf-schema-ir", "lower"]).is_err());
    }

    #[test]
    fn glob_patterns_expand_sorted() {
        let dir = TempDir::new().unwrap();
        for name in ["b.json", "a.json", "c.txt"] {
            std::fs::write(dir.path().join(name), "{}").unwrap();
        }
        let pattern = format!("{}/*.json", dir.path().display());
        let literal = dir.path().join("c.txt").display().to_string();
        let paths = resolve_file_path_patterns([pattern.as_str(), literal.as_str()]).unwrap();
        let names: Vec<_> = paths.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.json", "b.json", "c.txt"]);
    }

    #[test]
    fn unmatched_glob_is_an_error() {
        let dir = TempDir::new().unwrap();
        let pattern = format!("{}/*.json", dir.path().display());
        assert!(resolve_file_path_patterns([pattern.as_str()]).is_err());
    }
}
