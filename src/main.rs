use clap::{Parser, Subcommand};
use iconpack::{config, output, pipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "iconpack")]
#[command(about = "Generate an iMessage app icon set as a zip archive")]
#[command(long_about = "\
Generate an iMessage app icon set as a zip archive

Every size is produced by stretching the whole source image onto the whole
target canvas. Sources are not cropped or padded, so a source whose aspect
ratio differs from a target size is distorted.

Sizes:

  square       58x58, 87x87, 1024x1024, 58x58        ← primary image
  rectangular  120x90, 180x135, 134x100, 148x110,     ← secondary image
               54x40, 81x60, 64x48, 96x72, 1024x768     (or primary)

Archive layout:

  icons.zip
  └── icons/
      ├── 58x58.png
      ├── 87x87.png
      └── ...

Run 'iconpack gen-config' to generate a documented iconpack.toml.")]
#[command(version)]
struct Cli {
    /// Config file (TOML); stock defaults are used when omitted
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render every catalog size and write the archive
    Generate {
        /// Image for the square sizes (ideally 1024x1024)
        #[arg(long)]
        primary: PathBuf,
        /// Image for the rectangular sizes (ideally 1024x768); defaults to the primary
        #[arg(long)]
        secondary: Option<PathBuf>,
        /// Archive path [default: archive.file_name from config, icons.zip]
        #[arg(long)]
        out: Option<PathBuf>,
        /// Only print errors
        #[arg(long, short)]
        quiet: bool,
    },
    /// Print the effective size catalogs
    Catalog {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a stock iconpack.toml with all options documented
    GenConfig,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        let mut source = err.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Command::Generate {
            primary,
            secondary,
            out,
            quiet,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let primary_bytes = read_input(&primary)?;
            let secondary_bytes = secondary.as_deref().map(read_input).transpose()?;
            let out = out.unwrap_or_else(|| PathBuf::from(&config.archive.file_name));

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    if quiet {
                        continue;
                    }
                    for line in output::format_pipeline_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::generate(
                &primary_bytes,
                secondary_bytes.as_deref(),
                &config,
                Some(tx),
            );
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;

            let archive = result?;
            archive.write_to(&out).map_err(|e| {
                std::io::Error::new(e.kind(), format!("cannot write {}: {e}", out.display()))
            })?;
            if !quiet {
                println!("==> Wrote {}", out.display());
            }
        }
        Command::Catalog { json } => {
            let config = config::load_config(cli.config.as_deref())?;
            let catalogs = config.catalogs();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalogs)?);
            } else {
                output::print_catalogs(&catalogs);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

fn read_input(path: &std::path::Path) -> std::io::Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| {
        std::io::Error::new(e.kind(), format!("cannot read {}: {e}", path.display()))
    })
}
