use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use labelcode::{config::Config, parse_code, parse_flag, Column, Encoder, Label, MissingMarkers};
use strum_macros::{Display, EnumString};

#[derive(Clone, Copy, EnumString, Display)]
#[strum(serialize_all = "lowercase")]
pub enum NanPolicy {
    Encode,
    Ignore,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build a mapping from a column file (one value per line)
    Fit {
        column_file: PathBuf,
        /// Existing mapping to extend.
        #[arg(short, long)]
        seed: Option<PathBuf>,
        /// Defaults to <mappings/{column}.json>
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace labels with their codes
    Encode {
        mapping_file: PathBuf,
        column_file: PathBuf,
    },
    /// Replace codes with their labels
    Decode {
        mapping_file: PathBuf,
        codes_file: PathBuf,
    },
    Summary {
        mapping_file: PathBuf,
    },
    SetValue {
        mapping_file: PathBuf,
        label: String,
        value: String,
    },
    AddLabel {
        mapping_file: PathBuf,
        label: String,
        value: String,
    },
    RemoveLabel {
        mapping_file: PathBuf,
        label: String,
    },
    /// Set the code used for missing values
    SetNan {
        mapping_file: PathBuf,
        value: String,
    },
    /// Store whether fits seeded from this mapping skip missing values (true/false)
    IgnoreNans {
        mapping_file: PathBuf,
        flag: String,
    },
}

#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    /// Whether missing values get their own code. Overrides a seed mapping and the config file.
    #[arg(short, long)]
    pub nans: Option<NanPolicy>,
    /// Config file. Defaults to <labelcode.toml> if present.
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub subcommand: Commands,
}

fn column_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "column".to_string())
}

fn read_column(path: &Path, markers: &MissingMarkers) -> anyhow::Result<Column<Label<String>>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Unable to read column file {path:?}"))?;
    Ok(Column::from_lines(column_name(path), &contents, markers))
}

fn load_encoder(path: &Path) -> anyhow::Result<Encoder<String>> {
    log::info!("Loading mapping from {path:?}");
    Encoder::load(path).with_context(|| format!("Unable to load mapping {path:?}"))
}

fn save_encoder(encoder: &Encoder<String>, path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    encoder.save(path)?;
    log::info!("Saved mapping to {path:?}");
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Default to info logging if nothing is set.
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info");
    }

    pretty_env_logger::init();

    let args = Args::parse();
    let config = Config::load(args.config.as_deref())?;
    let markers = config.encoder.markers();
    let nans = args.nans.map(|policy| matches!(policy, NanPolicy::Ignore));

    match args.subcommand {
        Commands::Fit {
            column_file,
            seed,
            output,
        } => {
            let column = read_column(&column_file, &markers)?;
            log::info!(
                "Building mapping for <{}> w/ {} values",
                column.name(),
                column.len()
            );

            let (seed, seed_ignores_nan) = match seed {
                Some(path) => {
                    let seeded = load_encoder(&path)?;
                    (seeded.dict().cloned(), Some(seeded.ignores_nan()))
                }
                None => (None, None),
            };
            let ignore_nan = config.encoder.ignore_nan_for(nans, seed_ignores_nan);

            let mut encoder = Encoder::new();
            encoder.mapping(&column, seed, ignore_nan)?;
            encoder.summary()?;

            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("./mappings/{}.json", column.name())));
            save_encoder(&encoder, &output)?;
        }
        Commands::Encode {
            mapping_file,
            column_file,
        } => {
            let encoder = load_encoder(&mapping_file)?;
            let column = read_column(&column_file, &markers)?;
            if let Some(mapping) = encoder.dict() {
                println!("{}", encoder.encode(&column, mapping));
            }
        }
        Commands::Decode {
            mapping_file,
            codes_file,
        } => {
            let encoder = load_encoder(&mapping_file)?;
            let contents = std::fs::read_to_string(&codes_file)
                .with_context(|| format!("Unable to read codes file {codes_file:?}"))?;
            let column = Column::codes_from_lines(column_name(&codes_file), &contents, &markers);
            if let Some(mapping) = encoder.dict() {
                println!("{}", encoder.decode(&column, mapping));
            }
        }
        Commands::Summary { mapping_file } => {
            load_encoder(&mapping_file)?.summary()?;
        }
        Commands::SetValue {
            mapping_file,
            label,
            value,
        } => {
            let mut encoder = load_encoder(&mapping_file)?;
            println!("{}", encoder.set_value(markers.read(&label), parse_code(&value, &markers)?)?);
            save_encoder(&encoder, &mapping_file)?;
        }
        Commands::AddLabel {
            mapping_file,
            label,
            value,
        } => {
            let mut encoder = load_encoder(&mapping_file)?;
            println!("{}", encoder.add_label(markers.read(&label), parse_code(&value, &markers)?)?);
            save_encoder(&encoder, &mapping_file)?;
        }
        Commands::RemoveLabel {
            mapping_file,
            label,
        } => {
            let mut encoder = load_encoder(&mapping_file)?;
            println!("{}", encoder.remove_label(&markers.read(&label))?);
            save_encoder(&encoder, &mapping_file)?;
        }
        Commands::SetNan {
            mapping_file,
            value,
        } => {
            let mut encoder = load_encoder(&mapping_file)?;
            println!("{}", encoder.set_nan(parse_code(&value, &markers)?)?);
            save_encoder(&encoder, &mapping_file)?;
        }
        Commands::IgnoreNans { mapping_file, flag } => {
            let mut encoder = load_encoder(&mapping_file)?;
            println!("{}", encoder.ignore_nans(parse_flag(&flag)?));
            save_encoder(&encoder, &mapping_file)?;
        }
    }

    Ok(())
}
