use clap::{Parser, Subcommand};

use radix_cli::commands::pack_ops::{Keep, PackOverrides};
use radix_cli::commands::{config_ops, pack_ops};
use radix_cli::entry_source::EntryFormat;

#[derive(Parser)]
#[command(name = "packtool", about = "Radix trie pack/search tool")]
struct Cli {
    /// Settings TOML to use instead of the built-in defaults
    #[arg(long, global = true)]
    config: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Pack an entry file into the text format
    Pack {
        /// Entry file (JSON, TSV or one text per line)
        input: String,
        /// Output file
        output: String,
        /// Input layout (default: from the file extension)
        #[arg(long, value_enum)]
        format: Option<EntryFormat>,
        /// Match case exactly instead of folding it
        #[arg(long)]
        case_sensitive: bool,
        /// Decimal places kept for scores
        #[arg(long)]
        precision: Option<u8>,
        /// Emit the version 1 layout for old readers
        #[arg(long)]
        legacy: bool,
        /// Which score to keep when normalized texts collide
        #[arg(long, value_enum)]
        keep: Option<Keep>,
    },
    /// Print every entry of a packed file as TSV
    Unpack {
        /// Packed file
        packed: String,
    },
    /// Prefix search in a packed file
    Search {
        /// Packed file
        packed: String,
        /// Prefix to complete
        prefix: String,
        /// Number of results (default: search.default_limit)
        #[arg(short, long)]
        n: Option<usize>,
    },
    /// Show format and tree statistics of a packed file
    Info {
        /// Packed file
        packed: String,
    },
    /// Download a packed file, validating it before writing
    Fetch {
        /// Source URL
        url: String,
        /// Output file
        output: String,
    },
    /// Export default settings as TOML
    SettingsExport,
    /// Validate a custom settings TOML file
    SettingsValidate {
        /// Path to the TOML file
        file: String,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Some(config) = &cli.config {
        config_ops::load_config(config);
    }

    match cli.command {
        Command::Pack {
            input,
            output,
            format,
            case_sensitive,
            precision,
            legacy,
            keep,
        } => {
            let overrides = PackOverrides {
                case_sensitive,
                precision,
                legacy,
                keep,
            };
            pack_ops::pack(&input, &output, format, &overrides);
        }
        Command::Unpack { packed } => pack_ops::unpack_cmd(&packed),
        Command::Search { packed, prefix, n } => pack_ops::search(&packed, &prefix, n),
        Command::Info { packed } => pack_ops::info(&packed),
        Command::Fetch { url, output } => pack_ops::fetch(&url, &output),
        Command::SettingsExport => config_ops::settings_export(),
        Command::SettingsValidate { file } => config_ops::settings_validate(&file),
    }
}
