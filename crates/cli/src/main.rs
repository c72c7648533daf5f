use anyhow::Result;
use clap::{Parser, Subcommand};
use fwident::commands;
use tracing_subscriber::EnvFilter;

/// Firmware identification CLI.
///
/// This CLI is a thin wrapper around `fwident-core`. All substantive logic
/// lives in the library so it can be tested thoroughly and reused from
/// other frontends.
#[derive(Parser, Debug)]
#[command(
    name = "fwident",
    version,
    about = "Identify ECU firmware images against a catalog",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize a new identification store at the given root.
    ///
    /// This will:
    /// - Create a `.fwident` metadata directory.
    /// - Write a `.fwident/ident.json` config file with the default stoplist.
    /// - Create an empty catalog database.
    Init {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Optional store name. If omitted, derived from the root directory.
        #[arg(long)]
        name: Option<String>,
    },

    /// Show basic information about an existing store.
    StoreInfo {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,
    },

    /// Register a single firmware record in the catalog.
    AddFirmware {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Vehicle brand (Toyota, BMW, ...).
        #[arg(long)]
        brand: String,

        /// Model/series (Prius 1.8, X5 3.0d, ...).
        #[arg(long)]
        series: Option<String>,

        /// ECU manufacturer (Bosch, Denso, ...).
        #[arg(long)]
        ecu_brand: Option<String>,

        /// Vendor software/calibration number (the lookup key).
        #[arg(long)]
        software_id: Option<String>,

        /// Hardware number.
        #[arg(long)]
        hardware_id: Option<String>,

        /// Original image size in bytes.
        #[arg(long)]
        file_size: Option<i64>,

        /// Price for the tuned file.
        #[arg(long)]
        price: Option<f64>,
    },

    /// Bulk-import firmware records from a JSON array file.
    ///
    /// Records whose software_id already exists are skipped, so re-running
    /// an import is safe.
    ImportCatalog {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the JSON file to import.
        #[arg(long)]
        file: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List all firmware records in the catalog.
    ListFirmwares {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show aggregate catalog statistics.
    Stats {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Identify a firmware image file against the catalog.
    ///
    /// Tries smart filename tokens first, then byte signatures, then the
    /// printable-string fallback, then filename regex candidates. Records
    /// the attempt in the store either way.
    Identify {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Path to the firmware image (.bin).
        file: String,

        /// Original upload filename, when it differs from the local path.
        #[arg(long)]
        filename: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Identify firmware from OCR-derived screenshot text.
    MatchText {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// The OCR text itself.
        #[arg(long)]
        text: Option<String>,

        /// Read the OCR text from a file instead.
        #[arg(long)]
        text_file: Option<String>,

        /// OCR engine name, recorded for diagnostics only.
        #[arg(long)]
        provider: Option<String>,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// Show what a filename alone would contribute: candidates and smart
    /// tokens. Debug helper for tuning patterns and the stoplist.
    FilenameIds {
        /// The upload filename to analyze.
        name: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },

    /// List recorded identification requests.
    Requests {
        /// Store root directory. Defaults to the current working directory.
        #[arg(long, default_value = ".")]
        root: String,

        /// Emit JSON instead of human-readable text.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Init { root, name } => commands::init_command(&root, name)?,
        Command::StoreInfo { root } => commands::store_info_command(&root)?,
        Command::AddFirmware {
            root,
            brand,
            series,
            ecu_brand,
            software_id,
            hardware_id,
            file_size,
            price,
        } => commands::add_firmware_command(
            &root,
            &brand,
            series,
            ecu_brand,
            software_id,
            hardware_id,
            file_size,
            price,
        )?,
        Command::ImportCatalog { root, file, json } => {
            commands::import_catalog_command(&root, &file, json)?
        }
        Command::ListFirmwares { root, json } => commands::list_firmwares_command(&root, json)?,
        Command::Stats { root, json } => commands::stats_command(&root, json)?,
        Command::Identify { root, file, filename, json } => {
            commands::identify_command(&root, &file, filename, json)?
        }
        Command::MatchText { root, text, text_file, provider, json } => {
            commands::match_text_command(&root, text, text_file, provider, json)?
        }
        Command::FilenameIds { name, json } => commands::filename_ids_command(&name, json)?,
        Command::Requests { root, json } => commands::requests_command(&root, json)?,
    }

    Ok(())
}
