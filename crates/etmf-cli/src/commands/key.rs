//! Document version storage key commands.

use anyhow::bail;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use etmf_storage::{VersionKey, build_version_key, extension_of};

use crate::output::{self, OutputFormat};

/// Arguments for key commands
#[derive(Debug, Args)]
pub struct KeyArgs {
    /// Key subcommand
    #[command(subcommand)]
    pub command: KeyCommand,
}

/// Key subcommands
#[derive(Debug, Subcommand)]
pub enum KeyCommand {
    /// Print the storage key for a document version
    Build {
        /// Study identifier
        #[arg(long)]
        study: String,
        /// Folder identifier
        #[arg(long)]
        folder: String,
        /// Document identifier
        #[arg(long)]
        document: String,
        /// Version number
        #[arg(long)]
        version: i32,
        /// Version identifier
        #[arg(long)]
        version_id: String,
        /// Uploaded file name; its extension is used
        #[arg(long)]
        file_name: String,
    },
    /// Split a storage key into its components
    Parse {
        /// Storage key
        key: String,
    },
}

#[derive(Debug, Serialize, Tabled)]
struct KeyRow {
    study: String,
    folder: String,
    document: String,
    version: i32,
    version_id: String,
    extension: String,
}

/// Execute key commands
pub fn execute(args: &KeyArgs, format: OutputFormat) -> anyhow::Result<()> {
    match &args.command {
        KeyCommand::Build {
            study,
            folder,
            document,
            version,
            version_id,
            file_name,
        } => {
            println!(
                "{}",
                build_version_key(study, folder, document, version, version_id, extension_of(file_name))
            );
        }
        KeyCommand::Parse { key } => {
            let Some(parsed) = VersionKey::parse(key) else {
                bail!("'{key}' is not a document version key");
            };
            let row = KeyRow {
                study: parsed.study_id,
                folder: parsed.folder_id,
                document: parsed.document_id,
                version: parsed.version_number,
                version_id: parsed.version_id,
                extension: parsed.extension,
            };
            output::print_list(&[row], format)?;
        }
    }
    Ok(())
}
