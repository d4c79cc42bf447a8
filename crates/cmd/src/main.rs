// SPDX-FileCopyrightText: 2025 Caspar Water Company
//
// SPDX-License-Identifier: Apache-2.0

use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use cmd::{
    LensContext, OutputFormat, QueryArgs, add_command, list_command, paste_command, query_command,
    rm_command,
};
use lens::FileFormat;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(name = "lens")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Lens home directory (overrides LENS_HOME)
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Do not install the SQLite extension; database files cannot be attached
    #[arg(long, global = true)]
    offline: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Upload a file as a new data source
    Add {
        path: PathBuf,
        /// Table or schema name (defaults to one derived from the file name)
        #[arg(long)]
        name: Option<String>,
        /// Data source id (generated when omitted)
        #[arg(long)]
        id: Option<String>,
    },
    /// Upload text read from stdin
    Paste {
        #[arg(long)]
        name: String,
        /// csv, tsv, json or jsonl; detected when omitted
        #[arg(long)]
        format: Option<FileFormat>,
    },
    /// List data sources
    List,
    /// Remove a data source and its stored file
    Rm { id: String },
    /// Run a query and print one page of the result
    Query {
        sql: String,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
        #[arg(long)]
        page_size: Option<usize>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    diagnostics::init_diagnostics();
    let cli = Cli::parse();

    let context = LensContext {
        home: cli.home,
        offline: cli.offline,
    };
    let mut session = context.open_session().await?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Add { path, name, id } => {
            let _ = add_command(&mut session, &path, name.as_deref(), id.as_deref(), &mut out)
                .await?;
        }
        Commands::Paste { name, format } => {
            let mut text = String::new();
            let _ = io::stdin().read_to_string(&mut text)?;
            let _ = paste_command(&mut session, &text, &name, format, &mut out).await?;
        }
        Commands::List => list_command(&session, &mut out).await?,
        Commands::Rm { id } => rm_command(&mut session, &id, &mut out).await?,
        Commands::Query {
            sql,
            page,
            page_size,
            format,
        } => {
            let args = QueryArgs {
                sql,
                page,
                page_size,
                format,
            };
            query_command(&session, &args, &mut out).await?;
        }
    }

    out.flush()?;
    Ok(())
}
