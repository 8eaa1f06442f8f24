use std::fs;
use std::io::{self, Read, Write};
use std::sync::Arc;
use std::time::Instant;

use anyhow::Context;
use colored::Colorize;
use ent_registry::DiskProvider;
use ent_server::response::nanos;
use ent_server::{
    file_document, Ent, EntServer, ListOptions, ResponseBucketList, ResponseCreated,
    ResponseDeleted, ResponseFile, ResponseFileList, ServerConfig,
};
use ent_store::{DiskFileSystem, StoreError, DEFAULT_LIMIT};

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let config = resolve_config(&cli)?;
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(config, args),
        Command::Buckets => cmd_buckets(&open_ent(&config)?, format),
        Command::Ls(args) => cmd_ls(&open_ent(&config)?, args, format),
        Command::Put(args) => cmd_put(&open_ent(&config)?, args, format),
        Command::Cat(args) => cmd_cat(&open_ent(&config)?, args),
        Command::Rm(args) => cmd_rm(&open_ent(&config)?, args, format),
    }
}

/// Config file values, overridden by any flag that was given.
fn resolve_config(cli: &Cli) -> anyhow::Result<ServerConfig> {
    let mut config = match &cli.config {
        Some(path) => ServerConfig::load(path)?,
        None => ServerConfig::default(),
    };
    if let Some(fs_root) = &cli.fs_root {
        config.fs_root = fs_root.clone();
    }
    if let Some(provider_dir) = &cli.provider_dir {
        config.provider_dir = provider_dir.clone();
    }
    if let Command::Serve(ServeArgs {
        http_addr: Some(addr),
    }) = &cli.command
    {
        config.bind_addr = *addr;
    }
    Ok(config)
}

fn open_ent(config: &ServerConfig) -> anyhow::Result<Ent> {
    let provider = DiskProvider::load(&config.provider_dir)
        .with_context(|| format!("loading bucket policies from {}", config.provider_dir.display()))?;
    let fs = DiskFileSystem::new(&config.fs_root);
    Ok(Ent::new(Arc::new(provider), Arc::new(fs)))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_file(file: &ResponseFile) {
    let hash = file.hash.as_deref().map(|h| &h[..h.len().min(12)]).unwrap_or("-");
    println!(
        "{}  {}  {}",
        hash.dimmed(),
        file.last_modified.to_rfc3339().cyan(),
        file.key.bold()
    );
}

fn cmd_serve(config: ServerConfig, _args: ServeArgs) -> anyhow::Result<()> {
    let server = EntServer::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(server.serve())?;
    Ok(())
}

fn cmd_buckets(ent: &Ent, format: OutputFormat) -> anyhow::Result<()> {
    let start = Instant::now();
    let buckets = ent.buckets()?;
    match format {
        OutputFormat::Json => print_json(&ResponseBucketList {
            count: buckets.len(),
            duration: nanos(start.elapsed()),
            buckets,
        }),
        OutputFormat::Text => {
            if buckets.is_empty() {
                println!("No buckets registered.");
            }
            for bucket in &buckets {
                println!("{}  {}", bucket.name.yellow().bold(), bucket.owner.email);
            }
            Ok(())
        }
    }
}

fn cmd_ls(ent: &Ent, args: LsArgs, format: OutputFormat) -> anyhow::Result<()> {
    let start = Instant::now();
    let options = ListOptions {
        prefix: args.prefix,
        limit: args.limit.unwrap_or(DEFAULT_LIMIT),
        sort: args.sort.unwrap_or_default(),
    };
    let (bucket, mut files) = ent.list(&args.bucket, &options)?;
    let documents = files
        .iter_mut()
        .map(|file| file_document(&bucket, file.as_mut(), false))
        .collect::<Result<Vec<_>, _>>()?;

    match format {
        OutputFormat::Json => print_json(&ResponseFileList {
            count: documents.len(),
            duration: nanos(start.elapsed()),
            bucket,
            files: documents,
        }),
        OutputFormat::Text => {
            for document in &documents {
                print_file(document);
            }
            println!("{} file(s) in {}", documents.len(), bucket.name.yellow());
            Ok(())
        }
    }
}

fn cmd_put(ent: &Ent, args: PutArgs, format: OutputFormat) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut src: Box<dyn Read> = match (&args.file, args.stdin) {
        (Some(path), _) => Box::new(
            fs::File::open(path).with_context(|| format!("opening {}", path.display()))?,
        ),
        (None, true) => Box::new(io::stdin().lock()),
        (None, false) => return Err(StoreError::EmptySource.into()),
    };

    let (bucket, mut file) = ent.create(&args.bucket, &args.key, &mut src)?;
    let document = file_document(&bucket, file.as_mut(), true)?;
    match format {
        OutputFormat::Json => print_json(&ResponseCreated {
            duration: nanos(start.elapsed()),
            file: document,
        }),
        OutputFormat::Text => {
            println!(
                "{} Stored {}/{}",
                "✓".green().bold(),
                bucket.name.yellow(),
                document.key.bold()
            );
            println!("  Hash: {}", document.hash.as_deref().unwrap_or_default().cyan());
            Ok(())
        }
    }
}

fn cmd_cat(ent: &Ent, args: KeyArgs) -> anyhow::Result<()> {
    let (_, mut file) = ent.open(&args.bucket, &args.key)?;
    let mut stdout = io::stdout().lock();
    io::copy(&mut file, &mut stdout)?;
    stdout.flush()?;
    Ok(())
}

fn cmd_rm(ent: &Ent, args: KeyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let start = Instant::now();
    let document = ent.delete(&args.bucket, &args.key)?;
    match format {
        OutputFormat::Json => print_json(&ResponseDeleted {
            duration: nanos(start.elapsed()),
            file: document,
        }),
        OutputFormat::Text => {
            println!(
                "{} Deleted {}/{}",
                "✓".green().bold(),
                document.bucket.name.yellow(),
                document.key.bold()
            );
            Ok(())
        }
    }
}
