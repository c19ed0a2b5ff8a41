//! msgdesk - submit messages to the intake desk from a shell.
//!
//! ```text
//! msgdesk [--config FILE] submit HEADER [BODY_FILE]   body from stdin when omitted or "-"
//! msgdesk [--config FILE] report                      trending, mentions, SIR and quarantine lists
//! ```
//!
//! Results are printed as JSON on stdout; logs go to stderr.

use std::io::Read;
use std::{env, fs, io};

use anyhow::{bail, Context};
use msgdesk::{Desk, DeskConfig, PipelineError};
use serde_json::json;
use tracing_subscriber::EnvFilter;

const USAGE: &str = "usage: msgdesk [--config FILE] submit HEADER [BODY_FILE] | report";

fn main() -> anyhow::Result<()> {
    init_tracing();

    let mut args: Vec<String> = env::args().skip(1).collect();
    let config = match args.iter().position(|arg| arg == "--config") {
        Some(pos) => {
            let Some(path) = args.get(pos + 1).cloned() else {
                bail!("--config needs a file\n{USAGE}");
            };
            args.drain(pos..=pos + 1);
            DeskConfig::from_file(&path).with_context(|| format!("loading {path}"))?
        }
        None => DeskConfig::default(),
    };

    let desk = Desk::open(&config).context("opening desk")?;

    match args.first().map(String::as_str) {
        Some("submit") => {
            let Some(header) = args.get(1) else {
                bail!("submit needs a header\n{USAGE}");
            };
            let body = read_body(args.get(2).map(String::as_str))?;
            submit(&desk, header, &body)
        }
        Some("report") => {
            let report = json!({
                "trending": desk.snapshot_trending(),
                "mentions": desk.snapshot_mentions(),
                "sir": desk.snapshot_sir(),
                "quarantine": desk.snapshot_quarantine(),
                "messages": desk.snapshot_messages().len(),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
            Ok(())
        }
        _ => bail!("{USAGE}"),
    }
}

fn submit(desk: &Desk, header: &str, body: &str) -> anyhow::Result<()> {
    match desk.submit(header, body) {
        Ok(submission) => {
            println!("{}", serde_json::to_string_pretty(&submission)?);
            Ok(())
        }
        Err(PipelineError::PartiallyCommitted { submission, errors }) => {
            if let Some(submission) = submission {
                println!("{}", serde_json::to_string_pretty(&submission)?);
            }
            for err in &errors {
                eprintln!("not saved: {err}");
            }
            bail!("submission accepted but {} write(s) failed", errors.len())
        }
        Err(err) => Err(err.into()),
    }
}

fn read_body(source: Option<&str>) -> anyhow::Result<String> {
    match source {
        None | Some("-") => {
            let mut body = String::new();
            io::stdin()
                .read_to_string(&mut body)
                .context("reading body from stdin")?;
            Ok(body)
        }
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {path}")),
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = env::var("MSGDESK_LOG_JSON").is_ok_and(|value| value == "1");

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr);

    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}
