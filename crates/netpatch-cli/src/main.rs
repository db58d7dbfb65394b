// SPDX-License-Identifier: Apache-2.0
//! netpatch CLI.
//!
//! Loads the patch network, the frozen reference network, and the four
//! per-category diff documents; runs the patch engine; writes the merged
//! network; then invokes the external consistency validator (`netconvert`)
//! with the written output. Validator failure is reported with a non-zero
//! exit status, but the written output is retained either way.

use std::path::PathBuf;
use std::process::Command;

use anyhow::{bail, Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use netpatch_core::{apply_patch, Category, DiffSet};
use netpatch_xml::{read_diff_file, read_network_file, write_network_file};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Apply per-category diff documents to a road-network document"
)]
struct Args {
    /// Network document to patch
    #[arg(long)]
    patch: PathBuf,
    /// Frozen reference network supplying content for bare-key upserts
    #[arg(long)]
    reference: PathBuf,
    /// Destination for the patched network
    #[arg(long, short)]
    output: PathBuf,
    /// Node diff document
    #[arg(long, default_value = "diff.nod.xml")]
    diff_node: PathBuf,
    /// Edge diff document
    #[arg(long, default_value = "diff.edg.xml")]
    diff_edge: PathBuf,
    /// Connection diff document
    #[arg(long, default_value = "diff.con.xml")]
    diff_connection: PathBuf,
    /// Traffic-light program diff document
    #[arg(long, default_value = "diff.tll.xml")]
    diff_tls: PathBuf,
    /// Validator binary invoked with the written output
    #[arg(long, default_value = "netconvert")]
    netconvert: PathBuf,
    /// Skip the post-patch validator run
    #[arg(long)]
    no_validate: bool,
    /// Keep the validator's regenerated network next to the output instead
    /// of discarding it with the temporary directory
    #[arg(long)]
    keep_check_output: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    // All five inputs must parse before anything is mutated or written;
    // partial output is meaningless without the full input set.
    let patch = read_network_file(&args.patch)
        .with_context(|| format!("reading patch network `{}`", args.patch.display()))?;
    let reference = read_network_file(&args.reference)
        .with_context(|| format!("reading reference network `{}`", args.reference.display()))?;
    let diffs = DiffSet {
        node: read_diff_file(&args.diff_node, Category::Node)
            .with_context(|| format!("reading node diff `{}`", args.diff_node.display()))?,
        edge: read_diff_file(&args.diff_edge, Category::Edge)
            .with_context(|| format!("reading edge diff `{}`", args.diff_edge.display()))?,
        connection: read_diff_file(&args.diff_connection, Category::Connection).with_context(
            || format!("reading connection diff `{}`", args.diff_connection.display()),
        )?,
        tls: read_diff_file(&args.diff_tls, Category::TlLogic)
            .with_context(|| format!("reading traffic-light diff `{}`", args.diff_tls.display()))?,
    };

    let outcome = apply_patch(patch, &reference, &diffs);
    for diagnostic in &outcome.report.diagnostics {
        warn!("{diagnostic}");
    }
    for program in &outcome.report.cascaded_programs {
        info!("removed traffic-light program `{program}` and its connections");
    }

    write_network_file(&args.output, &outcome.document)
        .with_context(|| format!("writing patched network `{}`", args.output.display()))?;
    info!(
        deleted = outcome.report.deleted,
        upserted = outcome.report.upserted,
        output = %args.output.display(),
        "patched network written"
    );

    if !args.no_validate {
        validate(&args)?;
    }
    Ok(())
}

/// Runs the external consistency check: regenerate a network from the
/// written output and report success or failure. The check is off the
/// critical path — the patched document stays on disk regardless.
fn validate(args: &Args) -> Result<()> {
    let mut tempdir = None;
    let check_output = if args.keep_check_output {
        args.output.with_extension("check.net.xml")
    } else {
        let dir = tempfile::tempdir().context("creating temporary directory")?;
        let path = dir.path().join("check.net.xml");
        tempdir = Some(dir);
        path
    };

    let status = Command::new(&args.netconvert)
        .arg("--sumo-net-file")
        .arg(&args.output)
        .arg("-o")
        .arg(&check_output)
        .status()
        .with_context(|| format!("launching validator `{}`", args.netconvert.display()))?;

    if !status.success() {
        bail!(
            "validator reported an inconsistent network ({status}); \
             patched output retained at `{}`",
            args.output.display()
        );
    }
    info!("validator check passed");
    drop(tempdir);
    Ok(())
}
