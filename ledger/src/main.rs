// Command line front end for the gasoil expense ledger
use std::collections::BTreeSet;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ledger::config::settings::{AttachmentBackendSettings, LedgerSettings};
use ledger::data::attachments::LocalAttachmentStore;
use ledger::data::csv_codec::date_format;
use ledger::data::export::ExportFormat;
use ledger::data::history::HistoryFilter;
use ledger::{ExpenseService, RemoteClients};
use shared::models::{Submission, Upload};
use shared::utils::AttachmentKind;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "gasoil-ledger", about = "Record and review technicians' fuel expenses")]
struct Cli {
    /// Path to a JSON config file (the bundled default is used otherwise)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Record a new expense
    Submit {
        #[arg(long)]
        technician: String,
        /// Amount as written on the receipt, e.g. "50,00 €"
        #[arg(long)]
        amount: String,
        /// Expense date (YYYY-MM-DD or DD/MM/YYYY)
        #[arg(long, value_parser = parse_date_arg)]
        date: NaiveDate,
        #[arg(long)]
        justification: String,
        /// Receipt to attach (jpg, jpeg, png, webp, pdf); repeat for several
        #[arg(long = "attach")]
        attachments: Vec<PathBuf>,
    },
    /// Show recorded expenses and their total
    History {
        /// Only show this technician; repeat for several
        #[arg(long = "technician")]
        technicians: Vec<String>,
        #[arg(long, value_parser = parse_date_arg)]
        from: Option<NaiveDate>,
        #[arg(long, value_parser = parse_date_arg)]
        to: Option<NaiveDate>,
    },
    /// Write the whole ledger as an Excel workbook, or CSV when the output ends in .csv
    Export {
        #[arg(short, long)]
        output: PathBuf,
    },
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    date_format::parse_date(s).ok_or_else(|| format!("invalid date '{}'", s))
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    run(Cli::parse())
}

fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => LedgerSettings::load_from_path(path)?,
        None => LedgerSettings::load_default()?,
    };

    let service = ExpenseService::from_settings(&settings, &RemoteClients::default())?;

    match cli.command {
        Command::Submit { technician, amount, date, justification, attachments } => {
            // Reads stay usable on a damaged ledger; only writers need the schema
            service.ensure_schema().context("ledger could not be initialised")?;

            let mut uploads = Vec::with_capacity(attachments.len());
            for path in attachments {
                let bytes = std::fs::read(&path).with_context(|| format!("cannot read {}", path.display()))?;
                let file_name = path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default();
                uploads.push(Upload { file_name, bytes });
            }
            let submission = Submission { technician, amount, date: Some(date), justification, uploads };

            let record = service.submit(submission)?;
            info!(id = %record.id, "Expense recorded");
            println!("Recorded expense {} for {}", record.id, record.technician);
        }
        Command::History { technicians, from, to } => {
            let filter = HistoryFilter {
                technicians: (!technicians.is_empty()).then(|| technicians.into_iter().collect::<BTreeSet<_>>()),
                date_from: from,
                date_to: to,
            };
            let local = match &settings.attachments {
                AttachmentBackendSettings::Local { base_dir } => Some(LocalAttachmentStore::new(base_dir)),
                AttachmentBackendSettings::RemoteFolder { .. } => None,
            };
            let view = service.history(&filter);
            for record in &view.records {
                let receipts: Vec<String> = record
                    .attachments
                    .iter()
                    .map(|r| {
                        let shown = local
                            .as_ref()
                            .and_then(|store| store.resolve(r))
                            .map(|p| p.display().to_string())
                            .unwrap_or_else(|| r.clone());
                        let kind = AttachmentKind::of(r);
                        if kind.is_previewable() {
                            format!("[img] {}", shown)
                        } else if kind == AttachmentKind::Pdf {
                            format!("[pdf] {}", shown)
                        } else {
                            shown
                        }
                    })
                    .collect();
                println!(
                    "{}  {:<10}  {:<20}  {:>12}  {}  {}",
                    record.id,
                    record.date.map(date_format::format_date).unwrap_or_else(|| "?".to_string()),
                    record.technician,
                    record.amount,
                    record.justification,
                    receipts.join(", ")
                );
            }
            println!("{} expense(s), total {:.2} €", view.summary.count, view.summary.total);
            if view.summary.unparsed_amounts > 0 {
                println!("{} amount(s) could not be read and are not counted", view.summary.unparsed_amounts);
            }
        }
        Command::Export { output } => {
            let requested = ExportFormat::for_path(&output);
            let export = service.export(requested)?;
            std::fs::write(&output, &export.bytes).with_context(|| format!("cannot write {}", output.display()))?;
            if export.format != requested {
                println!("Workbook could not be built, wrote {} instead", export.format.extension().to_uppercase());
            }
            println!("Ledger exported to {}", output.display());
        }
    }

    Ok(())
}
