//! CLI entry point for `headertrace`.

use std::path::{Path, PathBuf};

use clap::{CommandFactory, Parser, Subcommand};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use headertrace::config::{Config, OutputFormat};
use headertrace::model::header::HeaderRecord;
use headertrace::model::received::Timestamp;
use headertrace::parser::{input, split};
use headertrace::trace::{self, Hop};

#[derive(Parser)]
#[command(
    name = "headertrace",
    version,
    about = "Inspect email headers and the relay path recorded in Received headers"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List the decoded header fields of a message
    Headers {
        /// Message or header file (`-` for stdin)
        path: PathBuf,
        /// Only show fields with this name (case-insensitive)
        #[arg(short, long)]
        name: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the relay path from the Received headers
    Received {
        /// Message or header file (`-` for stdin)
        path: PathBuf,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = headertrace::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let json_default = config.output.default_format == OutputFormat::Json;

    match cli.command {
        Commands::Headers { path, name, json } => {
            cmd_headers(&path, name.as_deref(), json || json_default)
        }
        Commands::Received { path, json } => cmd_received(&path, json || json_default, &config),
        Commands::Completions { shell } => cmd_completions(shell),
        Commands::Manpage => cmd_manpage(),
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = headertrace::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "headertrace.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "headertrace", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::Write::write_all(&mut std::io::stdout(), &buf)?;
    Ok(())
}

fn load_records(path: &Path) -> anyhow::Result<Vec<HeaderRecord>> {
    let block = input::read_header_block(path)?;
    let records = split(&block);
    tracing::info!(path = %path.display(), count = records.len(), "Split header block");
    Ok(records)
}

/// List header records.
fn cmd_headers(path: &Path, name: Option<&str>, json: bool) -> anyhow::Result<()> {
    let records = load_records(path)?;
    let selected: Vec<&HeaderRecord> = records
        .iter()
        .filter(|r| name.is_none_or(|n| r.is_named(n)))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    if selected.is_empty() {
        println!("  No matching header fields.");
        return Ok(());
    }

    let name_width = selected
        .iter()
        .map(|r| r.name.width())
        .max()
        .unwrap_or(0)
        .min(30);

    for record in selected {
        println!(
            "  {:>3}  {}  {}",
            record.index,
            fit(&record.name, name_width),
            record.value
        );
    }
    Ok(())
}

/// Show the relay path.
fn cmd_received(path: &Path, json: bool, config: &Config) -> anyhow::Result<()> {
    let records = load_records(path)?;
    let hops = trace::trace_route(&records);

    if json {
        let output = serde_json::json!({
            "hop_count": hops.len(),
            "total_delay_seconds": trace::total_delay(&hops).map(|d| d.num_seconds()),
            "hops": hops,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    if hops.is_empty() {
        println!("  No Received headers found.");
        return Ok(());
    }

    print_hops_table(&hops, config);
    Ok(())
}

/// Print hops as a human-readable table.
fn print_hops_table(hops: &[Hop<'_>], config: &Config) {
    let display = &config.display;
    let host = display.host_width;
    let proto = display.protocol_width;

    println!();
    let mut header = format!(
        "  {:<3} {} {} {} {:<19}",
        "#",
        fit("From", host),
        fit("By", host),
        fit("With", proto),
        "Date"
    );
    if display.show_delays {
        header.push_str(&format!(" {:>8}", "Delay"));
    }
    println!("{header}");
    println!("  {}", "-".repeat(header.width().saturating_sub(2)));

    for hop in hops {
        let parts = &hop.parts;
        let from = join_host(parts.from_host.as_deref(), parts.from_address.as_deref());
        let by = join_host(parts.by_host.as_deref(), parts.by_address.as_deref());
        let date = match &parts.timestamp {
            Some(Timestamp::Valid(dt)) => dt.format(&display.date_format).to_string(),
            Some(Timestamp::Invalid(_)) => "(invalid)".to_string(),
            None => "-".to_string(),
        };

        let mut line = format!(
            "  {:<3} {} {} {} {:<19}",
            hop.number,
            fit(&from, host),
            fit(&by, host),
            fit(parts.with.as_deref().unwrap_or("-"), proto),
            date
        );
        if display.show_delays {
            let delay = hop
                .delay
                .map(|d| format!("{}s", d.num_seconds()))
                .unwrap_or_else(|| "-".to_string());
            line.push_str(&format!(" {delay:>8}"));
        }
        println!("{line}");
    }

    if let Some(total) = trace::total_delay(hops) {
        println!();
        println!("  {:<20} {}s", "Total delay", total.num_seconds());
    }
    println!();
}

fn join_host(host: Option<&str>, address: Option<&str>) -> String {
    match (host, address) {
        (Some(h), Some(a)) if !a.is_empty() => format!("{h} [{a}]"),
        (Some(h), _) => h.to_string(),
        (None, _) => "-".to_string(),
    }
}

/// Truncate or pad `s` to exactly `width` terminal columns.
fn fit(s: &str, width: usize) -> String {
    let mut out = String::with_capacity(width);
    let mut used = 0;
    for ch in s.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push_str(&" ".repeat(width - used));
    out
}
