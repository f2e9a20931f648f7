use clap::{Args, Parser, Subcommand};
use slagate_cli::annotate::{
    annotations_for, empty_input_annotation, Annotation, AnnotationSink, GithubActions,
};
use slagate_cli::config::{
    check_exit_code, load_config, EmptyInputPolicy, Overrides, DEFAULT_DISPLAY_OFFSET_MINUTES,
    DEFAULT_TEST_NAME, EXIT_FAILURE, EXIT_OK, EXIT_PANELS_MESSAGE_FAILED, EXIT_PANELS_USAGE,
    EXIT_PANELS_ZIP_FAILED,
};
use slagate_cli::jtl::read_records;
use slagate_cli::logging::init_logging;
use slagate_cli::notify::Notifier;
use slagate_cli::panels::{self, PanelSource};
use slagate_cli::render::{render_empty_input, render_verdict, DisplayZone};
use slagate_common::{Result, SlaGateError};
use slagate_engine::{assess, ingest};
use slagate_slack::{SlackClient, SlackConfig, DEFAULT_API_BASE};
use std::path::PathBuf;
use std::process;
use tracing::{error, info, warn};

#[derive(Parser)]
#[command(name = "slagate", about = "Evaluate JMeter results against SLAs and report to Slack")]
struct Cli {
    /// Log at debug level (RUST_LOG overrides)
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check a JTL result log against the SLA rules
    Check(CheckArgs),
    /// Post a message and upload Grafana panels (PNGs or one ZIP) into its thread
    UploadPanels(PanelArgs),
}

#[derive(Args)]
struct SlackArgs {
    /// Slack bot token
    #[arg(long, env = "SLACK_BOT_TOKEN", hide_env_values = true)]
    slack_token: Option<String>,

    /// Slack channel id
    #[arg(long, env = "SLACK_CHANNEL_ID")]
    channel: Option<String>,

    /// Slack Web API base URL
    #[arg(long, default_value = DEFAULT_API_BASE)]
    slack_api_base: String,
}

#[derive(Args)]
struct CheckArgs {
    /// Path to the JTL (CSV) result log
    jtl: PathBuf,

    /// JSON file with SLA rules; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Name shown in the report
    #[arg(long, default_value = DEFAULT_TEST_NAME)]
    test_name: String,

    /// Overall p95 limit (ms)
    #[arg(long)]
    p95_limit_ms: Option<u64>,

    /// Overall p99 limit (ms)
    #[arg(long)]
    p99_limit_ms: Option<u64>,

    /// Overall error-rate limit (%)
    #[arg(long)]
    error_rate_limit_pct: Option<f64>,

    /// Label of the tracked transaction
    #[arg(long)]
    tracked_label: Option<String>,

    /// Tracked transaction p95 limit (ms)
    #[arg(long)]
    tracked_p95_limit_ms: Option<u64>,

    /// Tracked transaction p99 limit (ms)
    #[arg(long)]
    tracked_p99_limit_ms: Option<u64>,

    /// Tracked transaction error-rate limit (%)
    #[arg(long)]
    tracked_error_rate_limit_pct: Option<f64>,

    /// How many of the slowest labels to list
    #[arg(long)]
    top_n: Option<usize>,

    /// Exit non-zero when any SLA rule is breached
    #[arg(long)]
    fail_on_breach: bool,

    /// Whether an empty result log fails the run
    #[arg(long, value_enum, default_value_t = EmptyInputPolicy::Fail)]
    empty_input: EmptyInputPolicy,

    /// Emit GitHub Actions annotations on stdout
    #[arg(long)]
    annotations: bool,

    /// Print the verdict as JSON on stdout
    #[arg(long, conflicts_with = "annotations")]
    json: bool,

    /// Offset from UTC, in minutes, for report timestamps
    #[arg(long, default_value_t = DEFAULT_DISPLAY_OFFSET_MINUTES, allow_hyphen_values = true)]
    utc_offset_minutes: i32,

    #[command(flatten)]
    slack: SlackArgs,
}

impl CheckArgs {
    fn overrides(&self) -> Overrides {
        Overrides {
            p95_limit_ms: self.p95_limit_ms,
            p99_limit_ms: self.p99_limit_ms,
            error_rate_limit_pct: self.error_rate_limit_pct,
            tracked_label: self.tracked_label.clone(),
            tracked_p95_limit_ms: self.tracked_p95_limit_ms,
            tracked_p99_limit_ms: self.tracked_p99_limit_ms,
            tracked_error_rate_limit_pct: self.tracked_error_rate_limit_pct,
            top_n: self.top_n,
        }
    }
}

#[derive(Args)]
struct PanelArgs {
    /// Folder of PNGs, or a ZIP file with --zip
    path: PathBuf,

    /// Parent message the uploads are threaded under
    #[arg(long)]
    message: String,

    /// Upload a single ZIP file instead of a folder of PNGs
    #[arg(long)]
    zip: bool,

    #[command(flatten)]
    slack: SlackArgs,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(if cli.verbose { "debug" } else { "info" });

    let exit_code = match cli.command {
        Command::Check(args) => match check(args).await {
            Ok(code) => code,
            Err(e) => {
                error!(error = %e, "SLA check failed");
                eprintln!("ERROR: {e}");
                EXIT_FAILURE
            }
        },
        Command::UploadPanels(args) => upload_panels(args).await,
    };

    process::exit(exit_code);
}

async fn check(args: CheckArgs) -> Result<i32> {
    let mut config = load_config(args.config.as_deref())?;
    args.overrides().apply(&mut config);
    config.validate()?;
    let zone = DisplayZone::from_offset_minutes(args.utc_offset_minutes)?;

    let read = read_records(&args.jtl).await?;
    let ingested = ingest(read.records);

    let fallback = if args.json { Notifier::Silent } else { Notifier::Stdout };
    let notifier = Notifier::from_credentials(
        args.slack.slack_token.clone(),
        args.slack.channel.clone(),
        &args.slack.slack_api_base,
        fallback,
    );
    let mut annotations = args.annotations.then(|| GithubActions::new(std::io::stdout()));

    let verdict = match assess(&ingested.samples, &config) {
        Ok(verdict) => verdict,
        Err(SlaGateError::EmptyInput) => {
            warn!(path = %args.jtl.display(), policy = ?args.empty_input, "result log has no samples");
            notifier.send(&render_empty_input(&args.test_name)).await?;
            if let Some(sink) = annotations.as_mut() {
                emit(sink, &[empty_input_annotation(args.empty_input)]);
            }
            return Ok(check_exit_code(None, args.fail_on_breach, args.empty_input));
        }
        Err(e) => return Err(e),
    };

    if args.json {
        let json = serde_json::to_string_pretty(&verdict).map_err(|e| SlaGateError::Io(e.to_string()))?;
        println!("{json}");
    }
    notifier.send(&render_verdict(&verdict, &config, &args.test_name, &zone)).await?;
    if let Some(sink) = annotations.as_mut() {
        emit(sink, &annotations_for(&verdict, ingested.warnings.len()));
    }

    info!(
        compliant = verdict.compliant,
        breaches = verdict.breach_count(),
        samples = verdict.overall.count,
        skipped_rows = read.skipped_rows,
        "SLA check complete"
    );
    Ok(check_exit_code(Some(verdict.compliant), args.fail_on_breach, args.empty_input))
}

fn emit(sink: &mut impl AnnotationSink, items: &[Annotation]) {
    for item in items {
        if let Err(e) = sink.emit(item) {
            warn!(error = %e, "could not write annotation");
        }
    }
}

async fn upload_panels(args: PanelArgs) -> i32 {
    let (Some(token), Some(channel)) = (args.slack.slack_token, args.slack.channel) else {
        eprintln!("ERROR: --slack-token and --channel (or SLACK_BOT_TOKEN / SLACK_CHANNEL_ID) are required");
        return EXIT_PANELS_USAGE;
    };

    let source = match panels::resolve(&args.path, args.zip) {
        Ok(source) => source,
        Err(e) => {
            eprintln!("ERROR: {e}");
            return e.exit_code();
        }
    };

    let client = SlackClient::new(SlackConfig { token, api_base: args.slack.slack_api_base });
    let parent = match client.post_message(&channel, &args.message, None).await {
        Ok(posted) => posted,
        Err(e) => {
            eprintln!("ERROR sending Slack message: {e}");
            return EXIT_PANELS_MESSAGE_FAILED;
        }
    };
    println!("Slack message sent. thread_ts={}", parent.ts);

    match source {
        PanelSource::Zip(zip) => {
            let name = zip.display();
            println!("Uploading ZIP {name} in thread...");
            match panels::upload_zip(&client, &channel, &zip, &parent.ts).await {
                Ok(_) => {
                    println!("✅ Uploaded {name}");
                    EXIT_OK
                }
                Err(e) => {
                    println!("❌ Failed {name}: {e}");
                    EXIT_PANELS_ZIP_FAILED
                }
            }
        }
        PanelSource::Folder(files) if files.is_empty() => {
            println!("No PNG files found to upload.");
            EXIT_OK
        }
        PanelSource::Folder(files) => {
            println!("Uploading {} PNG file(s) in thread...", files.len());
            let summary = panels::upload_folder(&client, &channel, &files, &parent.ts).await;
            for file in &summary.uploaded {
                println!("✅ Uploaded {}", file.display());
            }
            for (file, e) in &summary.failed {
                println!("❌ Failed {}: {e}", file.display());
            }
            println!("Done. Uploaded {}/{} files in thread.", summary.uploaded.len(), files.len());
            EXIT_OK
        }
    }
}
