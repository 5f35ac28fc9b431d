use std::io::{self, Write};
use std::sync::mpsc::{Receiver, RecvTimeoutError};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, anyhow};
use clap::Parser;
use schemars::schema_for;

use streamtree::classifiers::hoeffding_tree::{HoeffdingTree, HoeffdingTreeModel};
use streamtree::evaluation::{BasicClassificationEvaluator, Snapshot};
use streamtree::logging;
use streamtree::tasks::PrequentialEvaluator;
use streamtree::ui::cli::args::{Cli, Command, InspectArgs, RunArgs, SchemaArgs, SchemaTarget};
use streamtree::ui::types::choices::StreamChoice;

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const FG_CYAN: &str = "\x1b[36m";
const FG_GREEN: &str = "\x1b[32m";
const FG_MAGENTA: &str = "\x1b[35m";
const FG_GREY: &str = "\x1b[90m";

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.log_level.as_deref()).context("failed to initialize logging")?;

    match cli.command {
        Command::Run(args) => run(args),
        Command::Inspect(args) => inspect(args),
        Command::Schema(args) => print_schema(args),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let options = args.tree_options()?;
    let stream = args
        .stream_choice()?
        .build()
        .context("failed to build stream")?;
    let header = stream.header().clone();
    let evaluator = BasicClassificationEvaluator::new(header.number_of_classes());
    let tree = HoeffdingTree::new(header, options).context("failed to build tree")?;

    let banner: Vec<String> = vec![
        format!("{BOLD}{FG_CYAN}▶ Prequential Evaluation{RESET}"),
        format!(
            "{DIM}stream={}{RESET}  {DIM}sample_freq={}{RESET}  {DIM}mem_check_freq={}{RESET}  {}",
            args.stream,
            args.sample_frequency,
            args.mem_check_frequency,
            timestamp_now()
        ),
        format!(
            "{FG_GREY}────────────────────────────────────────────────────────────────────────{RESET}"
        ),
    ];

    let (tx, rx) = std::sync::mpsc::channel();
    let (max_instances, max_seconds) = (args.max_instances, args.max_seconds);
    let render: JoinHandle<()> = std::thread::spawn(move || {
        render_status_with_header(rx, banner, 150, max_instances, max_seconds)
    });

    let mut runner = PrequentialEvaluator::new(
        Box::new(tree),
        stream,
        Box::new(evaluator),
        args.max_instances,
        args.max_seconds,
        args.sample_frequency,
        args.mem_check_frequency,
    )
    .context("failed to construct PrequentialEvaluator")?
    .with_progress(tx);

    runner.run().context("runner failed")?;

    if let Some(path) = &args.dump_file {
        runner
            .curve()
            .export(path, args.dump_format)
            .with_context(|| format!("failed to export snapshots to {}", path.display()))?;
    }

    let learner = runner.into_learner();
    let _ = render.join();

    if let Some(path) = &args.save_model {
        let tree = learner
            .as_any()
            .downcast_ref::<HoeffdingTree>()
            .ok_or_else(|| anyhow!("learner is not a Hoeffding tree"))?;
        println!(
            "{DIM}nodes={} leaves={} depth={}{RESET}",
            tree.node_count(),
            tree.leaf_count(),
            tree.depth()
        );
        HoeffdingTreeModel::from_tree(tree.clone())
            .to_file(path)
            .with_context(|| format!("failed to save model to {}", path.display()))?;
    }

    Ok(())
}

fn inspect(args: InspectArgs) -> Result<()> {
    let model = HoeffdingTreeModel::from_file(&args.model)
        .with_context(|| format!("failed to load {}", args.model.display()))?;
    let tree = model.tree();
    let header = tree.header();

    println!(
        "{BOLD}{}{RESET}  {DIM}attributes={} classes={} criterion={} numeric={}{RESET}",
        header.relation_name(),
        header.number_of_attributes(),
        header.number_of_classes(),
        model.split_criterion(),
        model.numeric_split()
    );
    println!(
        "{DIM}nodes={} decisions={} leaves={} depth={} trained_on={}{RESET}",
        tree.node_count(),
        tree.decision_node_count(),
        tree.leaf_count(),
        tree.depth(),
        tree.training_samples_seen()
    );
    print!("{}", tree.describe());
    Ok(())
}

fn print_schema(args: SchemaArgs) -> Result<()> {
    let schema = match args.target {
        SchemaTarget::Options => schema_for!(streamtree::HoeffdingTreeOptions),
        SchemaTarget::Stream => StreamChoice::schema(),
    };
    println!(
        "{}",
        serde_json::to_string_pretty(&schema).context("failed to render schema")?
    );
    Ok(())
}

/// Print header once, then refresh a single line with status.
pub fn render_status_with_header(
    rx: Receiver<Snapshot>,
    header_lines: Vec<String>,
    repaint_every_ms: u64,
    max_instances: Option<u64>,
    max_seconds: Option<u64>,
) {
    for line in &header_lines {
        println!("{line}");
    }

    println!();
    let _ = io::stdout().flush();

    let tick = Duration::from_millis(repaint_every_ms);
    let mut last_draw = Instant::now();
    let mut last_snap: Option<Snapshot> = None;

    loop {
        match rx.recv_timeout(tick) {
            Ok(s) => last_snap = Some(s),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                if let Some(s) = last_snap.take() {
                    print!(
                        "\r{}\x1B[K\n",
                        format_status(&s, max_instances, max_seconds)
                    );
                    let _ = io::stdout().flush();
                }
                break;
            }
        }

        if last_draw.elapsed() >= tick {
            if let Some(s) = last_snap.as_ref() {
                print!("\r{}\x1B[K", format_status(s, max_instances, max_seconds));
                let _ = io::stdout().flush();
            }
            last_draw = Instant::now();
        }
    }
}

fn format_status(s: &Snapshot, max_instances: Option<u64>, max_seconds: Option<u64>) -> String {
    let mut line = format!(
        "{FG_GREEN}{BOLD}seen{RESET} {:>9}  \
         {FG_CYAN}{BOLD}acc{RESET} {:>7}% \
         {FG_MAGENTA}{BOLD}κ{RESET} {:>7}%  \
         {DIM}mem{RESET} {:>9}B  \
         {DIM}ram_h{RESET} {:>8.3e}  \
         {DIM}t{RESET} {:>7.3}s",
        s.instances_seen,
        fmtf(s.accuracy * 100.0, 3),
        fmtf(s.kappa * 100.0, 3),
        s.model_bytes,
        s.ram_hours,
        s.seconds
    );

    let bar_w = 15usize;
    if let Some(mi) = max_instances {
        let inst_bar = progress_bar(s.instances_seen as f64, mi as f64, bar_w);
        line.push_str(&format!("  {DIM}[inst]{RESET} {}", inst_bar));
    }
    if let Some(ms) = max_seconds {
        let time_bar = progress_bar(s.seconds, ms as f64, bar_w);
        line.push_str(&format!("  {DIM}[time]{RESET} {}", time_bar));
    }

    line
}

fn progress_bar(current: f64, total: f64, width: usize) -> String {
    if total.is_finite() && total > 0.0 {
        let ratio = (current / total).clamp(0.0, 1.0);
        let filled = (ratio * width as f64).round() as usize;
        let empty = width.saturating_sub(filled);
        return format!(
            "[{}{}] {:>3.0}%",
            "█".repeat(filled),
            "░".repeat(empty),
            ratio * 100.0
        );
    }

    String::new()
}

fn fmtf(x: f64, prec: usize) -> String {
    if x.is_nan() {
        format!("{DIM}NaN{RESET}")
    } else {
        format!("{:>1$.prec$}", x, 6, prec = prec)
    }
}

fn timestamp_now() -> String {
    use chrono::{Local, SecondsFormat};
    let now = Local::now();
    format!(
        "{DIM}{}{}",
        now.to_rfc3339_opts(SecondsFormat::Secs, true),
        RESET
    )
}
