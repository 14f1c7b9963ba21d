//! mindease: headless runner for the MindEase staff stress dashboard.
//!
//! Usage:
//!   mindease demo
//!   mindease --db staff.db ingest roster.csv --predict
//!   mindease --db staff.db plan
//!   mindease --db staff.db swap E003 E007
//!   mindease --db staff.db ipc

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mindease_core::{
    command::DashboardCommand,
    config::DashboardConfig,
    employee::EmployeeRecord,
    event::IngestSource,
    notification::{LogDispatcher, SwapDispatcher, SwapNotification},
    planner::{OptimizationSummary, SwapProposal},
    remote::{RemoteClient, RemoteDispatcher},
    scoring::percent,
    session::{new_session_id, DashboardSession},
    stats::{AnalyticsCards, HomeCounters, StressDistribution},
    store::DashboardStore,
};
use serde::Serialize;
use std::io::{self, BufRead, Write};
use std::time::Duration;

#[derive(Parser)]
#[command(name = "mindease", version, about = "Staff stress scoring and shift-swap planning")]
struct Cli {
    /// SQLite database path or URI. `:memory:` keeps nothing after exit.
    #[arg(long, default_value = ":memory:")]
    db: String,

    /// JSON config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<String>,

    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Session id for per-session flags. A random one when omitted.
    #[arg(long)]
    session: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Replace the stored data with a generated demo roster.
    Demo,
    /// Ingest a CSV file.
    Ingest {
        path: String,
        /// Ask the prediction endpoint for scores even if the config disables it.
        #[arg(long)]
        predict: bool,
    },
    /// Fetch employees from a remote data endpoint.
    Connect {
        url: String,
        #[arg(long)]
        api_key: Option<String>,
    },
    /// List staff by descending stress.
    Show,
    /// Print swap proposals and the optimization summary.
    Plan,
    /// Apply a swap between a high-stress and a healthy employee.
    Swap {
        staff_id: String,
        swap_with_id: String,
        /// Do not contact the notify/optimize endpoints.
        #[arg(long)]
        offline: bool,
    },
    /// Print dashboard statistics.
    Stats,
    /// Re-read the stored data on an interval and print analytics.
    Watch {
        #[arg(long, default_value_t = 10)]
        ticks: u64,
        /// Overrides the configured refresh interval.
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// JSON-lines command loop on stdin/stdout.
    Ipc,
}

#[derive(Serialize)]
struct UiState<'a> {
    session_id:   &'a str,
    analytics:    AnalyticsCards,
    distribution: StressDistribution,
    counters:     HomeCounters,
    employees:    Vec<&'a EmployeeRecord>,
}

#[derive(Serialize)]
struct PlanReply {
    proposals: Vec<SwapProposal>,
    summary:   OptimizationSummary,
}

#[derive(Serialize)]
struct SwapReply<'a> {
    notification: SwapNotification,
    state:        UiState<'a>,
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    };

    // For :memory: use a shared-cache URI so a reopened store in the same
    // process sees the same snapshot.
    let db_effective = if cli.db == ":memory:" {
        format!("file:mindease_{}?mode=memory&cache=shared", epoch_secs())
    } else {
        cli.db.clone()
    };
    let store = DashboardStore::open(&db_effective)
        .with_context(|| format!("opening database {db_effective}"))?;
    store.migrate()?;

    let session_id = cli.session.clone().unwrap_or_else(new_session_id);
    let client = RemoteClient::from_config(&config.remote);
    let mut session = DashboardSession::open(session_id, cli.seed, config, store)?;

    let ipc_mode = matches!(cli.command, Command::Ipc);
    if !ipc_mode && session.first_visit()? {
        println!("Welcome to MindEase AI: burnout detection for healthcare staff.");
        println!();
    }

    match cli.command {
        Command::Demo => {
            session.seed_demo()?;
            print_overview(&session);
        }
        Command::Ingest { path, predict } => {
            let text = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            let count = session
                .ingest_delimited(&text)
                .with_context(|| format!("ingesting {path}"))?;
            println!("Processed {count} employees from {path}");
            if predict || session.config().remote.predict_on_ingest {
                let matched = session.predict_with(&client).await?;
                if matched > 0 {
                    println!("Backend predictions applied to {matched} employees");
                }
            }
            print_overview(&session);
        }
        Command::Connect { url, api_key } => {
            let count = session
                .ingest_remote(&client, &url, api_key.as_deref())
                .await
                .with_context(|| format!("Connection Failed: {url}"))?;
            println!("Connected: loaded {count} employees from {url}");
            print_overview(&session);
        }
        Command::Show => {
            session.load_or_seed()?;
            print_roster(&session);
        }
        Command::Plan => {
            session.load_or_seed()?;
            print_plan(&session);
        }
        Command::Swap { staff_id, swap_with_id, offline } => {
            session.load_or_seed()?;
            if offline {
                run_swap(&mut session, &staff_id, &swap_with_id, &LogDispatcher)?;
            } else {
                let dispatcher = RemoteDispatcher::new(client.clone(), tokio::runtime::Handle::current());
                run_swap(&mut session, &staff_id, &swap_with_id, &dispatcher)?;
                dispatcher.flush().await;
            }
        }
        Command::Stats => {
            session.load_or_seed()?;
            print_stats(&mut session);
        }
        Command::Watch { ticks, interval_secs } => {
            session.load_or_seed()?;
            let interval = interval_secs.unwrap_or(session.config().store.refresh_interval_secs);
            for _ in 0..ticks {
                tokio::time::sleep(Duration::from_secs(interval)).await;
                session.refresh_from_store()?;
                print_analytics(&session.analytics());
            }
        }
        Command::Ipc => {
            session.load_or_seed()?;
            let dispatcher = RemoteDispatcher::new(client.clone(), tokio::runtime::Handle::current());
            run_ipc_loop(&mut session, &client, &dispatcher).await?;
            dispatcher.flush().await;
        }
    }

    Ok(())
}

fn run_swap(
    session: &mut DashboardSession,
    staff_id: &str,
    swap_with_id: &str,
    dispatcher: &dyn SwapDispatcher,
) -> Result<()> {
    let outcome = session.apply_swap(staff_id, swap_with_id, dispatcher)?;
    println!("Swap applied.");
    println!(
        "  {:<20} now on {:<10} stress {}% ({})",
        outcome.staff.name,
        outcome.staff.shift,
        percent(outcome.staff.stress_score()),
        outcome.staff.stress_level().label()
    );
    println!(
        "  {:<20} now on {:<10} stress {}% ({})",
        outcome.swap_with.name,
        outcome.swap_with.shift,
        percent(outcome.swap_with.stress_score()),
        outcome.swap_with.stress_level().label()
    );
    println!("  {} has been notified about the swap request.", outcome.notification.to);
    Ok(())
}

async fn run_ipc_loop(
    session: &mut DashboardSession,
    client: &RemoteClient,
    dispatcher: &RemoteDispatcher,
) -> Result<()> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut handle = stdin.lock();
    let mut buffer = String::new();

    loop {
        buffer.clear();
        let bytes_read = handle.read_line(&mut buffer)?;
        if bytes_read == 0 {
            break; // EOF
        }
        if buffer.trim().is_empty() {
            continue;
        }

        let cmd: DashboardCommand = match serde_json::from_str(&buffer) {
            Ok(c) => c,
            Err(e) => {
                write_error(&mut stdout, &e)?;
                continue;
            }
        };

        let reply = match cmd {
            DashboardCommand::Quit => break,
            DashboardCommand::GetState => serde_json::to_string(&build_ui_state(session)),
            DashboardCommand::IngestCsv { text } => match session.ingest_delimited(&text) {
                Ok(_) => {
                    if session.config().remote.predict_on_ingest {
                        session.predict_with(client).await?;
                    }
                    serde_json::to_string(&build_ui_state(session))
                }
                Err(e) => {
                    write_error(&mut stdout, &e)?;
                    continue;
                }
            },
            DashboardCommand::IngestRows { employees } => {
                match session.ingest_rows(&employees, IngestSource::Rows) {
                    Ok(_) => serde_json::to_string(&build_ui_state(session)),
                    Err(e) => {
                        write_error(&mut stdout, &e)?;
                        continue;
                    }
                }
            }
            DashboardCommand::Plan => serde_json::to_string(&PlanReply {
                proposals: session.plan(),
                summary: session.optimization_summary(),
            }),
            DashboardCommand::ApplySwap { staff_id, swap_with_id } => {
                match session.apply_swap(&staff_id, &swap_with_id, dispatcher) {
                    Ok(outcome) => serde_json::to_string(&SwapReply {
                        notification: outcome.notification,
                        state: build_ui_state(session),
                    }),
                    Err(e) => {
                        write_error(&mut stdout, &e)?;
                        continue;
                    }
                }
            }
            DashboardCommand::Refresh => {
                session.refresh_from_store()?;
                serde_json::to_string(&build_ui_state(session))
            }
        };
        writeln!(stdout, "{}", reply?)?;
        stdout.flush()?;
    }
    Ok(())
}

fn write_error(stdout: &mut io::Stdout, e: &dyn std::fmt::Display) -> Result<()> {
    let err_json = serde_json::json!({ "error": e.to_string() });
    writeln!(stdout, "{}", err_json)?;
    stdout.flush()?;
    Ok(())
}

fn build_ui_state(session: &DashboardSession) -> UiState<'_> {
    UiState {
        session_id: &session.session_id,
        analytics: session.analytics(),
        distribution: session.distribution(),
        counters: session.home_counters(),
        employees: session.ranked_by_stress(),
    }
}

// ── Console output ───────────────────────────────────────────────────────────

fn print_overview(session: &DashboardSession) {
    print_analytics(&session.analytics());
    let counters = session.home_counters();
    println!("  at risk detected:    {}", counters.detected);
    println!("  burnouts prevented:  {}", counters.prevented);
}

fn print_analytics(cards: &AnalyticsCards) {
    println!("=== ANALYTICS ===");
    println!("  total staff:     {}", cards.total_staff);
    println!("  average stress:  {}%", percent(cards.average_stress));
    println!("  critical:        {}", cards.critical_count);
    println!("  healthy:         {}", cards.healthy_count);
}

fn print_roster(session: &DashboardSession) {
    println!("=== STAFF BY STRESS ===");
    for e in session.ranked_by_stress() {
        println!(
            "  {:<10} {:<20} {:<10} {:>3}%  {}",
            e.employee_id,
            e.name,
            e.shift,
            percent(e.stress_score()),
            e.stress_level().label()
        );
    }
}

fn print_plan(session: &DashboardSession) {
    let proposals = session.plan();
    let summary = session.optimization_summary();

    println!("=== SWAP PROPOSALS ===");
    if proposals.is_empty() {
        println!("  (No swaps needed)");
    }
    for p in &proposals {
        println!(
            "  {} ({}) {} -> {} with {} ({})",
            p.staff_name, p.staff_id, p.current_shift, p.suggested_shift, p.swap_with_name, p.swap_with_id
        );
        println!("    {}", p.reason);
        println!("    {}", p.impact);
    }
    println!();
    println!("=== SUMMARY ===");
    println!("  swaps:              {}", summary.swap_count);
    println!("  avg reduction:      {}%", summary.average_reduction);
    println!("  workload balance:   {}%", summary.balance);
}

fn print_stats(session: &mut DashboardSession) {
    print_analytics(&session.analytics());

    let dist = session.distribution();
    println!();
    println!("=== DISTRIBUTION ===");
    println!("  healthy:   {:>3} ({:.1}%)", dist.healthy.count, dist.healthy.percent);
    println!("  warning:   {:>3} ({:.1}%)", dist.warning.count, dist.warning.percent);
    println!("  critical:  {:>3} ({:.1}%)", dist.critical.count, dist.critical.percent);

    println!();
    println!("=== DEPARTMENTS ===");
    for d in session.department_stats() {
        println!(
            "  {:<10} staff {:>3}  avg {:>3}%  critical {}",
            d.name,
            d.count,
            percent(d.average_stress),
            d.critical
        );
    }

    println!();
    println!("=== WEEKLY TREND ===");
    for point in session.weekly_trend() {
        println!("  {}  {:.0}%", point.day, point.percent);
    }
}

fn epoch_secs() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
