use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};

use maintkpi::date_util;
use maintkpi::{Granularity, IndicatorEngine, KpiId, KpiResult, ReportingWindow};

#[derive(Parser)]
#[command(name = "maintkpi", about = "Maintenance back-office indicator engine")]
struct Cli {
    /// Database path (default: ~/.maintkpi/maintkpi.db)
    #[arg(long)]
    db: Option<String>,

    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute all indicators
    Report {
        /// Reference instant (YYYY-MM-DD or YYYY-MM-DDTHH:MM:SS, default: now)
        #[arg(long)]
        as_of: Option<String>,
        /// Include the raw survey listing
        #[arg(long)]
        privileged: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Compute a single indicator
    Kpi {
        #[arg(value_enum)]
        kpi: KpiId,
        /// Explicit window (e.g. 2025-05, 2025-Q2, 2025-S1)
        #[arg(long)]
        window: Option<String>,
        #[arg(long)]
        as_of: Option<String>,
        #[arg(long)]
        json: bool,
    },
    /// Show the reporting window picked for a granularity
    Window {
        /// Granularity: month, quarter, semester
        granularity: String,
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Load users, equipment, work orders and surveys from a JSON snapshot
    Import {
        /// Path to the snapshot file
        file: String,
    },
    /// Satisfaction surveys
    Survey {
        #[command(subcommand)]
        action: SurveyAction,
    },
    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Show store status
    Status,
}

#[derive(Subcommand)]
enum SurveyAction {
    /// Record a survey response
    Submit {
        /// Responding user id
        #[arg(long)]
        user: i64,
        /// Five comma separated answers from 1 to 5 (e.g. 5,4,4,5,3)
        #[arg(long)]
        answers: String,
        #[arg(long)]
        comment: Option<String>,
        #[arg(long)]
        as_of: Option<String>,
    },
    /// Show whether a user answered this semester and is due a prompt
    Status {
        #[arg(long)]
        user: i64,
        #[arg(long)]
        as_of: Option<String>,
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Get a config value
    Get { key: String },
    /// Set a config value
    Set { key: String, value: String },
    /// List all config values
    List,
}

fn parse_as_of(as_of: Option<&str>) -> anyhow::Result<NaiveDateTime> {
    let Some(s) = as_of else {
        return Ok(chrono::Local::now().naive_local());
    };
    date_util::parse_timestamp(s)
        .or_else(|| date_util::parse_date(s).map(date_util::start_of_day))
        .ok_or_else(|| maintkpi::Error::InvalidTimestamp(s.to_string()).into())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let db = match &cli.db {
        Some(path) => maintkpi::Database::open_at(path).await?,
        None => maintkpi::Database::open().await?,
    };
    let engine = IndicatorEngine::new(db);

    match cli.command {
        Commands::Report {
            as_of,
            privileged,
            json,
        } => {
            let now = parse_as_of(as_of.as_deref())?;
            let report = engine.indicators(now, privileged).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!(
                    "Indicators as of {}",
                    report.generated_at.format("%Y-%m-%d %H:%M:%S")
                );
                for kpi in report.kpis() {
                    print_kpi(kpi);
                }
                if let Some(surveys) = &report.surveys {
                    print_surveys(surveys);
                }
            }
        }
        Commands::Kpi {
            kpi,
            window,
            as_of,
            json,
        } => {
            let now = parse_as_of(as_of.as_deref())?;
            let window = window.as_deref().map(ReportingWindow::parse).transpose()?;
            let result = engine.indicator(kpi, now, window).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            } else {
                print_kpi(&result);
            }
        }
        Commands::Window { granularity, as_of } => {
            let granularity: Granularity = granularity.parse()?;
            let now = parse_as_of(as_of.as_deref())?;
            let window = maintkpi::resolve_window(granularity, now);
            println!("{window}");
            println!("  From: {}", window.start.format("%Y-%m-%d %H:%M:%S"));
            println!("  To:   {}", window.end.format("%Y-%m-%d %H:%M:%S"));
        }
        Commands::Import { file } => {
            let raw = std::fs::read_to_string(&file)?;
            let snapshot = maintkpi::MemoryStore::from_json(&raw)?;
            let report = engine.import(snapshot).await?;
            println!("Imported {file}");
            println!("  Users:       {}", report.users);
            println!("  Equipment:   {}", report.equipment);
            println!("  Work orders: {}", report.work_orders);
            println!("  Surveys:     {}", report.surveys);
            if report.unlinked > 0 {
                println!("  Unlinked:    {}", report.unlinked);
            }
        }
        Commands::Survey { action } => {
            handle_survey(&engine, action).await?;
        }
        Commands::Config { action } => {
            handle_config(&engine, action).await?;
        }
        Commands::Status => {
            let counts = engine.status().await?;
            println!("Store Status");
            println!("  Users:       {}", counts.users);
            println!("  Equipment:   {}", counts.equipment);
            println!(
                "  Work orders: {} ({} open)",
                counts.work_orders, counts.open_work_orders
            );
            println!("  Surveys:     {}", counts.surveys);
        }
    }

    Ok(())
}

async fn handle_survey(engine: &IndicatorEngine, action: SurveyAction) -> anyhow::Result<()> {
    match action {
        SurveyAction::Submit {
            user,
            answers,
            comment,
            as_of,
        } => {
            let now = parse_as_of(as_of.as_deref())?;
            let answers = maintkpi::survey::parse_answers(&answers)?;
            let submitted =
                maintkpi::survey::submit_survey(engine.db(), user, answers, comment, now).await?;
            println!(
                "Survey {} recorded: score {} ({})",
                submitted.id,
                submitted.score.total,
                if submitted.score.positive { "positive" } else { "not positive" }
            );
        }
        SurveyAction::Status { user, as_of, json } => {
            let now = parse_as_of(as_of.as_deref())?;
            let status = maintkpi::survey::survey_status(engine.db(), user, now).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&status)?);
            } else {
                let yes_no = |flag: bool| if flag { "yes" } else { "no" };
                println!("User {user}");
                println!("  Answered this semester: {}", yes_no(status.answered));
                println!("  Prompt due:             {}", yes_no(status.prompt_due));
            }
        }
    }
    Ok(())
}

async fn handle_config(engine: &IndicatorEngine, action: ConfigAction) -> anyhow::Result<()> {
    match action {
        ConfigAction::Get { key } => match engine.config_get(&key).await? {
            Some(v) => println!("{key} = {v}"),
            None => println!("{key} is not set"),
        },
        ConfigAction::Set { key, value } => {
            engine.config_set(&key, &value).await?;
            println!("Config updated.");
        }
        ConfigAction::List => {
            let items = engine.config_list().await?;
            if items.is_empty() {
                println!("No configuration set.");
            } else {
                for (k, v) in items {
                    println!("{k} = {v}");
                }
            }
        }
    }
    Ok(())
}

fn print_kpi(r: &KpiResult) {
    let window = r
        .window
        .as_ref()
        .map(|w| format!(" [{}]", w.key))
        .unwrap_or_default();
    let unit = r.kpi.unit();
    let sep = if unit == "%" { "" } else { " " };
    println!("  {}{window}: {:.1}{sep}{unit}", r.kpi.title(), r.value);
    for item in &r.breakdown {
        println!("    {:<12} {}", format!("{}:", item.label), item.value);
    }
}

fn print_surveys(surveys: &[maintkpi::model::SurveyEntry]) {
    println!("  Surveys ({}):", surveys.len());
    for s in surveys {
        let when = s
            .responded_at
            .map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "-".to_string());
        let who = match &s.responder {
            Some(u) => format!("{} {} <{}>", u.first_name, u.last_name, u.email),
            None => "(unknown)".to_string(),
        };
        let mark = if s.positive { "+" } else { " " };
        let (id, score) = (s.id, s.total_score);
        println!("    {mark} #{id:<5} {when}  {score:>2}  {who}");
        if let Some(comment) = &s.comment {
            println!("        {comment}");
        }
    }
}
