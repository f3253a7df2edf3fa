//! daybrief CLI.
//!
//! `daybrief run` builds one plan and prints it; `daybrief schedule`
//! stays resident and fires runs on the configured cron; `daybrief
//! status` shows the configuration and the next scheduled run.

use std::sync::Arc;

use daybrief::config::AppConfig;
use daybrief::error::PlanningError;
use daybrief::pipeline::Planner;
use daybrief::render;
use daybrief::scheduler::{next_run_time, PlanScheduler};
use daybrief::sources::{CalendarSource, GmailSource, ItemSource, TodoistSource};
use daybrief::summarize::{OpenRouterSummarizer, Summarizer};

fn build_planner(config: &AppConfig) -> Planner {
    let mut sources: Vec<Arc<dyn ItemSource>> = vec![
        Arc::new(GmailSource::new(
            config.email_lookback_days,
            config.concurrency,
        )),
        Arc::new(CalendarSource::new(config.calendar_horizon_days)),
    ];
    match config.todoist_token() {
        Some(token) => sources.push(Arc::new(TodoistSource::new(token))),
        None => log::warn!("no Todoist token configured; skipping task source"),
    }

    let summarizer: Option<Arc<dyn Summarizer>> = match config.openrouter_key() {
        Some(key) => Some(Arc::new(OpenRouterSummarizer::new(key))),
        None => {
            log::warn!("no OpenRouter key configured; threads get fallback analysis");
            None
        }
    };

    Planner::new(config.clone(), sources, summarizer)
}

async fn cmd_run(config: AppConfig) -> Result<(), PlanningError> {
    let planner = build_planner(&config);
    let plan = planner.run().await?;

    let today = chrono::Local::now().date_naive();
    println!("{}", render::markdown_note(&plan, today));

    // Best-effort rollup write-back; the plan itself already succeeded.
    if let Some(token) = config.todoist_token() {
        if let Err(e) = TodoistSource::new(token).post_rollup(&plan, today).await {
            log::warn!("could not post rollup task: {}", e);
        }
    }

    let output_dir = config.resolved_output_dir()?;
    let artifact = render::write_artifact(&plan, &output_dir)?;
    eprintln!("artifact: {}", artifact.display());
    Ok(())
}

async fn cmd_schedule(config: AppConfig) -> Result<(), PlanningError> {
    let entry = config.schedule.clone();
    let planner = Arc::new(build_planner(&config));
    let mut scheduler = PlanScheduler::new(planner, entry);
    scheduler.run().await
}

fn cmd_status(config: &AppConfig) -> Result<(), PlanningError> {
    println!("daybrief configuration");
    println!("  email lookback:   {} days", config.email_lookback_days);
    println!("  calendar horizon: {} days", config.calendar_horizon_days);
    println!("  max threads:      {}", config.max_threads);
    println!(
        "  todoist:          {}",
        if config.todoist_token().is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    println!(
        "  summarizer:       {}",
        if config.openrouter_key().is_some() {
            "configured"
        } else {
            "not configured"
        }
    );
    if config.schedule.enabled {
        let next = next_run_time(&config.schedule)?;
        println!(
            "  schedule:         '{}' ({}), next run {}",
            config.schedule.cron, config.schedule.timezone, next
        );
    } else {
        println!("  schedule:         disabled");
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let command = std::env::args().nth(1).unwrap_or_else(|| "run".to_string());
    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{}", e);
            std::process::exit(1);
        }
    };

    let result = match command.as_str() {
        "run" => cmd_run(config).await,
        "schedule" => cmd_schedule(config).await,
        "status" => cmd_status(&config),
        other => {
            eprintln!("unknown command '{}'\nusage: daybrief [run|schedule|status]", other);
            std::process::exit(2);
        }
    };

    if let Err(e) = result {
        if e.requires_user_action() {
            log::error!("{} (user action required)", e);
        } else {
            log::error!("{}", e);
        }
        std::process::exit(1);
    }
}
