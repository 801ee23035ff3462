//! lp - two-agent learning plan generator
//!
//! CLI entry point: gathers the topic and familiarity, runs the Generator and
//! Critic stages, prints the refined plan and optionally saves it.

use std::fs;
use std::io::Write;
use std::path::Path;

use clap::Parser;
use colored::*;
use eyre::{Context, Result, eyre};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::{debug, info, warn};

use learnplan::cli::Cli;
use learnplan::config::Config;
use learnplan::display;
use learnplan::familiarity::{self, FamiliarityLevel};
use learnplan::llm::create_client;
use learnplan::output;
use learnplan::pipeline::{PipelineError, PipelineEvent, PlanOutcome, PlanPipeline, PlanRequest, Stage};

/// Exit status after Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = learnplan::cli::get_log_path();
    if let Some(log_dir) = log_path.parent() {
        fs::create_dir_all(log_dir).context("Failed to create log directory")?;
    }

    // Priority: CLI --log-level > config file > INFO
    let level = match cli_log_level.or(config_log_level).map(|s| s.to_uppercase()) {
        Some(s) => match s.as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let mut config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    if let Some(ref dir) = cli.output_dir {
        config.plan.output_dir = dir.to_string_lossy().into_owned();
    }
    config.validate()?;
    info!("learnplan loaded config: model={}", config.llm.model);

    let mut editor = None;

    let topic = match cli.topic {
        Some(topic) => topic.trim().to_string(),
        None => read_line(&mut editor, "Enter the topic you want to learn: ")?.trim().to_string(),
    };
    if topic.is_empty() {
        eprintln!("{} no topic provided.", "Error:".red());
        std::process::exit(1);
    }

    let familiarity = match cli.familiarity {
        Some(ordinal) => familiarity::from_ordinal(ordinal as usize)?,
        None => prompt_familiarity(&mut editor, &topic)?,
    };

    let request = PlanRequest::new(topic, familiarity).verbose(cli.verbose).save(cli.save);
    debug!(?request, "main: request built");

    // Resolved once here and handed to the client; nothing else reads the key
    let api_key = match config.llm.resolve_api_key(Some(Path::new(".env"))) {
        Ok(key) => key,
        Err(e) => exit_with(&PipelineError::Llm(e)),
    };
    let llm = create_client(&config.llm, api_key).context("Failed to create LLM client")?;
    let pipeline = PlanPipeline::from_config(llm, &config.plan);

    let outcome = tokio::select! {
        result = run_pipeline(&pipeline, &request) => match result {
            Ok(outcome) => outcome,
            Err(e) => exit_with(&e),
        },
        _ = tokio::signal::ctrl_c() => {
            warn!("Interrupted during pipeline run, nothing saved");
            eprintln!("\nInterrupted.");
            std::process::exit(EXIT_INTERRUPTED);
        }
    };

    print_outcome(&request, &outcome);

    if request.save {
        let path = output::save_plan(
            &config.plan.output_path(),
            &request.topic,
            request.familiarity,
            chrono::Local::now().date_naive(),
            &outcome.refined_plan,
        )?;
        println!("Saved to: {}", path.display().to_string().cyan());
    }

    Ok(())
}

/// Run both stages, showing progress or the live draft
async fn run_pipeline(pipeline: &PlanPipeline, request: &PlanRequest) -> Result<PlanOutcome, PipelineError> {
    let verbose = request.verbose;
    pipeline
        .run_with(request, |event| {
            match event {
                PipelineEvent::StageStarted(Stage::Generator) if verbose => {
                    print!("{}", display::section("Generator Agent"));
                }
                PipelineEvent::StageStarted(Stage::Generator) => print!("\nGenerating plan..."),
                PipelineEvent::Text(text) if verbose => print!("{}", text),
                PipelineEvent::Text(_) => {}
                PipelineEvent::StageFinished(Stage::Generator) if verbose => println!(),
                PipelineEvent::StageFinished(Stage::Generator) => println!(" done."),
                PipelineEvent::StageStarted(Stage::Critic) if verbose => {
                    print!("{}", display::section("Critic Agent — evaluating..."));
                }
                PipelineEvent::StageStarted(Stage::Critic) => print!("Refining with Critic Agent..."),
                PipelineEvent::StageFinished(Stage::Critic) if verbose => {}
                PipelineEvent::StageFinished(Stage::Critic) => println!(" done.\n"),
                PipelineEvent::Truncated(stage) => eprintln!("\n{}", display::truncation_warning(stage)),
            }
            let _ = std::io::stdout().flush();
        })
        .await
}

fn print_outcome(request: &PlanRequest, outcome: &PlanOutcome) {
    if request.verbose && !outcome.assessment.is_empty() {
        println!("{}", outcome.assessment);
        print!("{}", display::section("Critic Agent — refined plan"));
    }
    println!("{}", display::plan_banner(&request.topic, &outcome.refined_plan));
}

/// Print the user-facing message for a failed run and exit
fn exit_with(err: &PipelineError) -> ! {
    warn!(error = %err, "Pipeline failed");
    let message = display::failure_message(err);
    eprintln!("{} {}", "Error:".red(), message);
    std::process::exit(1);
}

/// Read one line, exiting quietly on Ctrl-C or EOF
fn read_line(editor: &mut Option<DefaultEditor>, prompt: &str) -> Result<String> {
    if editor.is_none() {
        *editor = Some(DefaultEditor::new().context("Failed to initialise line editor")?);
    }
    let rl = editor.as_mut().ok_or_else(|| eyre!("line editor unavailable"))?;

    match rl.readline(prompt) {
        Ok(line) => Ok(line),
        Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
            println!();
            std::process::exit(0);
        }
        Err(e) => Err(e).context("Failed to read input"),
    }
}

/// Show the familiarity menu until a valid ordinal is entered
fn prompt_familiarity(editor: &mut Option<DefaultEditor>, topic: &str) -> Result<&'static FamiliarityLevel> {
    println!("{}", display::familiarity_menu(topic));

    loop {
        let answer = read_line(editor, &display::selection_prompt())?;
        if let Some(ordinal) = display::parse_selection(&answer) {
            let chosen = familiarity::from_ordinal(ordinal)?;
            println!("\nGot it — tailoring the plan for: {}", chosen.label.bold());
            return Ok(chosen);
        }
        println!("{}", display::selection_error());
    }
}
