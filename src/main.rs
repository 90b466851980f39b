//! Alarm from Hell CLI
//!
//! Usage:
//!   alarm-from-hell --source board.fifo              # Alarm now
//!   alarm-from-hell --source board.fifo --in 8h10m   # Alarm after a delay
//!   board-dump | alarm-from-hell                     # Readings on stdin
//!   alarm-from-hell --calibrate --source board.fifo  # Calibrate the board
//!   alarm-from-hell --json                           # JSON status lines

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use alarm_from_hell::core::{
    format_countdown, measure_average, parse_delay, run_session, wait_before_alarm, AlarmError,
    FeedbackController, LineSource, Player, Result, SessionEnd, DEFAULT_CALIBRATION_SAMPLES,
};
use alarm_from_hell::types::{Calibration, ComplianceState, PlayerKind, Settings, StatusOutput};
use alarm_from_hell::VERSION;

#[derive(Parser, Debug)]
#[command(
    name = "alarm-from-hell",
    version = VERSION,
    about = "Alarm from Hell - an alarm you can only silence by getting out of bed",
    long_about = "Alarm from Hell rings until you step onto the balance board,\n\
                  do your repetitions (squats or stomps) and then stand still.\n\n\
                  States:\n  \
                  PANIC       - Alarm ringing, get on the board\n  \
                  COMPLIANCE  - Counting repetitions\n  \
                  SILENCE     - Hold still\n  \
                  DONE        - Alarm dismissed\n\n\
                  Leaving the board resets your progress and makes the alarm louder."
)]
struct Args {
    /// Start the alarm after a delay (e.g. 10s, 2m, 8h10m)
    #[arg(long = "in", value_name = "DELAY")]
    delay: Option<String>,

    /// Raw board readings, one per line ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    source: PathBuf,

    /// Settings file (TOML)
    #[arg(short, long, default_value = "alarm.toml")]
    config: PathBuf,

    /// Override required repetitions
    #[arg(long)]
    required_squats: Option<u32>,

    /// Override required still time (seconds)
    #[arg(long)]
    still_time: Option<f64>,

    /// Run the calibration wizard and save the result to the settings file
    #[arg(long)]
    calibrate: bool,

    /// Body weight for calibration (prompted if missing)
    #[arg(long)]
    body_kg: Option<f64>,

    /// Readings averaged per calibration step
    #[arg(long, default_value_t = DEFAULT_CALIBRATION_SAMPLES)]
    calibration_samples: usize,

    /// Alarm output
    #[arg(long, value_enum)]
    player: Option<PlayerKind>,

    /// WAV file for the sox player
    #[arg(long)]
    wav: Option<PathBuf>,

    /// Output status as JSON lines
    #[arg(long)]
    json: bool,

    /// Disable colors in output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();
    init_tracing();

    if args.no_color {
        colored::control::set_override(false);
    }

    let result = if args.calibrate {
        run_calibrate(&args)
    } else {
        run_alarm(&args).await
    };

    if let Err(e) = result {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

/// Logs go to stderr; stdout belongs to the screen
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("alarm_from_hell=warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Settings file plus command-line overrides
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load_or_default(&args.config)?;
    if let Some(squats) = args.required_squats {
        settings.alarm.required_squats = squats;
    }
    if let Some(still) = args.still_time {
        settings.alarm.required_still_time_sec = still;
    }
    if let Some(player) = args.player {
        settings.feedback.player = player;
    }
    if let Some(ref wav) = args.wav {
        settings.feedback.wav = wav.clone();
    }
    settings.alarm.validate()?;
    Ok(settings)
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

/// Run the alarm: optional countdown, then the session
async fn run_alarm(args: &Args) -> Result<()> {
    let settings = load_settings(args)?;

    if let Some(ref delay) = args.delay {
        let delay = parse_delay(delay)?;
        println!("Alarm scheduled in {} seconds.", delay.as_secs());
        let elapsed = wait_before_alarm(delay, ctrl_c(), print_countdown).await;
        println!();
        if !elapsed {
            println!("Aborted before alarm.");
            return Ok(());
        }
    }

    let source = LineSource::open(&args.source)?;
    let feedback = FeedbackController::spawn(Player::from_settings(&settings.feedback));
    let json = args.json;

    let end = run_session(
        source,
        settings.calibration,
        &settings.alarm,
        &feedback,
        ctrl_c(),
        |status| {
            if json {
                print_json(status);
            } else {
                render_screen(status);
            }
        },
    )
    .await;

    feedback.shutdown().await;

    match end? {
        SessionEnd::Completed => {
            if !json {
                println!("{}", "Alarm dismissed. Good morning.".green());
            }
        }
        SessionEnd::SourceExhausted => {
            eprintln!("Sample source ended before the alarm was dismissed.");
        }
        SessionEnd::Interrupted => {
            if !json {
                clear_screen();
            }
            println!("Aborted.");
        }
    }
    Ok(())
}

/// Two-step calibration: empty board, then the user standing still
fn run_calibrate(args: &Args) -> Result<()> {
    if args.source == Path::new("-") {
        return Err(AlarmError::Calibration(
            "stdin is needed for prompts; pass --source <file or FIFO>".to_string(),
        ));
    }

    let mut settings = Settings::load_or_default(&args.config)?;
    let mut source = LineSource::open(&args.source)?;
    let samples = args.calibration_samples;

    print_header("Calibration");

    prompt("Step OFF the board completely. Press ENTER when ready...")?;
    println!("Measuring zero offset...");
    let empty = measure_average(&mut source, samples)?;
    println!("Zero offset (raw): {:.2}\n", empty);

    prompt("Step ON the board and stand still. Press ENTER when ready...")?;
    let loaded = measure_average(&mut source, samples)?;
    println!("Body weight raw average: {:.2}", loaded);

    let body_kg = match args.body_kg {
        Some(kg) => kg,
        None => {
            let answer = prompt("Enter your body weight in kg (e.g. 82.5): ")?;
            answer.trim().parse::<f64>().map_err(|_| {
                AlarmError::Calibration(format!("not a weight: {:?}", answer.trim()))
            })?
        }
    };

    let calibration = Calibration::from_measurements(empty, loaded, body_kg)?;
    settings.calibration = calibration;
    settings.save(&args.config)?;

    println!();
    println!("Calibration written to {}", args.config.display());
    println!("ZERO_OFFSET = {:.2}", calibration.zero_offset);
    println!("SCALE       = {:.6}", calibration.scale);
    Ok(())
}

/// Print a prompt on stderr and read one line from stdin
fn prompt(message: &str) -> Result<String> {
    eprint!("{}", message.bold());
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line)
}

/// Print header
fn print_header(mode: &str) {
    println!("{}", "========================================".bold());
    println!("{}", format!("  Alarm from Hell v{} - {}", VERSION, mode).bold());
    println!("{}", "========================================".bold());
    println!();
}

fn print_countdown(remaining: Duration) {
    print!("\rStarting in {} ...", format_countdown(remaining));
    io::stdout().flush().ok();
}

fn clear_screen() {
    print!("\x1b[2J\x1b[H");
    io::stdout().flush().ok();
}

/// Full-screen status
fn render_screen(status: &StatusOutput) {
    clear_screen();
    let color = status.state.color();

    println!("\n\n\n");
    println!("        {}\n", "=== ALARM FROM HELL ===".bold());
    println!("\n");

    match status.state {
        ComplianceState::Panic => {
            println!("            {}\n", "GET UP.".color(color).bold());
            println!("            {}", "GET ON".color(color).bold());
            println!("            {}\n\n", "THE BOARD.".color(color).bold());
        }
        ComplianceState::Compliance => {
            println!("            {}\n", "SQUATS".color(color).bold());
            println!(
                "            {}\n\n",
                format!(
                    "{} / {}",
                    status.progress.squats_done, status.required_squats
                )
                .color(color)
                .bold()
            );
        }
        ComplianceState::Silence => {
            println!("            {}\n", "DO NOT MOVE.".color(color).bold());
            println!(
                "            {}\n\n",
                format!("{:.1} s", status.progress.still_seconds)
                    .color(color)
                    .bold()
            );
        }
        ComplianceState::Done => {
            println!("            {}\n\n", "GOOD.".color(color).bold());
        }
        ComplianceState::Sleep => {}
    }

    if !status.event.is_none() {
        println!("            EVENT: {}", status.event);
    }
    println!("{}", status.to_terminal_string());
    io::stdout().flush().ok();
}

/// One status per line
fn print_json(status: &StatusOutput) {
    match serde_json::to_string(status) {
        Ok(line) => println!("{}", line),
        Err(e) => tracing::warn!(error = %e, "status not serializable"),
    }
}
