//! Drowsiness Monitor Agent CLI
//!
//! Frame-driven drowsiness and yawn alerting from recorded landmark streams.

use clap::{Parser, Subcommand};
use drowsiness_monitor_agent::{
    alert::{AlertLog, DefaultToneSink, NullSnapshotSink, NullToneSink, ToneSink},
    config::Config,
    core::{DrowsinessMonitor, FireMode},
    landmarks::{ReplayConfig, ReplaySource},
    stats::create_shared_stats_with_persistence,
    VERSION,
};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "drowsiness-monitor")]
#[command(version = VERSION)]
#[command(about = "Frame-driven drowsiness and yawn detection", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the monitor over a recorded landmark stream
    Run {
        /// Landmark recording to replay (JSONL, one frame observation per line)
        input: PathBuf,

        /// Deliver frames as fast as possible instead of pacing to timestamps
        #[arg(long)]
        fast: bool,

        /// Alert log path (defaults to the configured location)
        #[arg(long)]
        log: Option<PathBuf>,

        /// Override the eye-closure EAR threshold
        #[arg(long)]
        ear_threshold: Option<f64>,

        /// Override the yawn MAR threshold
        #[arg(long)]
        mar_threshold: Option<f64>,

        /// Override the sustained eye-closure duration (seconds)
        #[arg(long)]
        eye_closed_secs: Option<u64>,

        /// Override the sustained yawn duration (seconds)
        #[arg(long)]
        yawn_secs: Option<u64>,

        /// Alert once per episode instead of every frame while sustained
        #[arg(long)]
        one_shot: bool,

        /// Disable tone playback
        #[arg(long)]
        mute: bool,

        /// Print overlay values for every frame
        #[arg(long)]
        verbose: bool,
    },

    /// Pause monitoring
    Pause,

    /// Resume monitoring
    Resume,

    /// Show configuration and cumulative session statistics
    Status,

    /// Show recent alert log entries
    Log {
        /// Number of entries to show
        #[arg(long, short, default_value = "10")]
        lines: usize,
    },

    /// Show configuration
    Config,
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            fast,
            log,
            ear_threshold,
            mar_threshold,
            eye_closed_secs,
            yawn_secs,
            one_shot,
            mute,
            verbose,
        } => {
            cmd_run(RunOptions {
                input,
                fast,
                log,
                ear_threshold,
                mar_threshold,
                eye_closed_secs,
                yawn_secs,
                one_shot,
                mute,
                verbose,
            });
        }
        Commands::Pause => {
            cmd_pause();
        }
        Commands::Resume => {
            cmd_resume();
        }
        Commands::Status => {
            cmd_status();
        }
        Commands::Log { lines } => {
            cmd_log(lines);
        }
        Commands::Config => {
            cmd_config();
        }
    }
}

struct RunOptions {
    input: PathBuf,
    fast: bool,
    log: Option<PathBuf>,
    ear_threshold: Option<f64>,
    mar_threshold: Option<f64>,
    eye_closed_secs: Option<u64>,
    yawn_secs: Option<u64>,
    one_shot: bool,
    mute: bool,
    verbose: bool,
}

fn cmd_run(options: RunOptions) {
    println!("Drowsiness Monitor Agent v{VERSION}");
    println!();

    // Load or create configuration, then apply CLI overrides for this run
    let mut config = Config::load().unwrap_or_default();
    if let Some(ear) = options.ear_threshold {
        config.ear_threshold = ear;
    }
    if let Some(mar) = options.mar_threshold {
        config.mar_threshold = mar;
    }
    if let Some(secs) = options.eye_closed_secs {
        config.eye_closed_duration = Duration::from_secs(secs);
    }
    if let Some(secs) = options.yawn_secs {
        config.yawn_duration = Duration::from_secs(secs);
    }
    if options.one_shot {
        config.fire_mode = FireMode::OneShot;
    }
    if let Some(path) = options.log {
        config.log_path = path;
    }

    if let Err(e) = config.ensure_directories() {
        eprintln!("Warning: Could not create directories: {e}");
    }

    println!("Starting monitoring...");
    println!("  EAR threshold: {}", config.ear_threshold);
    println!(
        "  Eye closure duration: {}s",
        config.eye_closed_duration.as_secs()
    );
    println!("  MAR threshold: {}", config.mar_threshold);
    println!("  Yawn duration: {}s", config.yawn_duration.as_secs());
    println!(
        "  Alert mode: {}",
        match config.fire_mode {
            FireMode::Repeating => "repeating",
            FireMode::OneShot => "one-shot",
        }
    );
    println!("  Alert log: {:?}", config.log_path);
    println!();
    println!("Press Ctrl+C to stop");
    println!();

    // Set up session stats
    let stats = create_shared_stats_with_persistence(config.data_path.join("session_stats.json"));
    println!("Session ID: {}", stats.session_id());

    // Build the monitor with its sinks
    let tone: Box<dyn ToneSink> = if options.mute {
        Box::new(NullToneSink)
    } else {
        Box::new(DefaultToneSink::default())
    };
    let mut monitor = DrowsinessMonitor::new(
        config.monitor_config(),
        tone,
        Box::new(NullSnapshotSink::new()),
        AlertLog::new(config.log_path.clone()),
        stats.clone(),
    );

    // Create the frame source
    let mut replay_config = ReplayConfig::new(options.input);
    replay_config.pace = !options.fast;
    let mut source = ReplaySource::new(replay_config);
    if let Err(e) = source.start() {
        eprintln!("Error starting frame source: {e}");
        std::process::exit(1);
    }

    // Set up Ctrl+C handler
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc_handler(r);

    // Support pause/resume from another process by polling the config file.
    let mut paused = config.paused;
    let mut last_config_check = std::time::Instant::now();

    if paused {
        println!("Monitoring is currently paused.");
        println!("Run `drowsiness-monitor resume` to continue.");
        println!();
    }

    // Main frame loop
    let receiver = source.receiver().clone();

    while running.load(Ordering::SeqCst) {
        // Periodically reload config so `drowsiness-monitor pause/resume`
        // can control a running agent.
        if last_config_check.elapsed() >= Duration::from_secs(1) {
            if let Ok(cfg) = Config::load() {
                if cfg.paused != paused {
                    paused = cfg.paused;
                    println!();
                    if paused {
                        println!("Pausing monitoring...");
                    } else {
                        println!("Resuming monitoring...");
                    }
                }
            }
            last_config_check = std::time::Instant::now();
        }

        if paused {
            thread::sleep(Duration::from_millis(100));
            continue;
        }

        match receiver.recv_timeout(Duration::from_millis(100)) {
            Ok(observation) => {
                let update =
                    monitor.process_frame(observation.landmarks.as_ref(), observation.timestamp);

                if options.verbose {
                    println!(
                        "[{}] {}",
                        observation.timestamp.format("%H:%M:%S%.3f"),
                        update.overlay_lines().join(" | ")
                    );
                }

                for alert in &update.alerts {
                    println!(
                        "[{}] {}",
                        alert.timestamp.format("%H:%M:%S"),
                        alert.kind.overlay_text()
                    );
                }
            }
            Err(crossbeam_channel::RecvTimeoutError::Timeout) => {}
            Err(crossbeam_channel::RecvTimeoutError::Disconnected) => {
                // Recording exhausted: normal end of capture
                println!();
                println!("End of recording.");
                break;
            }
        }
    }

    // Stop the source and persist stats
    println!();
    println!("Stopping monitoring...");
    source.stop();

    if let Err(e) = stats.save() {
        eprintln!("Warning: Could not save session stats: {e}");
    }

    println!();
    println!("{}", stats.summary());
}

fn cmd_pause() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = true;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Monitoring paused. Use 'drowsiness-monitor resume' to continue.");
}

fn cmd_resume() {
    let mut config = Config::load().unwrap_or_default();
    config.paused = false;
    if let Err(e) = config.save() {
        eprintln!("Error saving config: {e}");
        std::process::exit(1);
    }
    println!("Monitoring resumed.");
}

fn cmd_status() {
    let config = Config::load().unwrap_or_default();

    println!("Drowsiness Monitor Agent Status");
    println!("===============================");
    println!();

    println!("Configuration:");
    println!("  EAR threshold: {}", config.ear_threshold);
    println!(
        "  Eye closure duration: {}s",
        config.eye_closed_duration.as_secs()
    );
    println!("  MAR threshold: {}", config.mar_threshold);
    println!("  Yawn duration: {}s", config.yawn_duration.as_secs());
    println!("  Alert log: {:?}", config.log_path);
    println!("  Paused: {}", config.paused);
    println!();

    // Load and show cumulative stats if available
    let stats_path = config.data_path.join("session_stats.json");
    if stats_path.exists() {
        if let Ok(content) = std::fs::read_to_string(&stats_path) {
            if let Ok(stats) = serde_json::from_str::<serde_json::Value>(&content) {
                println!("Cumulative Statistics:");
                if let Some(frames) = stats.get("frames_processed") {
                    println!("  Frames processed: {frames}");
                }
                if let Some(no_face) = stats.get("no_face_frames") {
                    println!("  Frames without a face: {no_face}");
                }
                if let Some(eye) = stats.get("eye_alerts") {
                    println!("  Drowsiness alerts: {eye}");
                }
                if let Some(yawn) = stats.get("yawn_alerts") {
                    println!("  Yawn alerts: {yawn}");
                }
                if let Some(failures) = stats.get("sink_failures") {
                    println!("  Side-effect failures: {failures}");
                }
            }
        }
    } else {
        println!("No previous session data found.");
    }
}

fn cmd_log(lines: usize) {
    let config = Config::load().unwrap_or_default();
    let log = AlertLog::new(config.log_path.clone());

    match log.read_recent(lines) {
        Ok(rows) if rows.is_empty() => {
            println!("No alerts recorded in {:?}", config.log_path);
        }
        Ok(rows) => {
            for row in rows {
                println!("{row}");
            }
        }
        Err(_) => {
            println!("No alert log found at {:?}", config.log_path);
            println!("Run 'drowsiness-monitor run <recording>' to begin monitoring.");
        }
    }
}

fn cmd_config() {
    let config = Config::load().unwrap_or_default();

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(&config).unwrap_or_else(|_| "Error".to_string())
    );
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(running: Arc<AtomicBool>) {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .expect("Error setting Ctrl+C handler");
}
