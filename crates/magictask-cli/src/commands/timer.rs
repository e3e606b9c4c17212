use std::io::Write;
use std::sync::Arc;

use clap::Subcommand;
use magictask_core::bridge::{self, Notifier, TimerStateBridge};
use magictask_core::storage::NotificationsConfig;
use magictask_core::{AppStateStore, Config, ConfigPatch, Database, TimerEvent, TimerRunner};
use tokio::io::{AsyncBufReadExt, BufReader};

use super::open_database;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Print the stored timer configuration and state as JSON
    Status,
    /// Change timer durations; takes effect on the next `timer run`
    Configure {
        /// Work session length in minutes
        #[arg(long)]
        work: Option<u32>,
        /// Short break length in minutes
        #[arg(long = "break")]
        break_minutes: Option<u32>,
        /// Long break length in minutes
        #[arg(long)]
        long_break: Option<u32>,
        /// Work sessions between long breaks
        #[arg(long)]
        cycles: Option<u32>,
        /// Turn the timer on or off
        #[arg(long)]
        enabled: Option<bool>,
    },
    /// Run an interactive timer session (s start, p pause, k skip, r reset, q quit)
    Run,
}

/// Prints completion messages, optionally ringing the terminal bell.
struct TerminalNotifier {
    bell: bool,
}

impl Notifier for TerminalNotifier {
    fn notify(&self, message: &str) {
        let bell = if self.bell { "\x07" } else { "" };
        println!("\n{bell}{message}");
    }
}

fn render(event: &TimerEvent) {
    let snapshot = event.snapshot();
    match event {
        TimerEvent::Tick { .. } => {
            print!("\r{} {}   ", snapshot.session.label(), snapshot.remaining);
            let _ = std::io::stdout().flush();
        }
        TimerEvent::StateChanged { .. } => {
            println!(
                "\n[{:?}] {} {} (cycles: {})",
                snapshot.state,
                snapshot.session.label(),
                snapshot.remaining,
                snapshot.completed_cycles
            );
        }
        TimerEvent::CycleComplete { .. } => {}
    }
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    let db = open_database()?;

    match action {
        TimerAction::Status => {
            let state = db.read()?;
            let restored = bridge::load_config(&state);
            let status = serde_json::json!({
                "config": restored.config,
                "completed_cycles": restored.completed_cycles,
                "pomodoro": state.pomodoro,
            });
            println!("{}", serde_json::to_string_pretty(&status)?);
        }
        TimerAction::Configure {
            work,
            break_minutes,
            long_break,
            cycles,
            enabled,
        } => {
            let patch = ConfigPatch {
                work_minutes: work,
                break_minutes,
                long_break_minutes: long_break,
                cycles_before_long_break: cycles,
                enabled,
            };
            if patch.is_empty() {
                return Err("nothing to configure".into());
            }
            let current = bridge::restore(&db)?.config;
            let updated = current.merged(&patch);
            updated.validate()?;
            db.merge(&bridge::patch_for_config(&patch))?;
            println!("{}", serde_json::to_string_pretty(&updated)?);
        }
        TimerAction::Run => {
            let notifications = Config::load()?.notifications;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(run_session(Arc::new(db), notifications))?;
        }
    }
    Ok(())
}

async fn run_session(
    store: Arc<Database>,
    notifications: NotificationsConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let restored = bridge::restore(store.as_ref())?;
    if !restored.config.enabled {
        println!("Timer is disabled. Enable it with `magictask timer configure --enabled true`.");
        return Ok(());
    }

    let (bridge, writer) = TimerStateBridge::new();
    let bridge = if notifications.enabled {
        bridge.with_notifier(TerminalNotifier {
            bell: notifications.bell,
        })
    } else {
        bridge
    };
    let writer = tokio::spawn(writer.run(store.clone()));

    let mut runner = TimerRunner::new(restored.into_timer())?;
    runner.subscribe(render)?;
    runner.subscribe(bridge)?;
    println!("s start, p pause, k skip, r reset, q quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            "s" => runner.start()?,
            "p" => runner.pause()?,
            "k" => {
                let next = runner.snapshot()?.session.other();
                runner.skip_to(next)?;
            }
            "r" => runner.reset()?,
            "q" => break,
            "" => {}
            other => eprintln!("unknown command: {other}"),
        }
    }

    // Dropping the runner pauses it, so the stored state is never left running.
    drop(runner);
    writer.await?;
    println!();
    Ok(())
}
