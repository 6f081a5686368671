use std::io::Write;

use clap::Args;
use pixel_pomodoro_core::{
    Config, Phase, PomodoroSession, Presenter, SessionConfig, SessionSnapshot,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

#[derive(Args)]
pub struct RunArgs {
    /// Work interval in seconds
    #[arg(long)]
    work: Option<u64>,
    /// Short break in seconds
    #[arg(long)]
    short_break: Option<u64>,
    /// Long break in seconds
    #[arg(long)]
    long_break: Option<u64>,
    /// Work sessions between long breaks
    #[arg(long)]
    long_break_every: Option<u64>,
    /// Start the next phase without waiting for `s`
    #[arg(long)]
    auto_resume: bool,
    /// Do not ring the terminal bell at phase boundaries
    #[arg(long)]
    no_bell: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Start,
    Reset,
    Status,
    Quit,
}

fn parse_command(line: &str) -> Option<Command> {
    match line.trim().to_ascii_lowercase().as_str() {
        "s" | "start" => Some(Command::Start),
        "r" | "reset" => Some(Command::Reset),
        "p" | "status" => Some(Command::Status),
        "q" | "quit" | "exit" => Some(Command::Quit),
        _ => None,
    }
}

fn apply_overrides(
    config: &mut Config,
    args: &RunArgs,
) -> Result<SessionConfig, Box<dyn std::error::Error>> {
    let timer = &mut config.timer;
    if let Some(secs) = args.work {
        timer.work_secs = secs;
    }
    if let Some(secs) = args.short_break {
        timer.short_break_secs = secs;
    }
    if let Some(secs) = args.long_break {
        timer.long_break_secs = secs;
    }
    if let Some(every) = args.long_break_every {
        timer.long_break_every = every;
    }
    if args.auto_resume {
        timer.auto_resume = true;
    }
    if args.no_bell {
        config.notifications.bell = false;
    }
    Ok(config.session_config()?)
}

/// Renders session events as single status lines.
struct TerminalScreen<W: Write> {
    out: W,
    label: String,
    clock: String,
    count: u64,
    bell: bool,
    show_count: bool,
    auto_resume: bool,
}

impl<W: Write> TerminalScreen<W> {
    fn new(
        out: W,
        snapshot: &SessionSnapshot,
        config: &SessionConfig,
        bell: bool,
        show_count: bool,
    ) -> Self {
        Self {
            out,
            label: snapshot.label.clone(),
            clock: snapshot.display.clone(),
            count: snapshot.completed_work_sessions,
            bell,
            show_count,
            auto_resume: config.auto_resume(),
        }
    }

    fn status_line(&self) -> String {
        if self.show_count {
            format!("{} {}  sessions: {}", self.label, self.clock, self.count)
        } else {
            format!("{} {}", self.label, self.clock)
        }
    }

    fn redraw(&mut self) {
        let line = self.status_line();
        let _ = write!(self.out, "\r\x1b[2K{line}");
        let _ = self.out.flush();
    }

    fn note(&mut self, message: &str) {
        let _ = writeln!(self.out, "\r\x1b[2K{message}");
        self.redraw();
    }

    fn print_snapshot(&mut self, snapshot: &SessionSnapshot) {
        let state = if snapshot.running { "running" } else { "stopped" };
        let message = format!(
            "{} {} ({state}, {:.0}% done, {} sessions)",
            snapshot.label,
            snapshot.display,
            snapshot.progress * 100.0,
            snapshot.completed_work_sessions
        );
        self.note(&message);
    }
}

impl<W: Write> Presenter for TerminalScreen<W> {
    fn on_display_update(&mut self, display: &str) {
        self.clock = display.to_string();
        self.redraw();
    }

    fn on_phase_changed(&mut self, label: &str) {
        self.label = label.to_string();
    }

    fn on_session_count_changed(&mut self, count: u64) {
        self.count = count;
    }

    fn on_phase_boundary(&mut self, from: Phase, to: Phase) {
        if self.bell {
            let _ = write!(self.out, "\x07");
        }
        if self.auto_resume {
            self.note(&format!("{from} finished, now: {to}"));
        } else {
            self.note(&format!("{from} finished, next up: {to} (press s to start)"));
        }
    }

    fn on_fault(&mut self, message: &str) {
        self.note(&format!("timer fault: {message}"));
    }
}

pub fn run(args: RunArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = Config::load()?;
    let session_config = apply_overrides(&mut config, &args)?;
    let bell = config.notifications.enabled && config.notifications.bell;
    let show_count = config.display.show_session_count;

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(interactive(session_config, bell, show_count));
    // stdin is read on a blocking thread that may still be parked in read().
    runtime.shutdown_background();
    result
}

async fn interactive(
    config: SessionConfig,
    bell: bool,
    show_count: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let (mut session, mut events) = PomodoroSession::with_config(config)?;
    let mut screen = TerminalScreen::new(
        std::io::stdout(),
        &session.snapshot()?,
        &config,
        bell,
        show_count,
    );
    screen.redraw();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            Some(event) = events.recv() => screen.present(&event),
            line = lines.next_line() => {
                let Some(line) = line? else { break };
                let command = parse_command(&line);
                debug!(?command, "command received");
                match command {
                    Some(Command::Start) => {
                        if !session.start()? {
                            screen.note("already running");
                        }
                    }
                    Some(Command::Reset) => session.reset()?,
                    Some(Command::Status) => screen.print_snapshot(&session.snapshot()?),
                    Some(Command::Quit) => break,
                    None if line.trim().is_empty() => {}
                    None => screen.note("commands: s = start, r = reset, p = status, q = quit"),
                }
            }
        }
    }

    session.shutdown();
    while let Ok(event) = events.try_recv() {
        screen.present(&event);
    }
    let _ = writeln!(screen.out);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixel_pomodoro_core::SessionStateMachine;

    fn args() -> RunArgs {
        RunArgs {
            work: None,
            short_break: None,
            long_break: None,
            long_break_every: None,
            auto_resume: false,
            no_bell: false,
        }
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("s"), Some(Command::Start));
        assert_eq!(parse_command(" START \n"), Some(Command::Start));
        assert_eq!(parse_command("r"), Some(Command::Reset));
        assert_eq!(parse_command("status"), Some(Command::Status));
        assert_eq!(parse_command("exit"), Some(Command::Quit));
        assert_eq!(parse_command("pause"), None);
    }

    #[test]
    fn flags_override_config() {
        let mut config = Config::default();
        let mut run_args = args();
        run_args.work = Some(120);
        run_args.long_break_every = Some(2);
        run_args.no_bell = true;
        let session = apply_overrides(&mut config, &run_args).unwrap();
        assert_eq!(session.work_secs(), 120);
        assert_eq!(session.short_break_secs(), 300);
        assert_eq!(session.long_break_every(), 2);
        assert!(!config.notifications.bell);
    }

    #[test]
    fn zero_flag_is_rejected() {
        let mut config = Config::default();
        let mut run_args = args();
        run_args.short_break = Some(0);
        assert!(apply_overrides(&mut config, &run_args).is_err());
    }

    #[test]
    fn screen_rings_bell_on_boundary() {
        let config = SessionConfig::new(1, 5, 9, 4).unwrap();
        let mut machine = SessionStateMachine::new(config);
        let mut screen = TerminalScreen::new(Vec::new(), &machine.snapshot(), &config, true, true);
        let mut events = machine.start();
        events.extend(machine.on_tick());
        for event in &events {
            screen.present(event);
        }

        let output = String::from_utf8(screen.out.clone()).unwrap();
        assert!(output.contains('\x07'));
        assert!(output.contains("Work finished, next up: Short Break"));
        assert!(screen.status_line().starts_with("Short Break 00:05"));
        assert!(screen.status_line().ends_with("sessions: 1"));
    }

    #[test]
    fn screen_without_bell_or_count() {
        let config = SessionConfig::new(1, 5, 9, 4).unwrap().with_auto_resume(true);
        let mut machine = SessionStateMachine::new(config);
        let mut screen = TerminalScreen::new(Vec::new(), &machine.snapshot(), &config, false, false);
        let mut events = machine.start();
        events.extend(machine.on_tick());
        for event in &events {
            screen.present(event);
        }

        let output = String::from_utf8(screen.out.clone()).unwrap();
        assert!(!output.contains('\x07'));
        assert!(output.contains("Work finished, now: Short Break"));
        assert_eq!(screen.status_line(), "Short Break 00:05");
    }
}
