//! Application entry point

use std::sync::Arc;

mod config;
mod error;
mod frame;
mod host;
mod panel;
mod refresh;
mod stats;
mod theme;
mod ui;

use config::Config;
use error::Result;
use host::LocalHost;

/// Restore terminal to normal mode.
fn cleanup_terminal() {
    use std::io::Write;
    let mut stdout = std::io::stdout();
    let _ = crossterm::execute!(
        stdout,
        crossterm::event::DisableMouseCapture,
        crossterm::event::DisableBracketedPaste,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    );
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Force immediate terminal cleanup
fn force_cleanup_terminal() {
    use std::io::Write;
    let mut stdout = std::io::stdout();

    let _ = crossterm::execute!(
        stdout,
        crossterm::terminal::Clear(crossterm::terminal::ClearType::All),
        crossterm::cursor::MoveTo(0, 0)
    );

    let _ = crossterm::execute!(
        stdout,
        crossterm::terminal::LeaveAlternateScreen,
        crossterm::cursor::Show
    );

    let _ = crossterm::terminal::disable_raw_mode();
    let _ = stdout.flush();
}

/// Install panic hook to restore terminal before printing error.
fn setup_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        eprintln!("Application panicked!");
        if let Some(location) = panic_info.location() {
            eprintln!("Location: {}", location);
        }
        if let Some(payload) = panic_info.payload().downcast_ref::<&str>() {
            eprintln!("Message: {}", payload);
        } else if let Some(payload) = panic_info.payload().downcast_ref::<String>() {
            eprintln!("Message: {}", payload);
        } else {
            eprintln!("No panic message available");
        }
        original_hook(panic_info);
    }));
}

/// Drain all pending input events until silence.
fn drain_input_events_until_silence(silence_duration: std::time::Duration) {
    use crossterm::event::{poll, read};

    for _ in 0..3 {
        let mut events_drained = 0;
        while poll(silence_duration).unwrap_or(false) {
            let _ = read();
            events_drained += 1;
        }
        if events_drained == 0 {
            break;
        }
    }
}

/// Disable all mouse tracking modes and bracketed paste.
fn disable_all_modes() {
    use std::io::Write;
    let mut stdout = std::io::stdout();

    let _ = stdout.flush();
    let _ = crossterm::execute!(
        stdout,
        crossterm::event::DisableMouseCapture,
        crossterm::event::DisableBracketedPaste
    );
    let _ = stdout.flush();

    // Kill all potential mouse tracking modes
    let combined = "\x1b[?1000l\x1b[?1002l\x1b[?1003l\x1b[?1006l\x1b[?1015l\x1b[?1005l\x1b[?2004l";
    let _ = stdout.write_all(combined.as_bytes());
    let _ = stdout.flush();

    std::thread::sleep(std::time::Duration::from_millis(30));
}

/// Flush OS-level terminal input buffer.
#[cfg(unix)]
fn flush_stdin_buffer() {
    use std::os::unix::io::AsRawFd;
    unsafe {
        libc::tcflush(std::io::stdin().as_raw_fd(), libc::TCIFLUSH);
    }
}

#[cfg(not(unix))]
fn flush_stdin_buffer() {}

/// Route logs to a file; stdout belongs to the TUI.
fn init_logging() {
    let state_dir = std::env::var("XDG_STATE_HOME").unwrap_or_else(|_| {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        format!("{}/.local/state", home)
    });
    let log_dir = std::path::PathBuf::from(state_dir).join("acorn-tracker");
    let file = std::fs::create_dir_all(&log_dir)
        .and_then(|_| {
            std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_dir.join("acorn-tracker.log"))
        });

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    match file {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    let _ = builder.try_init();
}

fn run() -> Result<()> {
    init_logging();

    // Validate before touching the terminal so bad config fails loudly.
    let settings = Config::load(Config::default_path())?.validate()?;
    log::info!(
        "Starting {} (quota {}, refresh every {:?})",
        settings.project_title,
        settings.quota.get(),
        settings.refresh_interval
    );

    let host = Arc::new(LocalHost::new(&settings.host));

    setup_panic_hook();

    // Enable terminal settings
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableBracketedPaste
    )?;
    crossterm::terminal::enable_raw_mode()?;

    let backend = ratatui::backend::CrosstermBackend::new(std::io::stdout());
    let mut terminal = ratatui::Terminal::new(backend)?;

    // Run application
    let result = ui::App::new(settings, host).run(&mut terminal);

    // Terminal cleanup sequence
    disable_all_modes();
    drain_input_events_until_silence(std::time::Duration::from_millis(100));
    flush_stdin_buffer();
    force_cleanup_terminal();

    Ok(result?)
}

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("acorn-tracker: {}", e);
        std::process::exit(1);
    }
}
