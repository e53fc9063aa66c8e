//! `mouse_probe` - print decoded mouse events from the real terminal
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin mouse_probe
//! cargo run --bin mouse_probe -- --threshold 2 --dev
//! ```
//!
//! A 20x3 target sits at the top-left corner; enter, leave and click on it
//! are reported alongside every raw event. Press `q` or Ctrl+C to quit.

use opentui_mouse::terminal::{InputChannel, StdinChannel};
use opentui_mouse::{
    ElementId, EventType, LogLevel, MouseSession, Rect, SessionOptions, ValidationMode,
    set_log_callback,
};
use std::cell::Cell;
use std::ffi::OsString;
use std::io::{self, Write};
use std::rc::Rc;

const HELP_TEXT: &str = "mouse_probe - print terminal mouse events

USAGE:
    mouse_probe [OPTIONS]

OPTIONS:
    -h, --help              Print this help message and exit
    --threshold <N>         Click distance threshold in cells (default: 1)
    --dev                   Probe handlers at registration (development mode)

Press q or Ctrl+C to quit.
";

/// Probe configuration parsed from command-line arguments.
#[derive(Clone, Copy, Debug)]
struct Config {
    options: SessionOptions,
}

enum ParseResult {
    Config(Config),
    Help,
    Error(String),
}

impl Config {
    fn from_args<I>(args: I) -> ParseResult
    where
        I: IntoIterator<Item = OsString>,
    {
        let mut options = SessionOptions::from_env();
        let mut args = args.into_iter();

        // Skip program name
        args.next();

        while let Some(arg) = args.next() {
            let arg_str = arg.to_string_lossy();
            match arg_str.as_ref() {
                "-h" | "--help" => return ParseResult::Help,
                "--dev" => options.validation = ValidationMode::Development,
                "--threshold" => {
                    let value = match args.next() {
                        Some(v) => v.to_string_lossy().to_string(),
                        None => {
                            return ParseResult::Error("--threshold requires a value".to_string());
                        }
                    };
                    match value.parse::<u32>() {
                        Ok(n) => options.click_distance_threshold = n,
                        Err(_) => {
                            return ParseResult::Error(format!(
                                "Invalid --threshold value: {value}"
                            ));
                        }
                    }
                }
                other => return ParseResult::Error(format!("Unknown argument: {other}")),
            }
        }

        ParseResult::Config(Self { options })
    }
}

/// Stdin that raises a flag when the user asks to quit.
///
/// Mouse tracking is requested in SGR form, whose reports never contain
/// `q` or ETX, so any chunk carrying one is a keypress.
struct QuitWatch {
    inner: StdinChannel,
    quit: Rc<Cell<bool>>,
}

impl InputChannel for QuitWatch {
    fn is_terminal(&self) -> bool {
        self.inner.is_terminal()
    }

    fn is_raw_mode(&self) -> bool {
        self.inner.is_raw_mode()
    }

    fn set_raw_mode(&mut self, raw: bool) -> io::Result<()> {
        self.inner.set_raw_mode(raw)
    }

    fn enable_utf8(&mut self) -> io::Result<()> {
        self.inner.enable_utf8()
    }

    fn resume(&mut self) -> io::Result<()> {
        self.inner.resume()
    }

    fn suspend(&mut self) -> io::Result<()> {
        self.inner.suspend()
    }

    fn is_suspended(&self) -> bool {
        self.inner.is_suspended()
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read_chunk(buf)?;
        if buf[..n].iter().any(|&b| b == b'q' || b == 0x03) {
            self.quit.set(true);
        }
        Ok(n)
    }
}

fn run(config: Config) -> opentui_mouse::Result<()> {
    set_log_callback(|level, message| {
        if level != LogLevel::Debug {
            eprint!("[{level:?}] {message}\r\n");
        }
    });

    let quit = Rc::new(Cell::new(false));
    let input = QuitWatch {
        inner: StdinChannel::new(),
        quit: Rc::clone(&quit),
    };
    let target = Rect::new(1, 1, 20, 3);
    let layout = move |_: ElementId| Some(target);
    let mut session = MouseSession::new(input, io::stdout(), layout, config.options);

    session.bus().subscribe_all(|event| {
        let mods = [("shift", event.shift), ("alt", event.alt), ("ctrl", event.ctrl)]
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| *name)
            .collect::<Vec<_>>()
            .join("+");
        print!("{event} {mods}\r\n");
        let _ = io::stdout().flush();
    });

    let element = session.mount();
    for event_type in [EventType::MouseEnter, EventType::MouseLeave, EventType::Click] {
        session.on(element, event_type, move |_| {
            print!("  target: {event_type}\r\n");
        });
    }

    session.enable()?;
    print!("mouse_probe: move, click or scroll; q to quit\r\n");
    while !quit.get() {
        session.pump()?;
    }
    session.destroy()
}

fn main() {
    match Config::from_args(std::env::args_os()) {
        ParseResult::Config(config) => {
            if let Err(e) = run(config) {
                eprintln!("mouse_probe: {e}");
                std::process::exit(1);
            }
        }
        ParseResult::Help => print!("{HELP_TEXT}"),
        ParseResult::Error(message) => {
            eprintln!("error: {message}\n\n{HELP_TEXT}");
            std::process::exit(2);
        }
    }
}
