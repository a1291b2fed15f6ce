use std::io::{self, Write};

use explite_protocol::{DaemonReply, DaemonResponse, DriveInfo, LoadEvent, MediaFile, SessionStatus};
use serde_json::json;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output with optional colors.
    #[default]
    Human,
    /// NDJSON (newline-delimited JSON) for machine consumption.
    Json,
}

/// Color handling strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColorChoice {
    /// Automatically detect TTY and enable colors if appropriate.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

/// Configuration for printing daemon replies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrinterConfig {
    /// Output format (human or JSON).
    pub format: OutputFormat,
    /// Color handling strategy.
    pub color: ColorChoice,
}

/// Renders one daemon reply.
///
/// Listings go to the output stream; user-facing messages go to the error
/// stream so pipelines only ever see data.
pub trait ReplyPrinter {
    fn print_reply(&mut self, reply: &DaemonReply) -> io::Result<()>;
}

pub fn make_printer(cfg: PrinterConfig) -> Box<dyn ReplyPrinter> {
    match cfg.format {
        OutputFormat::Human => Box::new(HumanPrinter::<io::Stdout, io::Stderr>::stdout(cfg)),
        OutputFormat::Json => Box::new(JsonPrinter::<io::Stdout, io::Stderr>::stdout()),
    }
}

/// Human-readable printer with optional color support.
pub struct HumanPrinter<W: Write, E: Write> {
    out: W,
    err: E,
    use_color: bool,
}

impl<W: Write, E: Write> HumanPrinter<W, E> {
    pub fn new(out: W, err: E, cfg: PrinterConfig) -> Self {
        // Generic writers cannot be probed for a TTY.
        let use_color = cfg.color == ColorChoice::Always;
        Self {
            out,
            err,
            use_color,
        }
    }

    /// Create a printer that writes to stdout and stderr with TTY detection.
    pub fn stdout(cfg: PrinterConfig) -> HumanPrinter<io::Stdout, io::Stderr> {
        use std::io::IsTerminal;

        let use_color = match cfg.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => io::stdout().is_terminal(),
        };

        HumanPrinter {
            out: io::stdout(),
            err: io::stderr(),
            use_color,
        }
    }

    #[inline]
    fn format_name(&self, file: &MediaFile) -> String {
        if file.is_file {
            file.name.clone()
        } else if self.use_color {
            format!("\x1b[34m{}/\x1b[0m", file.name)
        } else {
            format!("{}/", file.name)
        }
    }

    fn print_files(&mut self, files: &[MediaFile]) -> io::Result<()> {
        for file in files {
            if file.original_path.is_empty() {
                let name = self.format_name(file);
                writeln!(
                    self.out,
                    "{:<19}  {:>10}  {}",
                    file.mdate_string, file.size_string, name
                )?;
            } else {
                // Recycle-bin rows print the selector `restore`/`purge` accept.
                writeln!(
                    self.out,
                    "{:<19}  {:>10}  {}@{}",
                    file.ddate_string, file.size_string, file.original_path, file.ddate
                )?;
            }
        }
        Ok(())
    }

    fn print_loaded(&mut self, ev: &LoadEvent) -> io::Result<()> {
        if ev.failed {
            return writeln!(self.err, "[error] cannot read {}", ev.directory);
        }
        writeln!(self.err, "{} ({} items)", ev.directory, ev.files.len())?;
        self.print_files(&ev.files)
    }

    fn print_volumes(&mut self, volumes: &[DriveInfo]) -> io::Result<()> {
        for v in volumes {
            writeln!(
                self.out,
                "{:<20}  {:>10} free of {:>10}  {}",
                v.label,
                human_bytes(v.available),
                human_bytes(v.total),
                v.path
            )?;
        }
        Ok(())
    }

    fn print_status(&mut self, st: &SessionStatus) -> io::Result<()> {
        writeln!(self.out, "directory: {}", st.current_dir)?;
        writeln!(self.out, "watching:  {}", st.watch_target)?;
        writeln!(self.out, "items:     {}", st.file_count)?;
        if st.searching {
            writeln!(self.out, "search:    {}", st.search_key)?;
        }
        writeln!(self.out, "undo:      {}", yes_no(st.can_undo))?;
        writeln!(self.out, "redo:      {}", yes_no(st.can_redo))
    }
}

impl<W: Write, E: Write> ReplyPrinter for HumanPrinter<W, E> {
    fn print_reply(&mut self, reply: &DaemonReply) -> io::Result<()> {
        match &reply.response {
            DaemonResponse::Pong => writeln!(self.out, "pong")?,
            DaemonResponse::Status(st) => self.print_status(st)?,
            DaemonResponse::Loaded(ev) => self.print_loaded(ev)?,
            DaemonResponse::Sorted(r) => self.print_files(&r.files)?,
            DaemonResponse::Searched(r) => self.print_files(&r.files)?,
            DaemonResponse::Created(r) if r.success => {
                writeln!(self.out, "{}", decode_id(&r.new_item_id))?
            }
            DaemonResponse::Renamed(r) if r.done && !r.new_id.is_empty() => {
                writeln!(self.out, "{}", decode_id(&r.new_id))?
            }
            DaemonResponse::Moved(r) => {
                for path in &r.full_paths {
                    writeln!(self.out, "{path}")?;
                }
            }
            DaemonResponse::Volumes(v) => self.print_volumes(v)?,
            DaemonResponse::Favorites(favs) => {
                for fav in favs {
                    writeln!(self.out, "{fav}")?;
                }
            }
            DaemonResponse::Error(e) => writeln!(self.err, "[error] {e}")?,
            DaemonResponse::Created(_) | DaemonResponse::Renamed(_) | DaemonResponse::Done(_) => {}
        }

        for msg in &reply.messages {
            writeln!(self.err, "[error] {msg}")?;
        }
        self.out.flush()
    }
}

pub struct JsonPrinter<W: Write, E: Write> {
    out: W,
    err: E,
}

impl<W: Write, E: Write> JsonPrinter<W, E> {
    pub fn new(out: W, err: E) -> Self {
        Self { out, err }
    }

    /// Create a printer that writes to stdout and stderr.
    pub fn stdout() -> JsonPrinter<io::Stdout, io::Stderr> {
        JsonPrinter {
            out: io::stdout(),
            err: io::stderr(),
        }
    }

    fn print_files(&mut self, kind: &str, files: &[MediaFile]) -> io::Result<()> {
        for file in files {
            writeln!(self.out, "{}", json!({ "type": "file", "file": file }))?;
        }
        let summary = json!({ "type": "summary", "kind": kind, "total": files.len() });
        writeln!(self.out, "{summary}")
    }
}

impl<W: Write, E: Write> ReplyPrinter for JsonPrinter<W, E> {
    fn print_reply(&mut self, reply: &DaemonReply) -> io::Result<()> {
        match &reply.response {
            DaemonResponse::Loaded(ev) => {
                self.print_files("loaded", &ev.files)?;
                let obj = json!({
                    "type": "directory",
                    "directory": ev.directory,
                    "navigation": ev.navigation,
                    "sort_type": ev.sort_type,
                    "failed": ev.failed,
                    "headers": ev.headers,
                });
                writeln!(self.out, "{obj}")?;
            }
            DaemonResponse::Sorted(r) => self.print_files("sorted", &r.files)?,
            DaemonResponse::Searched(r) => self.print_files("searched", &r.files)?,
            other => {
                let obj = json!({ "type": "response", "response": other });
                writeln!(self.out, "{obj}")?;
            }
        }

        for msg in &reply.messages {
            writeln!(self.err, "{}", json!({ "type": "message", "text": msg }))?;
        }
        self.out.flush()
    }
}

fn decode_id(id: &str) -> String {
    urlencoding::decode(id)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| id.to_string())
}

fn yes_no(b: bool) -> &'static str {
    if b { "yes" } else { "no" }
}

fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{value:.1} {}", UNITS[unit])
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
