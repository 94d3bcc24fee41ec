//! Line writer: renders the metadata prefix and writes whole lines

use chrono::{DateTime, Local, TimeZone, Utc};
use lograte_core::constants::{
    LINE_DATE_FORMAT, LINE_TIME_FORMAT, LINE_TIME_MICROS_FORMAT, LOG_FILE_MODE,
};
use lograte_core::LineFlags;
use std::fmt::{self, Write as _};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::panic::Location;
use std::path::Path;

/// Where a backend's lines end up
pub enum Output {
    /// A log file; statable, so it can take part in size rotation
    File(File),
    /// Any other sink
    Writer(Box<dyn Write + Send>),
}

impl Output {
    pub fn stdout() -> Self {
        Output::Writer(Box::new(io::stdout()))
    }

    pub fn stderr() -> Self {
        Output::Writer(Box::new(io::stderr()))
    }

    pub fn writer<W: Write + Send + 'static>(w: W) -> Self {
        Output::Writer(Box::new(w))
    }

    /// Open (or create) a log file for appending
    pub fn open(path: &Path) -> io::Result<Self> {
        open_append(path).map(Output::File)
    }

    pub fn as_file(&self) -> Option<&File> {
        match self {
            Output::File(file) => Some(file),
            Output::Writer(_) => None,
        }
    }
}

impl fmt::Debug for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::File(file) => f.debug_tuple("File").field(file).finish(),
            Output::Writer(_) => f.write_str("Writer"),
        }
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            Output::File(file) => file.write(buf),
            Output::Writer(w) => w.write(buf),
        }
    }

    fn write_all(&mut self, buf: &[u8]) -> io::Result<()> {
        match self {
            Output::File(file) => file.write_all(buf),
            Output::Writer(w) => w.write_all(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            Output::File(file) => file.flush(),
            Output::Writer(w) => w.flush(),
        }
    }
}

/// Open a file create + append with the log file mode
pub fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .mode(LOG_FILE_MODE)
        .open(path)
}

/// Formats and writes complete lines to an [`Output`]
#[derive(Debug)]
pub struct LineWriter {
    output: Output,
    prefix: String,
    flags: LineFlags,
}

impl LineWriter {
    pub fn new(output: Output, prefix: impl Into<String>, flags: LineFlags) -> Self {
        Self {
            output,
            prefix: prefix.into(),
            flags,
        }
    }

    pub fn flags(&self) -> LineFlags {
        self.flags
    }

    pub fn set_flags(&mut self, flags: LineFlags) {
        self.flags = flags;
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn set_prefix(&mut self, prefix: impl Into<String>) {
        self.prefix = prefix.into();
    }

    pub fn output(&self) -> &Output {
        &self.output
    }

    /// Swap the output, handing back the previous one
    pub fn replace_output(&mut self, output: Output) -> Output {
        std::mem::replace(&mut self.output, output)
    }

    /// Write `message` as one line, prefixed per the flags
    pub fn write_line(&mut self, location: &Location<'_>, message: &str) -> io::Result<()> {
        let line = render_line(self.flags, &self.prefix, Utc::now(), location, message);
        self.output.write_all(line.as_bytes())?;
        self.output.flush()
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.output.flush()
    }
}

/// Build `<prefix><date> <time> <file>:<line>: <message>\n`
pub fn render_line(
    flags: LineFlags,
    prefix: &str,
    now: DateTime<Utc>,
    location: &Location<'_>,
    message: &str,
) -> String {
    let mut line = String::with_capacity(prefix.len() + message.len() + 48);
    line.push_str(prefix);

    if flags.intersects(LineFlags::DATE | LineFlags::TIME | LineFlags::MICROSECONDS) {
        if flags.contains(LineFlags::UTC) {
            push_timestamp(&mut line, flags, &now);
        } else {
            push_timestamp(&mut line, flags, &now.with_timezone(&Local));
        }
    }

    if flags.intersects(LineFlags::SHORT_FILE | LineFlags::LONG_FILE) {
        let file = location.file();
        let file = if flags.contains(LineFlags::SHORT_FILE) {
            file.rsplit(['/', '\\']).next().unwrap_or(file)
        } else {
            file
        };
        let _ = write!(line, "{}:{}: ", file, location.line());
    }

    line.push_str(message);
    if !message.ends_with('\n') {
        line.push('\n');
    }
    line
}

fn push_timestamp<Tz: TimeZone>(line: &mut String, flags: LineFlags, now: &DateTime<Tz>)
where
    Tz::Offset: fmt::Display,
{
    if flags.contains(LineFlags::DATE) {
        let _ = write!(line, "{} ", now.format(LINE_DATE_FORMAT));
    }
    if flags.contains(LineFlags::MICROSECONDS) {
        let _ = write!(line, "{} ", now.format(LINE_TIME_MICROS_FORMAT));
    } else if flags.contains(LineFlags::TIME) {
        let _ = write!(line, "{} ", now.format(LINE_TIME_FORMAT));
    }
}
