//! File-backed `env_logger` sink, scoped to one session.

use std::{
    fs::File,
    io::{self, Write},
    path::Path,
};

use env_logger::{fmt::Formatter, Logger, Target, WriteStyle};
use log::{Level, LevelFilter, Record, SetLoggerError};

/// Writes one line per record to a session log file.
///
/// The file is truncated when the log is opened. If it cannot be created the
/// failure is reported once on stderr and every record is dropped.
#[derive(Debug)]
pub(crate) struct SessionLog {
    logger: Logger,
}

impl SessionLog {
    /// Opens `path` for writing, replacing any previous contents.
    pub(crate) fn open(path: &Path, level: LevelFilter) -> Self {
        let target: Box<dyn Write + Send> = match File::create(path) {
            Ok(file) => Box::new(file),
            Err(error) => {
                eprintln!("Failed to open log file: {} ({error})", path.display());
                Box::new(io::sink())
            }
        };

        let logger = env_logger::Builder::new()
            .filter_level(level)
            .write_style(WriteStyle::Never)
            .target(Target::Pipe(target))
            .format(format_record)
            .build();
        Self { logger }
    }

    /// Installs the log as the process-wide logger.
    pub(crate) fn install(self) -> Result<(), SetLoggerError> {
        let level = self.logger.filter();
        log::set_boxed_logger(Box::new(self.logger))?;
        log::set_max_level(level);
        Ok(())
    }
}

/// Flushes whatever the installed logger still buffers.
pub(crate) fn close() {
    log::logger().flush();
}

fn format_record(buf: &mut Formatter, record: &Record<'_>) -> io::Result<()> {
    match record.level() {
        Level::Error | Level::Warn => writeln!(buf, "{}: {}", record.level(), record.args()),
        _ => writeln!(buf, "{}", record.args()),
    }
}

#[cfg(test)]
mod tests {
    use super::SessionLog;
    use log::{Level, LevelFilter, Log, Record};
    use std::fs;

    fn emit(log: &SessionLog, level: Level, message: &str) {
        log.logger.log(
            &Record::builder()
                .level(level)
                .args(format_args!("{message}"))
                .build(),
        );
    }

    #[test]
    fn truncates_and_appends_lines() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("game_log.txt");
        fs::write(&path, "stale contents\n").expect("seed file");

        let log = SessionLog::open(&path, LevelFilter::Info);
        emit(&log, Level::Info, "Placed tower at grid (3, 4)");
        emit(&log, Level::Warn, "Max towers reached!");
        emit(&log, Level::Debug, "below the session level");
        log.logger.flush();

        let written = fs::read_to_string(&path).expect("log readable");
        assert_eq!(
            written,
            "Placed tower at grid (3, 4)\nWARN: Max towers reached!\n"
        );
    }

    #[test]
    fn unopenable_file_drops_records() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("missing").join("game_log.txt");

        let log = SessionLog::open(&path, LevelFilter::Info);
        emit(&log, Level::Error, "nowhere to go");
        log.logger.flush();
        assert!(!path.exists());
        assert_eq!(log.logger.filter(), LevelFilter::Info);
    }
}
