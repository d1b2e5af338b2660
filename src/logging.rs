use std::path::Path;

use flexi_logger::{
    colored_default_format, opt_format, Cleanup, Criterion, Duplicate, FileSpec,
    FlexiLoggerError, Logger, LoggerHandle, Naming,
};

/// Starts the global logger.
///
/// `RUST_LOG` overrides `level`. Without `log_dir`, logs go to stderr in color; with it,
/// to size-rotated files in that directory, duplicated to stderr from `info` up.
/// Keep the returned handle alive for the lifetime of the program.
pub fn setup_logging(
    level: &str,
    log_dir: Option<&Path>,
) -> Result<LoggerHandle, FlexiLoggerError> {
    let logger = Logger::try_with_env_or_str(level)?;
    match log_dir {
        None => logger.format(colored_default_format).start(),
        Some(dir) => logger
            .log_to_file(FileSpec::default().directory(dir).basename("gravc4"))
            .format(opt_format)
            .duplicate_to_stderr(Duplicate::Info)
            .rotate(
                Criterion::Size(10 * 1024 * 1024),
                Naming::Numbers,
                Cleanup::KeepLogFiles(3),
            )
            .start(),
    }
}
