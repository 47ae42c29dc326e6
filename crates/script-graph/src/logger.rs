use log::{LevelFilter, SetLoggerError};
use log4rs::{
    Config,
    append::console::{ConsoleAppender, Target},
    config::{Appender, Root, runtime::ConfigErrors},
    encode::pattern::PatternEncoder,
};

/// Failure to install the console logger.
#[derive(thiserror::Error, Debug)]
pub enum LoggerError {
    /// The appender configuration was rejected.
    #[error("Invalid logger configuration: {0}")]
    Config(#[from] ConfigErrors),

    /// A logger is already installed.
    #[error("Logger already set: {0}")]
    AlreadySet(#[from] SetLoggerError),
}

/// Install a console logger on stderr and log panics through it.
///
/// Stdout stays free for the decoded output.
pub fn init_log(level: LevelFilter) -> Result<(), LoggerError> {
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{h({l})} - {f}:{L}] {m}{n}")))
        .build();
    let appender = Appender::builder().build("stderr", Box::new(stderr));

    log4rs::init_config(
        Config::builder()
            .appender(appender)
            .build(Root::builder().appender("stderr").build(level))?,
    )?;
    update_panic_hook();

    Ok(())
}

fn update_panic_hook() {
    let hook = std::panic::take_hook();

    std::panic::set_hook(Box::new(move |info| {
        log::error!("PANIC => {info}");
        hook(info);
    }));
}
