use anyhow::Error;
use dialprep_config::ConfigError;
use dialprep_core::CoreError;
use dialprep_io::IoError;
use std::process::ExitCode;
use thiserror::Error as ThisError;

pub const EXIT_FAILURE: u8 = 1;
pub const EXIT_NOT_FOUND: u8 = 2;
pub const EXIT_INVALID_INPUT: u8 = 3;

#[derive(Debug, ThisError)]
pub enum CliError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

pub fn invalid_input(message: impl Into<String>) -> Error {
    CliError::InvalidInput(message.into()).into()
}

pub fn report_error(err: &Error, verbose: bool) {
    if verbose {
        eprintln!("error: {:#}", err);
    } else {
        eprintln!("error: {}", err);
    }
}

pub fn exit_code_for(err: &Error) -> ExitCode {
    for cause in err.chain() {
        if let Some(_cli_err) = cause.downcast_ref::<CliError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
        if let Some(io_err) = cause.downcast_ref::<IoError>() {
            return ExitCode::from(io_exit_code(io_err));
        }
        if let Some(config_err) = cause.downcast_ref::<ConfigError>() {
            return ExitCode::from(config_exit_code(config_err));
        }
        if let Some(_core_err) = cause.downcast_ref::<CoreError>() {
            return ExitCode::from(EXIT_INVALID_INPUT);
        }
    }
    ExitCode::from(EXIT_FAILURE)
}

fn io_exit_code(err: &IoError) -> u8 {
    match err {
        IoError::NotFound(_) => EXIT_NOT_FOUND,
        IoError::UnsupportedFormat(_) | IoError::EmptyTable(_) | IoError::Parse { .. } => {
            EXIT_INVALID_INPUT
        }
        IoError::Read { .. } | IoError::Write { .. } | IoError::Serialize { .. } => EXIT_FAILURE,
    }
}

fn config_exit_code(err: &ConfigError) -> u8 {
    match err {
        ConfigError::MissingHomeDir => EXIT_FAILURE,
        ConfigError::InvalidConfigPath(_)
        | ConfigError::MissingConfigFile(_)
        | ConfigError::InvalidTextProtectPrefix(_)
        | ConfigError::UnknownRegion(_)
        | ConfigError::EmptyRegions
        | ConfigError::EmptyMarker(_)
        | ConfigError::EmptyColumn(_)
        | ConfigError::Read { .. }
        | ConfigError::Parse { .. } => EXIT_INVALID_INPUT,
    }
}
