#![warn(missing_docs)]
//! # Structured logging for the gnmi_path crates
//!
//! ## Usage
//! ### Console and filter
//! Log to stderr and narrow the output with a filter:
//! ```bash
//! RUST_LOG='gnmi_path=trace' gnmi-path parse /interfaces/interface[name=eth0]
//! ```
//! `CUSTOM_FILTER` takes the same syntax and replaces `RUST_LOG` when set:
//! ```bash
//! CUSTOM_FILTER='[{path}]=debug' gnmi-path --structured Json render /a/b
//! ```
//! The [Output] type can be parsed from a command line argument and is
//! handed to [init_fmt] on start up.
//!
//! ### Tests
//! Call [test_run] at the top of a test. It does nothing unless `RUST_LOG`
//! is set, so test output stays quiet by default.

use tracing::Subscriber;
use tracing_subscriber::{
    filter::EnvFilter,
    fmt::{
        format::{DefaultFields, Format},
        time::UtcTime,
        MakeWriter, TestWriter,
    },
    layer::SubscriberExt,
    registry::LookupSpan,
    util::SubscriberInitExt,
    Layer, Registry,
};

use derive_more::Display;
use std::str::FromStr;

pub use tracing;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Display)]
/// Sets the kind of structured logging output you want
pub enum Output {
    /// More compact version of `Log`
    Compact,
    /// Outputs everything as json
    Json,
    /// Regular logging (default)
    #[default]
    Log,
    /// No logging to console
    None,
}

/// ParseError is a String
pub type ParseError = String;

impl FromStr for Output {
    type Err = ParseError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Json" => Ok(Output::Json),
            "Log" => Ok(Output::Log),
            "Compact" => Ok(Output::Compact),
            "None" => Ok(Output::None),
            _ => Err(format!("Could not parse log output type: {}", s)),
        }
    }
}

/// Run logging in a unit test.
///
/// RUST_LOG must be set or this is a no-op.
pub fn test_run() -> Result<(), errors::TracingError> {
    if std::env::var_os("RUST_LOG").is_none() {
        return Ok(());
    }

    init_fmt_with_opts(Output::Log, TestWriter::new())
}

/// Build the canonical filter based on env
pub fn standard_filter() -> Result<EnvFilter, errors::TracingError> {
    let mut filter = match std::env::var("RUST_LOG") {
        Ok(_) => EnvFilter::from_default_env(),
        Err(_) => EnvFilter::from_default_env().add_directive("warn".parse()?),
    };
    if std::env::var("CUSTOM_FILTER").is_ok() {
        EnvFilter::try_from_env("CUSTOM_FILTER")
            .map_err(|e| eprintln!("Failed to parse CUSTOM_FILTER {:?}", e))
            .map(|f| {
                filter = f;
            })
            .ok();
    }
    Ok(filter)
}

/// Return a layer directly, for times when you need more control over the
/// produced subscriber
pub fn standard_layer_unfiltered<W, S>(
    writer: W,
) -> tracing_subscriber::fmt::Layer<S, DefaultFields, Format, W>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    S: Subscriber + Send + Sync + for<'span> LookupSpan<'span>,
{
    tracing_subscriber::fmt::Layer::default()
        .with_writer(writer)
        .with_file(true)
        .with_line_number(true)
        .with_target(true)
}

/// The standard layer with [standard_filter] applied.
pub fn standard_layer<W, S>(writer: W) -> Result<impl Layer<S>, errors::TracingError>
where
    W: for<'w> MakeWriter<'w> + Send + Sync + 'static,
    S: Subscriber + Send + Sync + for<'span> LookupSpan<'span>,
{
    let filter = standard_filter()?;

    Ok(standard_layer_unfiltered(writer).with_filter(filter))
}

/// This checks RUST_LOG for a filter but doesn't complain if there is none or it doesn't parse.
/// It then checks for CUSTOM_FILTER which if set will output an error if it doesn't parse.
pub fn init_fmt(output: Output) -> Result<(), errors::TracingError> {
    init_fmt_with_opts(output, std::io::stderr)
}

fn init_fmt_with_opts<W>(output: Output, writer: W) -> Result<(), errors::TracingError>
where
    W: for<'writer> MakeWriter<'writer> + Send + Sync + 'static,
{
    match output {
        Output::Json => Registry::default()
            .with(
                standard_layer_unfiltered(writer)
                    .with_timer(UtcTime::rfc_3339())
                    .json()
                    .with_filter(standard_filter()?),
            )
            .try_init()?,

        Output::Log => Registry::default().with(standard_layer(writer)?).try_init()?,

        Output::Compact => Registry::default()
            .with(
                standard_layer_unfiltered(writer)
                    .compact()
                    .with_filter(standard_filter()?),
            )
            .try_init()?,

        Output::None => (),
    };
    Ok(())
}

pub mod errors {
    //! Error in the tracing/logging framework

    use thiserror::Error;

    /// Error in the tracing/logging framework
    #[allow(missing_docs)] // should be self-explanatory
    #[derive(Error, Debug)]
    pub enum TracingError {
        #[error(transparent)]
        SetGlobal(#[from] tracing_subscriber::util::TryInitError),
        #[error(transparent)]
        BadDirective(#[from] tracing_subscriber::filter::ParseError),
    }
}
