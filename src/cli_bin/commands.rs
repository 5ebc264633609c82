//! CLI command handlers that bridge CLI arguments to library operations

use crate::cli_bin::args::LocateArgs;
use log::debug;
use std::io::Write;
use yasak::core::Pointer;
use yasak::error::{Result, YasakError};
use yasak::io::{render, Location, OutputFormat, YamlReader};

/// Settings that shape how a lookup is reported
#[derive(Debug, Clone, Copy, Default)]
pub struct LocateOptions {
    /// Swallow errors caused by the path not leading to a value
    pub silent: bool,
    pub format: OutputFormat,
    pub pretty: bool,
}

/// Execute the locate command, writing the result to `out`
///
/// An absent optional key at the end of the path writes nothing.
pub fn locate_command<W: Write>(
    args: &LocateArgs,
    options: &LocateOptions,
    out: &mut W,
) -> Result<()> {
    debug!("Executing locate command with args: {:?}", args);
    debug!("file: '{}'", args.file.display());
    debug!("path: '{}'", args.path);

    let reader = YamlReader::new();
    reader.ensure_exists(&args.file)?;

    let pointer =
        Pointer::parse(&args.path).map_err(|e| YasakError::invalid_path(&args.path, e))?;
    debug!("parsed path: {:?}", pointer);

    let root = reader.read_file(&args.file)?;

    match yasak::locate_in(&root, &pointer) {
        Ok(Some(location)) => write_location(&location, options, out),
        Ok(None) => {
            debug!("optional key is absent at '{}'", pointer);
            Ok(())
        }
        Err(err) if options.silent && err.is_not_found() => {
            debug!("suppressed: {}", err);
            Ok(())
        }
        Err(err) => Err(err),
    }
}

fn write_location<W: Write>(
    location: &Location,
    options: &LocateOptions,
    out: &mut W,
) -> Result<()> {
    let rendered = render(location, options.format, options.pretty)?;
    out.write_all(rendered.as_bytes())?;
    Ok(())
}

/// Message printed on stderr for a failed command
///
/// Errors about the path not leading to a value are printed as they are.
/// Problems with the inputs get an `ERROR: ` prefix.
pub fn error_message(err: &YasakError) -> String {
    if err.is_not_found() {
        err.to_string()
    } else {
        format!("ERROR: {}", err)
    }
}
