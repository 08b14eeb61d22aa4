//! Command-line parsing and path opening: the external collaborators
//! spec.md §1 places deliberately out of THE CORE's scope.

use std::fs::{File, OpenOptions};
use std::os::unix::io::IntoRawFd;

use clap::Parser;
use snafu::ResultExt;

use crate::error::{CliError, OpenInputSnafu, OpenOutputSnafu};

/// `-` means stdin (for inputs) or stdout (for outputs), matching the
/// original program's degenerate 1:1 usage as a transparent pipe.
const STDIO_MARKER: &str = "-";

#[derive(Parser, Debug)]
#[command(
    name = "mimux",
    about = "Route whole records from N inputs to M outputs without splitting them"
)]
pub struct Cli {
    /// An input path to read records from. Repeatable. `-` means stdin.
    /// Defaults to a single stdin input when none are given.
    #[arg(short = 'i', long = "input", value_name = "PATH")]
    pub inputs: Vec<String>,

    /// An output path to write records to. Repeatable. `-` means stdout.
    /// Defaults to a single stdout output when none are given.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub outputs: Vec<String>,
}

impl Cli {
    /// Opens every named input/output path, falling back to a single
    /// stdin input and a single stdout output when the corresponding list
    /// is empty.
    pub fn open(self) -> Result<(Vec<mimux_core::NamedInput>, Vec<mimux_core::NamedOutput>), CliError>
    {
        let input_paths = if self.inputs.is_empty() {
            vec![STDIO_MARKER.to_string()]
        } else {
            self.inputs
        };
        let output_paths = if self.outputs.is_empty() {
            vec![STDIO_MARKER.to_string()]
        } else {
            self.outputs
        };

        let inputs = input_paths
            .into_iter()
            .map(open_input)
            .collect::<Result<Vec<_>, _>>()?;
        let outputs = output_paths
            .into_iter()
            .map(open_output)
            .collect::<Result<Vec<_>, _>>()?;
        Ok((inputs, outputs))
    }
}

fn open_input(path: String) -> Result<mimux_core::NamedInput, CliError> {
    // `Stdin`/`Stdout` don't implement `IntoRawFd` (their descriptor isn't
    // uniquely owned), so stdio is addressed by its well-known fd number
    // instead of going through a `File` handle.
    let fd = if path == STDIO_MARKER {
        libc::STDIN_FILENO
    } else {
        File::open(&path)
            .context(OpenInputSnafu { path: path.clone() })?
            .into_raw_fd()
    };
    Ok(mimux_core::NamedInput { fd, name: path })
}

fn open_output(path: String) -> Result<mimux_core::NamedOutput, CliError> {
    let fd = if path == STDIO_MARKER {
        libc::STDOUT_FILENO
    } else {
        OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .context(OpenOutputSnafu { path: path.clone() })?
            .into_raw_fd()
    };
    Ok(mimux_core::NamedOutput { fd, name: path })
}
