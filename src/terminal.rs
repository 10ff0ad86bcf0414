use std::io::{self, IsTerminal};

/// Reports whether the standard streams are attached to a terminal.
///
/// Injected into command runs so tests can force plain, uncoloured output.
pub trait TerminalClient {
    /// Returns whether stdout is a terminal.
    fn stdout_is_terminal(&self) -> bool;
    /// Returns whether stderr is a terminal.
    fn stderr_is_terminal(&self) -> bool;
}

/// Terminal client backed by the process's real standard streams.
#[derive(Debug, Default)]
pub(crate) struct SystemTerminalClient;

impl TerminalClient for SystemTerminalClient {
    fn stdout_is_terminal(&self) -> bool {
        io::stdout().is_terminal()
    }

    fn stderr_is_terminal(&self) -> bool {
        io::stderr().is_terminal()
    }
}
