// UI layer: the interactive prompt loop. It reads one line at a time,
// splits it into a command name and arguments and hands them to the
// registered handler. Handlers run to completion before the next prompt.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error};

use crate::api::ApiClient;
use crate::commands::{CommandRegistry, Context, Flow};
use crate::session::Session;

pub const PROMPT: &str = "$ghcli ";

/// Run `f` while a spinner with `message` turns on stderr. indicatif hides
/// the spinner when stderr is not a terminal.
pub fn with_spinner<T>(message: impl Into<Cow<'static, str>>, f: impl FnOnce() -> T) -> T {
    let spinner = ProgressBar::new_spinner();
    let style = ProgressStyle::with_template("{spinner} {msg}").unwrap_or_else(|_| ProgressStyle::default_spinner());
    spinner.set_style(style);
    spinner.set_message(message);
    spinner.tick();
    let result = f();
    spinner.finish_and_clear();
    result
}

/// Split a raw input line on whitespace runs.
pub fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace().map(str::to_string).collect()
}

/// Main interactive loop. Returns when a handler asks to exit or the input
/// runs out; either way the session ends unauthenticated.
///
/// Bytes that are not valid UTF-8 are replaced, not rejected. Only a failing
/// read ends the loop with an error.
pub fn run<R, W>(
    registry: &CommandRegistry,
    api: &ApiClient,
    session: &mut Session,
    mut input: R,
    mut out: W,
) -> io::Result<()>
where
    R: BufRead,
    W: Write,
{
    writeln!(out, "Welcome to GitHub CLI Tool\n\n")?;

    let mut buf = Vec::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        buf.clear();
        let read = match input.read_until(b'\n', &mut buf) {
            Ok(n) => n,
            Err(e) => {
                error!(error = %e, "failed to read input");
                writeln!(out, "Error reading input: {e}")?;
                session.clear();
                return Err(e);
            }
        };
        if read == 0 {
            debug!("end of input");
            writeln!(out)?;
            session.clear();
            return Ok(());
        }

        let line = String::from_utf8_lossy(&buf);
        let tokens = tokenize(&line);
        let Some((name, args)) = tokens.split_first() else {
            writeln!(out, "Please enter a command (type 'help' to list them)")?;
            continue;
        };

        let Some(handler) = registry.lookup(name) else {
            writeln!(out, "Command not found: {name}")?;
            continue;
        };

        debug!(command = %name, args = args.len(), "dispatching");
        let mut ctx = Context {
            api,
            session: &mut *session,
            out: &mut out,
        };
        if handler(&mut ctx, args)? == Flow::Exit {
            session.clear();
            return Ok(());
        }
    }
}
