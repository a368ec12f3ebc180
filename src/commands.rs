// Command registry and the built-in command handlers.
//
// A handler gets the arguments that followed the command name and a
// `Context` with everything it may touch. It prints its own output and its
// own errors; the only thing it reports back is whether the loop goes on.

use std::collections::HashMap;
use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use reqwest::StatusCode;

use crate::api::{ApiClient, EventDetail};
use crate::error::CliError;
use crate::session::Session;
use crate::ui::with_spinner;

/// What the dispatch loop does after a handler returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Collaborators handed to every handler invocation.
pub struct Context<'a> {
    pub api: &'a ApiClient,
    pub session: &'a mut Session,
    pub out: &'a mut dyn Write,
}

pub type Handler = Box<dyn Fn(&mut Context<'_>, &[String]) -> io::Result<Flow>>;

type BuiltinFn = fn(&mut Context<'_>, &[String]) -> io::Result<Flow>;

/// A command shipped with the CLI, with the text `help` shows for it.
pub struct Builtin {
    pub name: &'static str,
    pub synopsis: &'static str,
    pub summary: &'static str,
    handler: BuiltinFn,
}

/// Built-in commands in the order `help` lists them.
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "user",
        synopsis: "user <username>",
        summary: "Fetch and display GitHub user stats",
        handler: user_command,
    },
    Builtin {
        name: "activity",
        synopsis: "activity <username>",
        summary: "Fetch and display recent activity for the GitHub user",
        handler: activity_command,
    },
    Builtin {
        name: "read",
        synopsis: "read <username> <repo>",
        summary: "Fetch and display the README of a repository",
        handler: readme_command,
    },
    Builtin {
        name: "list",
        synopsis: "list <username>",
        summary: "List the public repositories of a user",
        handler: list_command,
    },
    Builtin {
        name: "set",
        synopsis: "set <token>",
        summary: "Validate and store a GitHub token for this session",
        handler: set_token_command,
    },
    Builtin {
        name: "unset",
        synopsis: "unset",
        summary: "Clear the stored token",
        handler: unset_token_command,
    },
    Builtin {
        name: "fork",
        synopsis: "fork <username> <repo>",
        summary: "Fork a repository into your account (needs a token)",
        handler: fork_command,
    },
    Builtin {
        name: "clear",
        synopsis: "clear",
        summary: "Clear the screen",
        handler: clear_command,
    },
    Builtin {
        name: "help",
        synopsis: "help",
        summary: "Show this list",
        handler: help_command,
    },
    Builtin {
        name: "exit",
        synopsis: "exit",
        summary: "Clear the token and exit the program",
        handler: exit_command,
    },
];

/// Name to handler mapping. Registering a name twice keeps the last handler.
#[derive(Default)]
pub struct CommandRegistry {
    handlers: HashMap<String, Handler>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        CommandRegistry::default()
    }

    /// Registry holding every entry of [`BUILTINS`].
    pub fn with_builtins() -> Self {
        let mut registry = CommandRegistry::new();
        for builtin in BUILTINS {
            registry.register(builtin.name, builtin.handler);
        }
        registry
    }

    pub fn register<F>(&mut self, name: impl Into<String>, handler: F)
    where
        F: Fn(&mut Context<'_>, &[String]) -> io::Result<Flow> + 'static,
    {
        self.handlers.insert(name.into(), Box::new(handler));
    }

    pub fn lookup(&self, name: &str) -> Option<&Handler> {
        self.handlers.get(name)
    }
}

/// Check the argument count before anything touches the network.
fn require_args(args: &[String], count: usize, usage: &'static str) -> Result<(), CliError> {
    if args.len() < count {
        return Err(CliError::Usage(usage));
    }
    Ok(())
}

fn user_command(ctx: &mut Context<'_>, args: &[String]) -> io::Result<Flow> {
    if let Err(e) = require_args(args, 1, "Usage: user <username>") {
        writeln!(ctx.out, "{e}")?;
        return Ok(Flow::Continue);
    }
    let username = &args[0];

    let api = ctx.api;
    let user = match with_spinner(format!("Fetching {username}..."), || api.fetch_user(username)) {
        Ok(user) => user,
        Err(e) => {
            writeln!(ctx.out, "Error fetching data: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    writeln!(ctx.out, "\n--- GitHub Stats for {} ---", user.login)?;
    writeln!(ctx.out, "Name: {}", user.name.as_deref().unwrap_or_default())?;
    writeln!(ctx.out, "Public Repositories: {}", user.public_repos)?;
    writeln!(ctx.out, "Followers: {}", user.followers)?;
    writeln!(ctx.out, "Following: {}", user.following)?;
    writeln!(ctx.out, "Public Gists: {}", user.public_gists)?;
    writeln!(ctx.out, "Avatar URL: {}", user.avatar_url)?;
    writeln!(ctx.out, "\n--- End of User Stats ---")?;
    Ok(Flow::Continue)
}

fn activity_command(ctx: &mut Context<'_>, args: &[String]) -> io::Result<Flow> {
    if let Err(e) = require_args(args, 1, "Usage: activity <username>") {
        writeln!(ctx.out, "{e}")?;
        return Ok(Flow::Continue);
    }
    let username = &args[0];

    let api = ctx.api;
    let events = match with_spinner(format!("Fetching activity for {username}..."), || {
        api.fetch_activity(username)
    }) {
        Ok(events) => events,
        Err(e) => {
            writeln!(ctx.out, "Error fetching activity: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    if events.is_empty() {
        writeln!(ctx.out, "No activity found for user: {username}")?;
        return Ok(Flow::Continue);
    }

    writeln!(ctx.out, "\n--- Recent Activity for {username} ---")?;
    for event in &events {
        writeln!(ctx.out, "\nActivity Type: {}", event.kind)?;
        writeln!(ctx.out, "Repository: {}", event.repo.name)?;
        writeln!(ctx.out, "Created At: {}", event.created_at)?;
        match event.detail() {
            Ok(EventDetail::Push { git_ref }) => writeln!(ctx.out, "Push to branch: {git_ref}")?,
            Ok(EventDetail::PullRequest { action }) => writeln!(ctx.out, "PR action: {action}")?,
            Ok(EventDetail::IssueComment { body }) => writeln!(ctx.out, "Comment: {body}")?,
            Ok(EventDetail::Other(raw)) => writeln!(ctx.out, "Payload: {raw}")?,
            Err(e) => writeln!(ctx.out, "Error parsing {} payload: {e}", event.kind)?,
        }
    }
    writeln!(ctx.out, "\n--- End of Activity ---")?;
    Ok(Flow::Continue)
}

fn readme_command(ctx: &mut Context<'_>, args: &[String]) -> io::Result<Flow> {
    if let Err(e) = require_args(args, 2, "Usage: read <username> <repo>") {
        writeln!(ctx.out, "{e}")?;
        return Ok(Flow::Continue);
    }
    let (username, repository) = (&args[0], &args[1]);

    let api = ctx.api;
    let content = match with_spinner(format!("Fetching README for {username}/{repository}..."), || {
        api.fetch_readme(username, repository)
    }) {
        Ok(content) => content,
        Err(e) => {
            writeln!(ctx.out, "Error fetching README: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    if content.is_empty() {
        writeln!(ctx.out, "No README found for the repository: {repository}")?;
    } else {
        writeln!(ctx.out, "\nREADME for {username}/{repository}:\n")?;
        writeln!(ctx.out, "{content}")?;
    }
    Ok(Flow::Continue)
}

fn list_command(ctx: &mut Context<'_>, args: &[String]) -> io::Result<Flow> {
    if args.len() != 1 {
        writeln!(ctx.out, "{}", CliError::Usage("Usage: list <username>"))?;
        return Ok(Flow::Continue);
    }
    let username = &args[0];

    let api = ctx.api;
    let repos = match with_spinner(format!("Listing repositories of {username}..."), || {
        api.list_repositories(username)
    }) {
        Ok(repos) => repos,
        Err(e) => {
            writeln!(ctx.out, "Error: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    writeln!(ctx.out, "Returning first {} repositories for {username}", repos.len())?;
    for repo in &repos {
        writeln!(ctx.out, "{} - {}", repo.name, repo.html_url)?;
    }
    Ok(Flow::Continue)
}

fn set_token_command(ctx: &mut Context<'_>, args: &[String]) -> io::Result<Flow> {
    if let Err(e) = require_args(args, 1, "Usage: set <token>") {
        writeln!(ctx.out, "{e}")?;
        return Ok(Flow::Continue);
    }

    let api = ctx.api;
    let session = &mut *ctx.session;
    match with_spinner("Validating token...", || session.set_token(&args[0], api)) {
        Ok(user) => {
            writeln!(ctx.out, "Authenticated as: {}", user.login)?;
            writeln!(ctx.out, "Token is validated and set successfully.")?;
        }
        Err(e) if e.is_auth() => writeln!(ctx.out, "Token not set: {e}")?,
        Err(e) => writeln!(ctx.out, "Error validating token: {e}")?,
    }
    Ok(Flow::Continue)
}

fn unset_token_command(ctx: &mut Context<'_>, _args: &[String]) -> io::Result<Flow> {
    ctx.session.clear();
    writeln!(ctx.out, "Token data has been cleared.")?;
    Ok(Flow::Continue)
}

fn fork_command(ctx: &mut Context<'_>, args: &[String]) -> io::Result<Flow> {
    if let Err(e) = require_args(args, 2, "Usage: fork <username> <repo>") {
        writeln!(ctx.out, "{e}")?;
        return Ok(Flow::Continue);
    }
    let (owner, repo) = (&args[0], &args[1]);

    let token = match ctx.session.require_token() {
        Ok(token) => token,
        Err(e) => {
            writeln!(ctx.out, "Error: {e}")?;
            return Ok(Flow::Continue);
        }
    };

    let api = ctx.api;
    match with_spinner(format!("Forking {owner}/{repo}..."), || api.fork_repository(owner, repo, token)) {
        Ok(forked) => writeln!(ctx.out, "Repository forked successfully! {}", forked.html_url)?,
        Err(e) => {
            writeln!(ctx.out, "Failed to fork repository: {e}")?;
            if is_token_refusal(e.status()) {
                writeln!(
                    ctx.out,
                    "Make sure you have set a classic personal access token with repo access; fine-grained tokens may be refused."
                )?;
            }
        }
    }
    Ok(Flow::Continue)
}

/// GitHub answers 404 as well as 401/403 when a token lacks repo scope.
fn is_token_refusal(status: Option<StatusCode>) -> bool {
    matches!(status.map(|s| s.as_u16()), Some(401 | 403 | 404))
}

fn clear_command(ctx: &mut Context<'_>, _args: &[String]) -> io::Result<Flow> {
    QueueableCommand::queue(&mut ctx.out, Clear(ClearType::All))?.queue(MoveTo(0, 0))?;
    ctx.out.flush()?;
    Ok(Flow::Continue)
}

fn help_command(ctx: &mut Context<'_>, _args: &[String]) -> io::Result<Flow> {
    writeln!(ctx.out, "Welcome to the GitHub Stats CLI!")?;
    writeln!(ctx.out, "\nAvailable Commands:")?;
    for (i, builtin) in BUILTINS.iter().enumerate() {
        writeln!(ctx.out, "{:>2}. {:<24} - {}", i + 1, builtin.synopsis, builtin.summary)?;
    }
    Ok(Flow::Continue)
}

fn exit_command(ctx: &mut Context<'_>, _args: &[String]) -> io::Result<Flow> {
    ctx.session.clear();
    writeln!(ctx.out, "Goodbye.")?;
    Ok(Flow::Exit)
}
