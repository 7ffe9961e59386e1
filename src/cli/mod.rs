use crate::domain::{SessionSource, format_cost_precise, format_model_name, format_tokens};
use crate::infra::{SessionStore, StoreError};
use std::io::{self, Write};
use thiserror::Error;

const DEFAULT_LIMIT: usize = 20;
const DEFAULT_USAGE_DAYS: u32 = 30;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliInvocation {
    PrintHelp,
    PrintVersion,
    Tui {
        server: Option<String>,
        source: Option<SessionSource>,
    },
    Command {
        server: Option<String>,
        command: CliCommand,
    },
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    Projects {
        source: Option<SessionSource>,
    },
    Sessions {
        project_path: Option<String>,
        source: Option<SessionSource>,
        offset: usize,
        limit: usize,
    },
    Search {
        query: String,
        source: Option<SessionSource>,
        limit: usize,
    },
    Usage {
        days: u32,
        source: Option<SessionSource>,
    },
    Context {
        session_id: String,
    },
}

#[derive(Debug, Error)]
pub enum CliParseError {
    #[error("unknown subcommand: {0}")]
    UnknownSubcommand(String),

    #[error("unknown flag: {0}")]
    UnknownFlag(String),

    #[error("missing value for flag: {0}")]
    MissingFlagValue(String),

    #[error("invalid value for {flag}: {value}")]
    InvalidFlagValue { flag: String, value: String },

    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),

    #[error("missing argument: {0}")]
    MissingArgument(String),
}

pub fn parse_invocation(args: &[String]) -> Result<CliInvocation, CliParseError> {
    if args.iter().any(|arg| arg == "--help" || arg == "-h") {
        return Ok(CliInvocation::PrintHelp);
    }
    if args.iter().any(|arg| arg == "--version" || arg == "-V") {
        return Ok(CliInvocation::PrintVersion);
    }

    let mut iter = args.iter().skip(1).peekable();
    let mut server: Option<String> = None;
    let mut global_source: Option<SessionSource> = None;
    while let Some(arg) = iter.peek() {
        match arg.as_str() {
            "--server" => {
                let _ = iter.next();
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--server".to_string()))?;
                server = Some(value.to_string());
            }
            "--source" | "-s" => {
                let _ = iter.next();
                let value = iter
                    .next()
                    .ok_or_else(|| CliParseError::MissingFlagValue("--source".to_string()))?;
                global_source = Some(parse_source_flag("--source", value)?);
            }
            _ => break,
        }
    }

    let Some(subcommand) = iter.next() else {
        return Ok(CliInvocation::Tui {
            server,
            source: global_source,
        });
    };

    let command = match subcommand.as_str() {
        "projects" => {
            let mut source = global_source;
            let mut args = iter.peekable();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--source" | "-s" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--source".to_string())
                        })?;
                        source = Some(parse_source_flag("--source", value)?);
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }
            CliCommand::Projects { source }
        }
        "sessions" => {
            let mut project_path: Option<String> = None;
            let mut source = global_source;
            let mut offset = 0usize;
            let mut limit = DEFAULT_LIMIT;
            let mut args = iter.peekable();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--source" | "-s" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--source".to_string())
                        })?;
                        source = Some(parse_source_flag("--source", value)?);
                    }
                    "--limit" | "-l" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--limit".to_string())
                        })?;
                        limit = parse_usize_flag("--limit", value)?;
                    }
                    "--offset" | "-o" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--offset".to_string())
                        })?;
                        offset = parse_usize_flag("--offset", value)?;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        if project_path.is_some() {
                            return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                        }
                        project_path = Some(arg.to_string());
                    }
                }
            }
            CliCommand::Sessions {
                project_path,
                source,
                offset,
                limit,
            }
        }
        "search" => {
            let mut query: Option<String> = None;
            let mut source = global_source;
            let mut limit = DEFAULT_LIMIT;
            let mut args = iter.peekable();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--source" | "-s" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--source".to_string())
                        })?;
                        source = Some(parse_source_flag("--source", value)?);
                    }
                    "--limit" | "-l" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--limit".to_string())
                        })?;
                        limit = parse_usize_flag("--limit", value)?;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        if query.is_some() {
                            return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                        }
                        query = Some(arg.to_string());
                    }
                }
            }
            let query =
                query.ok_or_else(|| CliParseError::MissingArgument("query".to_string()))?;
            CliCommand::Search {
                query,
                source,
                limit,
            }
        }
        "usage" => {
            let mut days = DEFAULT_USAGE_DAYS;
            let mut source = global_source;
            let mut args = iter.peekable();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    "--source" | "-s" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--source".to_string())
                        })?;
                        source = Some(parse_source_flag("--source", value)?);
                    }
                    "--days" | "-d" => {
                        let value = args.next().ok_or_else(|| {
                            CliParseError::MissingFlagValue("--days".to_string())
                        })?;
                        days = value.parse::<u32>().map_err(|_| {
                            CliParseError::InvalidFlagValue {
                                flag: "--days".to_string(),
                                value: value.to_string(),
                            }
                        })?;
                    }
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                    }
                }
            }
            CliCommand::Usage { days, source }
        }
        "context" => {
            let mut session_id: Option<String> = None;
            let mut args = iter.peekable();
            while let Some(arg) = args.next() {
                match arg.as_str() {
                    _ if arg.starts_with('-') => {
                        return Err(CliParseError::UnknownFlag(arg.to_string()));
                    }
                    _ => {
                        if session_id.is_some() {
                            return Err(CliParseError::UnexpectedArgument(arg.to_string()));
                        }
                        session_id = Some(arg.to_string());
                    }
                }
            }
            let session_id =
                session_id.ok_or_else(|| CliParseError::MissingArgument("session-id".to_string()))?;
            CliCommand::Context { session_id }
        }
        other => return Err(CliParseError::UnknownSubcommand(other.to_string())),
    };

    Ok(CliInvocation::Command { server, command })
}

fn parse_source_flag(flag: &str, value: &str) -> Result<SessionSource, CliParseError> {
    SessionSource::parse(value).ok_or_else(|| CliParseError::InvalidFlagValue {
        flag: flag.to_string(),
        value: value.to_string(),
    })
}

fn parse_usize_flag(flag: &str, value: &str) -> Result<usize, CliParseError> {
    value
        .parse::<usize>()
        .map_err(|_| CliParseError::InvalidFlagValue {
            flag: flag.to_string(),
            value: value.to_string(),
        })
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub fn run(command: CliCommand, store: &SessionStore) -> Result<(), CliRunError> {
    let mut out = io::stdout().lock();
    match command {
        CliCommand::Projects { source } => {
            let source = source.unwrap_or(SessionSource::Claude);
            for project in store.projects(source)? {
                let _ = writeln!(
                    out,
                    "{}\t{}\t{}",
                    project.name, project.path, project.session_count
                );
            }
        }
        CliCommand::Sessions {
            project_path,
            source,
            offset,
            limit,
        } => {
            let source = source.unwrap_or(SessionSource::Claude);
            let sessions = store.list_sessions(project_path.as_deref(), source)?;
            for session in sessions.iter().skip(offset).take(limit) {
                let _ = writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    session.updated_at, session.id, session.message_count, session.title
                );
            }
        }
        CliCommand::Search {
            query,
            source,
            limit,
        } => {
            let source = source.unwrap_or(SessionSource::Claude);
            let results = store.search(&query, source)?;
            for result in results.iter().take(limit) {
                let _ = writeln!(
                    out,
                    "{}\t{}\t{}\t{}",
                    result.timestamp,
                    result.session_id,
                    result.message_type,
                    result.matched_content.replace('\n', " ")
                );
            }
        }
        CliCommand::Usage { days, source } => {
            let source = source.unwrap_or(SessionSource::Claude);
            let summary = store.usage_summary(source)?;
            let detail = store.usage_detail(days, source)?;
            let _ = writeln!(
                out,
                "today\t{}\t{}",
                format_tokens(summary.today.total_tokens),
                format_cost_precise(summary.today.cost_usd)
            );
            let _ = writeln!(
                out,
                "month\t{}\t{}",
                format_tokens(summary.this_month.total_tokens),
                format_cost_precise(summary.this_month.cost_usd)
            );
            let _ = writeln!(
                out,
                "total\t{}\t{}",
                format_tokens(summary.total.total_tokens),
                format_cost_precise(summary.total.cost_usd)
            );
            for (model, usage) in detail.models_by_total() {
                let _ = writeln!(
                    out,
                    "model\t{}\t{}\t{}",
                    format_model_name(&model),
                    format_tokens(usage.total_tokens),
                    format_cost_precise(usage.cost_usd)
                );
            }
        }
        CliCommand::Context { session_id } => {
            let context = store.session_context(&session_id)?;
            let _ = writeln!(out, "{context}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(parts: &[&str]) -> Vec<String> {
        let mut all = vec!["ccview".to_string()];
        all.extend(parts.iter().map(|part| part.to_string()));
        all
    }

    #[test]
    fn bare_invocation_starts_the_tui() {
        let invocation = parse_invocation(&args(&[])).unwrap();
        assert_eq!(
            invocation,
            CliInvocation::Tui {
                server: None,
                source: None
            }
        );
    }

    #[test]
    fn global_flags_apply_to_the_tui() {
        let invocation =
            parse_invocation(&args(&["--server", "http://x:9", "--source", "codex"])).unwrap();
        assert_eq!(
            invocation,
            CliInvocation::Tui {
                server: Some("http://x:9".to_string()),
                source: Some(SessionSource::Codex),
            }
        );
    }

    #[test]
    fn parses_sessions_with_flags() {
        let invocation =
            parse_invocation(&args(&["sessions", "/home/u/proj", "--limit", "5"])).unwrap();
        let CliInvocation::Command { command, .. } = invocation else {
            panic!("expected command invocation");
        };
        assert_eq!(
            command,
            CliCommand::Sessions {
                project_path: Some("/home/u/proj".to_string()),
                source: None,
                offset: 0,
                limit: 5,
            }
        );
    }

    #[test]
    fn search_requires_a_query() {
        let error = parse_invocation(&args(&["search"])).unwrap_err();
        assert!(matches!(error, CliParseError::MissingArgument(_)));
    }

    #[test]
    fn rejects_unknown_flags_and_subcommands() {
        assert!(matches!(
            parse_invocation(&args(&["sessions", "--frobnicate"])),
            Err(CliParseError::UnknownFlag(_))
        ));
        assert!(matches!(
            parse_invocation(&args(&["fly"])),
            Err(CliParseError::UnknownSubcommand(_))
        ));
    }

    #[test]
    fn rejects_invalid_source() {
        assert!(matches!(
            parse_invocation(&args(&["projects", "--source", "hal9000"])),
            Err(CliParseError::InvalidFlagValue { .. })
        ));
    }

    #[test]
    fn usage_days_must_be_numeric() {
        assert!(matches!(
            parse_invocation(&args(&["usage", "--days", "soon"])),
            Err(CliParseError::InvalidFlagValue { .. })
        ));
    }
}
