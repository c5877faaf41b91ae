use std::fmt;
use std::path::PathBuf;

use curator_core::model::ApprovalStatus;

#[derive(Debug, PartialEq, Eq)]
pub enum ArgsError {
    MissingCommand,
    UnknownCommand(String),
    MissingValue { flag: &'static str },
    MissingFlag { command: &'static str, flag: &'static str },
    UnexpectedFlag { command: &'static str, flag: &'static str },
    UnknownArg(String),
    InvalidValue { flag: &'static str, raw: String },
    ConflictingFlags(&'static str, &'static str),
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingCommand => write!(f, "missing command"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingFlag { command, flag } => write!(f, "{command} requires {flag}"),
            ArgsError::UnexpectedFlag { command, flag } => {
                write!(f, "{flag} is not accepted by {command}")
            }
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidValue { flag, raw } => write!(f, "invalid {flag} value: {raw}"),
            ArgsError::ConflictingFlags(a, b) => write!(f, "{a} and {b} cannot be combined"),
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

pub fn print_usage() {
    eprintln!("Usage: app [--db <sqlite_url>] [--bucket <name>] [-v|-vv] <command> [options]");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  tree        --file <csv> [--search <term>]");
    eprintln!("  upload      --file <csv> [--name <batch>] [--replace]");
    eprintln!("  batches");
    eprintln!("  show        --batch <name> [--search <term>]");
    eprintln!("  download    --batch <name> [--out <path>]");
    eprintln!("  rename      --batch <name> --to <new name>");
    eprintln!("  delete      --batch <name>");
    eprintln!("  preview     --quiz <id or url> [--quiz ...]");
    eprintln!("  feedback    --quiz <id> --reviewer <name> [--stars 1-5] [--approve|--reject]");
    eprintln!("              [--comment <text>] [--batch <name>]");
    eprintln!("  export      [--quiz <id>] [--reviewer <name>] [--batch <name>]");
    eprintln!("              [--approval pending|approved|rejected] [--min-stars N] [--out <path>]");
    eprintln!("  assign      --batch <name> --reviewer <name>");
    eprintln!("  unassign    --batch <name> --reviewer <name>");
    eprintln!("  assignments [--batch <name>] [--reviewer <name>]");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  CURATOR_DB_URL, CURATOR_BUCKET, CURATOR_QUIZ_API_BASE_URL, CURATOR_QUIZ_API_KEY,");
    eprintln!("  CURATOR_EMBED_BASE_URL, CURATOR_RETRY_MAX, CURATOR_RETRY_DELAY_MS, CURATOR_LOG");
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Tree {
        file: PathBuf,
        search: Option<String>,
    },
    Upload {
        file: PathBuf,
        name: Option<String>,
        replace: bool,
    },
    Batches,
    Show {
        batch: String,
        search: Option<String>,
    },
    Download {
        batch: String,
        out: Option<PathBuf>,
    },
    Rename {
        batch: String,
        to: String,
    },
    Delete {
        batch: String,
    },
    Preview {
        quizzes: Vec<String>,
    },
    Feedback {
        quiz: String,
        reviewer: String,
        stars: Option<u8>,
        approval: ApprovalStatus,
        comment: Option<String>,
        batch: Option<String>,
    },
    Export {
        quiz: Option<String>,
        reviewer: Option<String>,
        batch: Option<String>,
        approval: Option<ApprovalStatus>,
        min_stars: Option<u8>,
        out: Option<PathBuf>,
    },
    Assign {
        batch: String,
        reviewer: String,
    },
    Unassign {
        batch: String,
        reviewer: String,
    },
    Assignments {
        batch: Option<String>,
        reviewer: Option<String>,
    },
    Help,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cli {
    pub db_url: Option<String>,
    pub bucket: Option<String>,
    pub verbosity: u8,
    pub command: Command,
}

/// Every option any command takes; each command checks which ones it allows.
#[derive(Debug, Default)]
struct Flags {
    seen: Vec<&'static str>,
    file: Option<String>,
    search: Option<String>,
    name: Option<String>,
    replace: bool,
    batch: Option<String>,
    out: Option<String>,
    to: Option<String>,
    quizzes: Vec<String>,
    reviewer: Option<String>,
    stars: Option<u8>,
    approve: bool,
    reject: bool,
    approval: Option<ApprovalStatus>,
    min_stars: Option<u8>,
    comment: Option<String>,
}

impl Flags {
    fn mark(&mut self, flag: &'static str) {
        if !self.seen.contains(&flag) {
            self.seen.push(flag);
        }
    }

    fn only(&self, command: &'static str, allowed: &[&'static str]) -> Result<(), ArgsError> {
        match self.seen.iter().find(|flag| !allowed.contains(flag)) {
            Some(flag) => Err(ArgsError::UnexpectedFlag { command, flag: *flag }),
            None => Ok(()),
        }
    }
}

fn required<T>(value: Option<T>, command: &'static str, flag: &'static str) -> Result<T, ArgsError> {
    value.ok_or(ArgsError::MissingFlag { command, flag })
}

fn parse_u8(flag: &'static str, raw: String) -> Result<u8, ArgsError> {
    raw.trim()
        .parse()
        .map_err(|_| ArgsError::InvalidValue { flag, raw })
}

/// Parse everything after the program name. Global flags may appear
/// before or after the command.
pub fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Cli, ArgsError> {
    let mut args = args.into_iter();
    let mut db_url = None;
    let mut bucket = None;
    let mut verbosity = 0u8;
    let mut command_name: Option<String> = None;
    let mut flags = Flags::default();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                return Ok(Cli {
                    db_url,
                    bucket,
                    verbosity,
                    command: Command::Help,
                });
            }
            "--db" => db_url = Some(require_value(&mut args, "--db")?),
            "--bucket" => bucket = Some(require_value(&mut args, "--bucket")?),
            "-v" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            "--file" => {
                flags.mark("--file");
                flags.file = Some(require_value(&mut args, "--file")?);
            }
            "--search" => {
                flags.mark("--search");
                flags.search = Some(require_value(&mut args, "--search")?);
            }
            "--name" => {
                flags.mark("--name");
                flags.name = Some(require_value(&mut args, "--name")?);
            }
            "--replace" => {
                flags.mark("--replace");
                flags.replace = true;
            }
            "--batch" => {
                flags.mark("--batch");
                flags.batch = Some(require_value(&mut args, "--batch")?);
            }
            "--out" => {
                flags.mark("--out");
                flags.out = Some(require_value(&mut args, "--out")?);
            }
            "--to" => {
                flags.mark("--to");
                flags.to = Some(require_value(&mut args, "--to")?);
            }
            "--quiz" => {
                flags.mark("--quiz");
                flags.quizzes.push(require_value(&mut args, "--quiz")?);
            }
            "--reviewer" => {
                flags.mark("--reviewer");
                flags.reviewer = Some(require_value(&mut args, "--reviewer")?);
            }
            "--stars" => {
                flags.mark("--stars");
                flags.stars = Some(parse_u8("--stars", require_value(&mut args, "--stars")?)?);
            }
            "--min-stars" => {
                flags.mark("--min-stars");
                flags.min_stars = Some(parse_u8(
                    "--min-stars",
                    require_value(&mut args, "--min-stars")?,
                )?);
            }
            "--approve" => {
                flags.mark("--approve");
                flags.approve = true;
            }
            "--reject" => {
                flags.mark("--reject");
                flags.reject = true;
            }
            "--approval" => {
                flags.mark("--approval");
                let raw = require_value(&mut args, "--approval")?;
                flags.approval = Some(
                    ApprovalStatus::parse(&raw)
                        .map_err(|_| ArgsError::InvalidValue { flag: "--approval", raw })?,
                );
            }
            "--comment" => {
                flags.mark("--comment");
                flags.comment = Some(require_value(&mut args, "--comment")?);
            }
            other if other.starts_with('-') => return Err(ArgsError::UnknownArg(arg)),
            _ if command_name.is_none() => command_name = Some(arg),
            _ => return Err(ArgsError::UnknownArg(arg)),
        }
    }

    let command = build_command(command_name.ok_or(ArgsError::MissingCommand)?, flags)?;
    Ok(Cli {
        db_url,
        bucket,
        verbosity,
        command,
    })
}

fn build_command(name: String, flags: Flags) -> Result<Command, ArgsError> {
    let command = match name.as_str() {
        "tree" => {
            flags.only("tree", &["--file", "--search"])?;
            Command::Tree {
                file: required(flags.file, "tree", "--file")?.into(),
                search: flags.search,
            }
        }
        "upload" => {
            flags.only("upload", &["--file", "--name", "--replace"])?;
            Command::Upload {
                file: required(flags.file, "upload", "--file")?.into(),
                name: flags.name,
                replace: flags.replace,
            }
        }
        "batches" => {
            flags.only("batches", &[])?;
            Command::Batches
        }
        "show" => {
            flags.only("show", &["--batch", "--search"])?;
            Command::Show {
                batch: required(flags.batch, "show", "--batch")?,
                search: flags.search,
            }
        }
        "download" => {
            flags.only("download", &["--batch", "--out"])?;
            Command::Download {
                batch: required(flags.batch, "download", "--batch")?,
                out: flags.out.map(PathBuf::from),
            }
        }
        "rename" => {
            flags.only("rename", &["--batch", "--to"])?;
            Command::Rename {
                batch: required(flags.batch, "rename", "--batch")?,
                to: required(flags.to, "rename", "--to")?,
            }
        }
        "delete" => {
            flags.only("delete", &["--batch"])?;
            Command::Delete {
                batch: required(flags.batch, "delete", "--batch")?,
            }
        }
        "preview" => {
            flags.only("preview", &["--quiz"])?;
            if flags.quizzes.is_empty() {
                return Err(ArgsError::MissingFlag {
                    command: "preview",
                    flag: "--quiz",
                });
            }
            Command::Preview {
                quizzes: flags.quizzes,
            }
        }
        "feedback" => {
            flags.only(
                "feedback",
                &[
                    "--quiz",
                    "--reviewer",
                    "--stars",
                    "--approve",
                    "--reject",
                    "--comment",
                    "--batch",
                ],
            )?;
            let approval = match (flags.approve, flags.reject) {
                (true, true) => return Err(ArgsError::ConflictingFlags("--approve", "--reject")),
                (true, false) => ApprovalStatus::Approved,
                (false, true) => ApprovalStatus::Rejected,
                (false, false) => ApprovalStatus::Pending,
            };
            Command::Feedback {
                quiz: required(single_quiz(flags.quizzes, "feedback")?, "feedback", "--quiz")?,
                reviewer: required(flags.reviewer, "feedback", "--reviewer")?,
                stars: flags.stars,
                approval,
                comment: flags.comment,
                batch: flags.batch,
            }
        }
        "export" => {
            flags.only(
                "export",
                &[
                    "--quiz",
                    "--reviewer",
                    "--batch",
                    "--approval",
                    "--min-stars",
                    "--out",
                ],
            )?;
            Command::Export {
                quiz: single_quiz(flags.quizzes, "export")?,
                reviewer: flags.reviewer,
                batch: flags.batch,
                approval: flags.approval,
                min_stars: flags.min_stars,
                out: flags.out.map(PathBuf::from),
            }
        }
        "assign" | "unassign" => {
            let command = if name == "assign" { "assign" } else { "unassign" };
            flags.only(command, &["--batch", "--reviewer"])?;
            let batch = required(flags.batch, command, "--batch")?;
            let reviewer = required(flags.reviewer, command, "--reviewer")?;
            if command == "assign" {
                Command::Assign { batch, reviewer }
            } else {
                Command::Unassign { batch, reviewer }
            }
        }
        "assignments" => {
            flags.only("assignments", &["--batch", "--reviewer"])?;
            Command::Assignments {
                batch: flags.batch,
                reviewer: flags.reviewer,
            }
        }
        "help" => Command::Help,
        _ => return Err(ArgsError::UnknownCommand(name)),
    };
    Ok(command)
}

fn single_quiz(mut quizzes: Vec<String>, command: &'static str) -> Result<Option<String>, ArgsError> {
    if quizzes.len() > 1 {
        return Err(ArgsError::InvalidValue {
            flag: "--quiz",
            raw: format!("{command} takes a single quiz"),
        });
    }
    Ok(quizzes.pop())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Cli, ArgsError> {
        parse_args(args.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = parse(&["-v", "batches", "--db", "sqlite::memory:", "--bucket", "b1"]).unwrap();
        assert_eq!(cli.command, Command::Batches);
        assert_eq!(cli.db_url.as_deref(), Some("sqlite::memory:"));
        assert_eq!(cli.bucket.as_deref(), Some("b1"));
        assert_eq!(cli.verbosity, 1);
    }

    #[test]
    fn tree_requires_file() {
        assert_eq!(
            parse(&["tree"]),
            Err(ArgsError::MissingFlag {
                command: "tree",
                flag: "--file"
            })
        );
        let cli = parse(&["tree", "--file", "week1.csv", "--search", "algebra"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Tree {
                file: PathBuf::from("week1.csv"),
                search: Some("algebra".into())
            }
        );
    }

    #[test]
    fn feedback_flags() {
        let cli = parse(&[
            "feedback",
            "--quiz",
            "abcdefabcdefabcdefab",
            "--reviewer",
            "ana",
            "--stars",
            "4",
            "--approve",
        ])
        .unwrap();
        match cli.command {
            Command::Feedback {
                stars, approval, ..
            } => {
                assert_eq!(stars, Some(4));
                assert_eq!(approval, ApprovalStatus::Approved);
            }
            other => panic!("unexpected command: {other:?}"),
        }

        assert_eq!(
            parse(&["feedback", "--quiz", "x", "--reviewer", "a", "--approve", "--reject"]),
            Err(ArgsError::ConflictingFlags("--approve", "--reject"))
        );
        assert!(matches!(
            parse(&["feedback", "--quiz", "x", "--reviewer", "a", "--stars", "many"]),
            Err(ArgsError::InvalidValue { flag: "--stars", .. })
        ));
    }

    #[test]
    fn rejects_flags_for_other_commands() {
        assert_eq!(
            parse(&["batches", "--replace"]),
            Err(ArgsError::UnexpectedFlag {
                command: "batches",
                flag: "--replace"
            })
        );
    }

    #[test]
    fn preview_collects_repeated_quizzes() {
        let cli = parse(&["preview", "--quiz", "a1", "--quiz", "b2"]).unwrap();
        assert_eq!(
            cli.command,
            Command::Preview {
                quizzes: vec!["a1".into(), "b2".into()]
            }
        );
    }

    #[test]
    fn unknown_and_missing_commands() {
        assert_eq!(parse(&[]), Err(ArgsError::MissingCommand));
        assert_eq!(
            parse(&["frobnicate"]),
            Err(ArgsError::UnknownCommand("frobnicate".into()))
        );
        assert_eq!(parse(&["--help"]).unwrap().command, Command::Help);
    }
}
