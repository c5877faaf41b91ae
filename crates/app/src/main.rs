use std::path::{Path, PathBuf};
use std::sync::Arc;

use curator_core::QuizCatalog;
use curator_core::csv::extract_from_cell;
use curator_core::model::{FeedbackDraft, QuizId, ReviewerName, StarRating};
use services::{AppServices, Clock, CuratorConfig};
use storage::repository::{AssignmentFilter, FeedbackFilter};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

mod cli;
mod render;

use cli::{ArgsError, Cli, Command, parse_args, print_usage};

/// `CURATOR_LOG` wins; otherwise `-v`/`-vv` raise the default `warn` level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_env("CURATOR_LOG").unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn normalize_sqlite_url(raw: String) -> String {
    if raw == "sqlite::memory:" || raw.starts_with("sqlite://") {
        return raw;
    }

    let trimmed = raw.trim().to_string();
    let path_str = trimmed
        .strip_prefix("sqlite:")
        .unwrap_or(trimmed.as_str())
        .to_string();
    let path = Path::new(&path_str);
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(path)
    };
    format!("sqlite://{}", absolute.display())
}

fn prepare_sqlite_file(db_url: &str) -> Result<(), Box<dyn std::error::Error>> {
    if db_url == "sqlite::memory:" {
        return Ok(());
    }

    let path = db_url
        .strip_prefix("sqlite://")
        .ok_or_else(|| ArgsError::InvalidValue {
            flag: "--db",
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidValue {
            flag: "--db",
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
    }

    Ok(())
}

/// Accept a bare id or a quizizz.com link.
fn parse_quiz(raw: &str) -> Result<QuizId, curator_core::Error> {
    match extract_from_cell(raw) {
        Some(id) => Ok(id),
        None => Ok(QuizId::new(raw)?),
    }
}

fn parse_reviewer(raw: &str) -> Result<ReviewerName, curator_core::Error> {
    Ok(ReviewerName::new(raw)?)
}

/// File name of `path`, used as the default batch name.
fn batch_name(path: &Path) -> Option<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
}

fn write_output(out: Option<&Path>, text: &str) -> std::io::Result<()> {
    match out {
        Some(path) => {
            std::fs::write(path, text)?;
            info!(path = %path.display(), bytes = text.len(), "wrote output");
            Ok(())
        }
        None => {
            print!("{text}");
            Ok(())
        }
    }
}

fn print_catalog(mut catalog: QuizCatalog, search: Option<&str>) {
    let forest = catalog.search(search.unwrap_or_default());
    if forest.is_empty() {
        println!("(no quizzes)");
    } else {
        print!("{}", render::tree(&forest));
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let Cli {
        db_url,
        bucket,
        verbosity,
        command,
    } = parse_args(std::env::args().skip(1))?;

    init_logging(verbosity);

    // Local-only commands never touch storage.
    match &command {
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Tree { file, search } => {
            let text = std::fs::read_to_string(file)?;
            print_catalog(QuizCatalog::from_csv(&text), search.as_deref());
            return Ok(());
        }
        _ => {}
    }

    let mut config = CuratorConfig::from_env()?;
    if let Some(db_url) = db_url {
        config.db_url = db_url;
    }
    if let Some(bucket) = bucket {
        storage::repository::validate_bucket(&bucket)?;
        config.bucket = bucket;
    }
    config.db_url = normalize_sqlite_url(config.db_url);
    debug!(db_url = %config.db_url, bucket = %config.bucket, "resolved configuration");

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&config.db_url)?;
    let services = AppServices::new_sqlite(&config, Clock::system()).await?;

    match command {
        Command::Help | Command::Tree { .. } => Ok(()),
        Command::Upload {
            file,
            name,
            replace,
        } => {
            let text = std::fs::read_to_string(&file)?;
            let name = name.or_else(|| batch_name(&file)).ok_or_else(|| ArgsError::MissingFlag {
                command: "upload",
                flag: "--name",
            })?;
            let upload = services
                .curation()
                .upload_batch(&name, &text, replace)
                .await?;
            println!(
                "uploaded {} ({} quizzes, {} bytes)",
                upload.meta.name, upload.quiz_count, upload.meta.size
            );
            Ok(())
        }
        Command::Batches => {
            let batches = services.curation().list_batches().await?;
            print!("{}", render::batches(&batches));
            Ok(())
        }
        Command::Show { batch, search } => {
            let catalog = services.curation().load_batch(&batch).await?;
            print_catalog(catalog, search.as_deref());
            Ok(())
        }
        Command::Download { batch, out } => {
            let bytes = services.curation().download_batch(&batch).await?;
            let text = String::from_utf8_lossy(&bytes);
            write_output(out.as_deref(), &text)?;
            Ok(())
        }
        Command::Rename { batch, to } => {
            let meta = services.curation().rename_batch(&batch, &to).await?;
            println!("renamed {batch} -> {}", meta.name);
            Ok(())
        }
        Command::Delete { batch } => {
            services.curation().delete_batch(&batch).await?;
            println!("deleted {batch}");
            Ok(())
        }
        Command::Preview { quizzes } => {
            if config.quiz_api.is_none() {
                warn!("quiz service credentials are not set; previews will fail");
            }
            let ids = quizzes
                .iter()
                .map(|raw| parse_quiz(raw))
                .collect::<Result<Vec<_>, _>>()?;
            let previews = services.previews().fetch_many(&ids).await;
            for preview in &previews {
                print!("{}", render::preview(preview));
            }
            Ok(())
        }
        Command::Feedback {
            quiz,
            reviewer,
            stars,
            approval,
            comment,
            batch,
        } => {
            let draft = FeedbackDraft {
                reviewer,
                stars,
                approval,
                comment,
                batch,
            };
            let feedback = services.feedback().submit(parse_quiz(&quiz)?, draft).await?;
            println!(
                "recorded {} for {} by {}",
                feedback.approval, feedback.quiz_id, feedback.reviewer
            );
            Ok(())
        }
        Command::Export {
            quiz,
            reviewer,
            batch,
            approval,
            min_stars,
            out,
        } => {
            let filter = FeedbackFilter {
                quiz_id: quiz.as_deref().map(parse_quiz).transpose()?,
                reviewer: reviewer.as_deref().map(parse_reviewer).transpose()?,
                batch,
                approval,
                min_stars: min_stars
                    .map(StarRating::new)
                    .transpose()
                    .map_err(curator_core::Error::from)?,
            };
            let csv = services.feedback().export_csv(&filter).await?;
            if csv.is_empty() {
                eprintln!("no feedback matches");
                return Ok(());
            }
            write_output(out.as_deref(), &csv)?;
            Ok(())
        }
        Command::Assign { batch, reviewer } => {
            let assignment = services.assignments().assign(&batch, &reviewer).await?;
            println!("assigned {} to {}", assignment.batch, assignment.reviewer);
            Ok(())
        }
        Command::Unassign { batch, reviewer } => {
            services.assignments().unassign(&batch, &reviewer).await?;
            println!("unassigned {batch} from {reviewer}");
            Ok(())
        }
        Command::Assignments { batch, reviewer } => {
            let filter = AssignmentFilter {
                batch,
                reviewer: reviewer.as_deref().map(parse_reviewer).transpose()?,
            };
            let assignments = services.assignments().list(&filter).await?;
            print!("{}", render::assignments(&assignments));
            Ok(())
        }
    }
}

/// Argument mistakes get the usage text after the message.
fn wants_usage(err: &(dyn std::error::Error + 'static)) -> bool {
    err.is::<ArgsError>()
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        if wants_usage(err.as_ref()) {
            print_usage();
        }
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quiz_argument_accepts_links() {
        let id = parse_quiz("https://quizizz.com/admin/quiz/abcdef0123456789abcd").unwrap();
        assert_eq!(id.as_str(), "abcdef0123456789abcd");
        assert_eq!(parse_quiz(" custom-id ").unwrap().as_str(), "custom-id");
        assert!(parse_quiz("  ").is_err());
    }

    #[test]
    fn only_argument_errors_show_usage() {
        let args: Box<dyn std::error::Error> = ArgsError::MissingCommand.into();
        assert!(wants_usage(args.as_ref()));
        let io: Box<dyn std::error::Error> = std::io::Error::other("disk full").into();
        assert!(!wants_usage(io.as_ref()));
    }

    #[test]
    fn sqlite_urls_are_made_absolute() {
        assert_eq!(normalize_sqlite_url("sqlite::memory:".into()), "sqlite::memory:");
        assert_eq!(
            normalize_sqlite_url("sqlite:///tmp/c.sqlite3".into()),
            "sqlite:///tmp/c.sqlite3"
        );
        assert_eq!(
            normalize_sqlite_url("sqlite:/var/db/c.sqlite3".into()),
            "sqlite:///var/db/c.sqlite3"
        );
    }

    #[test]
    fn default_batch_name_is_file_name() {
        assert_eq!(
            batch_name(Path::new("exports/week1.csv")).as_deref(),
            Some("week1.csv")
        );
        assert_eq!(batch_name(Path::new("/")), None);
    }
}
