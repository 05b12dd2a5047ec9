use std::fmt;
use std::path::PathBuf;

use rapor_core::model::{SemesterId, SubjectDraft, SubjectId, parse_score_input};
use services::{AppServices, Clock, ReportError, ReportOptions};
use tracing_subscriber::EnvFilter;

mod output;
mod seed;

const DEFAULT_DB_URL: &str = "sqlite://rapor.sqlite3";

#[derive(Debug, PartialEq, Eq)]
enum ArgsError {
    MissingValue { flag: &'static str },
    MissingArgument { what: &'static str },
    UnknownArg(String),
    UnknownCommand(String),
    UnexpectedFlag { flag: String, command: &'static str },
    InvalidSemester { raw: String },
    InvalidFormat { raw: String },
    InvalidDbUrl { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::MissingArgument { what } => write!(f, "missing {what}"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::UnknownCommand(cmd) => write!(f, "unknown command: {cmd}"),
            ArgsError::UnexpectedFlag { flag, command } => {
                write!(f, "{flag} is not accepted by `{command}`")
            }
            ArgsError::InvalidSemester { raw } => {
                write!(f, "invalid semester: {raw} (expected 1-5)")
            }
            ArgsError::InvalidFormat { raw } => {
                write!(f, "invalid --format value: {raw} (expected text or json)")
            }
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
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

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  rapor [summary]                                   [--db <sqlite_url>]");
    eprintln!("  rapor semester <1-5>");
    eprintln!("  rapor add <1-5> --name <name> --score <score> [--kkm <kkm>]");
    eprintln!("  rapor edit <1-5> <subject-id> --name <name> --score <score> [--kkm <kkm>]");
    eprintln!("  rapor remove <1-5> <subject-id>");
    eprintln!("  rapor clear <1-5>");
    eprintln!("  rapor reset");
    eprintln!("  rapor catalog [--query <text>]");
    eprintln!("  rapor report [--format text|json] [--student <name>] [--school <name>] [--out <path>]");
    eprintln!("  rapor seed");
    eprintln!();
    eprintln!("Defaults:");
    eprintln!("  --db {DEFAULT_DB_URL}");
    eprintln!("  --kkm 75");
    eprintln!();
    eprintln!("Environment:");
    eprintln!("  RAPOR_DB_URL, RAPOR_STUDENT_NAME, RAPOR_SCHOOL_NAME, RUST_LOG");
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReportFormat {
    Text,
    Json,
}

#[derive(Debug, PartialEq)]
enum Command {
    Summary,
    Semester {
        id: SemesterId,
    },
    Add {
        id: SemesterId,
        draft: SubjectDraft,
    },
    Edit {
        id: SemesterId,
        subject_id: SubjectId,
        draft: SubjectDraft,
    },
    Remove {
        id: SemesterId,
        subject_id: SubjectId,
    },
    Clear {
        id: SemesterId,
    },
    Reset,
    Catalog {
        query: Option<String>,
    },
    Report {
        format: ReportFormat,
        options: ReportOptions,
        out: Option<PathBuf>,
    },
    Seed,
}

#[derive(Debug, PartialEq)]
struct Args {
    db_url: String,
    command: Command,
}

/// Flags other than `--db`, collected before the command is built.
#[derive(Default)]
struct Flags {
    name: Option<String>,
    score: Option<String>,
    kkm: Option<String>,
    query: Option<String>,
    format: Option<String>,
    student: Option<String>,
    school: Option<String>,
    out: Option<String>,
}

impl Flags {
    fn given(&self) -> impl Iterator<Item = &'static str> {
        [
            ("--name", self.name.is_some()),
            ("--score", self.score.is_some()),
            ("--kkm", self.kkm.is_some()),
            ("--query", self.query.is_some()),
            ("--format", self.format.is_some()),
            ("--student", self.student.is_some()),
            ("--school", self.school.is_some()),
            ("--out", self.out.is_some()),
        ]
        .into_iter()
        .filter_map(|(flag, set)| set.then_some(flag))
    }

    fn only(&self, command: &'static str, allowed: &[&str]) -> Result<(), ArgsError> {
        match self.given().find(|flag| !allowed.contains(flag)) {
            Some(flag) => Err(ArgsError::UnexpectedFlag {
                flag: flag.to_string(),
                command,
            }),
            None => Ok(()),
        }
    }

    fn draft(&mut self) -> Result<SubjectDraft, ArgsError> {
        let name = self
            .name
            .take()
            .ok_or(ArgsError::MissingArgument { what: "--name" })?;
        let score = self
            .score
            .take()
            .ok_or(ArgsError::MissingArgument { what: "--score" })?;
        let mut draft = SubjectDraft::new(name, parse_score_input(&score));
        if let Some(kkm) = self.kkm.take() {
            draft = draft.with_kkm(kkm);
        }
        Ok(draft)
    }
}

fn env_non_empty(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_semester(raw: Option<String>) -> Result<SemesterId, ArgsError> {
    let raw = raw.ok_or(ArgsError::MissingArgument {
        what: "semester number",
    })?;
    raw.parse()
        .map_err(|_| ArgsError::InvalidSemester { raw: raw.clone() })
}

fn parse_subject_id(raw: Option<String>) -> Result<SubjectId, ArgsError> {
    raw.and_then(|raw| raw.parse().ok())
        .ok_or(ArgsError::MissingArgument { what: "subject id" })
}

impl Args {
    fn parse(argv: impl IntoIterator<Item = String>) -> Result<Self, ArgsError> {
        let mut db_url = env_non_empty("RAPOR_DB_URL")
            .map_or_else(|| DEFAULT_DB_URL.to_string(), normalize_sqlite_url);
        let mut flags = Flags::default();
        let mut positionals: Vec<String> = Vec::new();

        let mut args = argv.into_iter();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = normalize_sqlite_url(value);
                }
                "--name" => flags.name = Some(require_value(&mut args, "--name")?),
                "--score" => flags.score = Some(require_value(&mut args, "--score")?),
                "--kkm" => flags.kkm = Some(require_value(&mut args, "--kkm")?),
                "--query" => flags.query = Some(require_value(&mut args, "--query")?),
                "--format" => flags.format = Some(require_value(&mut args, "--format")?),
                "--student" => flags.student = Some(require_value(&mut args, "--student")?),
                "--school" => flags.school = Some(require_value(&mut args, "--school")?),
                "--out" => flags.out = Some(require_value(&mut args, "--out")?),
                other if other.starts_with("--") => return Err(ArgsError::UnknownArg(arg)),
                _ => positionals.push(arg),
            }
        }

        let mut positionals = positionals.into_iter();
        let name = positionals.next();
        let command = match name.as_deref() {
            None | Some("summary") => {
                flags.only("summary", &[])?;
                Command::Summary
            }
            Some("semester") => {
                flags.only("semester", &[])?;
                Command::Semester {
                    id: parse_semester(positionals.next())?,
                }
            }
            Some("add") => {
                flags.only("add", &["--name", "--score", "--kkm"])?;
                let id = parse_semester(positionals.next())?;
                Command::Add {
                    id,
                    draft: flags.draft()?,
                }
            }
            Some("edit") => {
                flags.only("edit", &["--name", "--score", "--kkm"])?;
                let id = parse_semester(positionals.next())?;
                let subject_id = parse_subject_id(positionals.next())?;
                Command::Edit {
                    id,
                    subject_id,
                    draft: flags.draft()?,
                }
            }
            Some("remove") => {
                flags.only("remove", &[])?;
                let id = parse_semester(positionals.next())?;
                Command::Remove {
                    id,
                    subject_id: parse_subject_id(positionals.next())?,
                }
            }
            Some("clear") => {
                flags.only("clear", &[])?;
                Command::Clear {
                    id: parse_semester(positionals.next())?,
                }
            }
            Some("reset") => {
                flags.only("reset", &[])?;
                Command::Reset
            }
            Some("catalog") => {
                flags.only("catalog", &["--query"])?;
                Command::Catalog {
                    query: flags.query.take(),
                }
            }
            Some("report") => {
                flags.only("report", &["--format", "--student", "--school", "--out"])?;
                let format = match flags.format.take().as_deref() {
                    None | Some("text") => ReportFormat::Text,
                    Some("json") => ReportFormat::Json,
                    Some(other) => {
                        return Err(ArgsError::InvalidFormat {
                            raw: other.to_string(),
                        });
                    }
                };
                Command::Report {
                    format,
                    options: ReportOptions {
                        student_name: flags
                            .student
                            .take()
                            .or_else(|| env_non_empty("RAPOR_STUDENT_NAME")),
                        school_name: flags
                            .school
                            .take()
                            .or_else(|| env_non_empty("RAPOR_SCHOOL_NAME")),
                    },
                    out: flags.out.take().map(PathBuf::from),
                }
            }
            Some("seed") => {
                flags.only("seed", &[])?;
                Command::Seed
            }
            Some(other) => return Err(ArgsError::UnknownCommand(other.to_string())),
        };

        if let Some(extra) = positionals.next() {
            return Err(ArgsError::UnknownArg(extra));
        }

        Ok(Self { db_url, command })
    }
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
    let path = std::path::Path::new(&path_str);
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
        .ok_or_else(|| ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        })?;
    let path = path.split('?').next().unwrap_or(path);
    if path.is_empty() {
        return Err(ArgsError::InvalidDbUrl {
            raw: db_url.to_string(),
        }
        .into());
    }

    let path = std::path::Path::new(path);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    if !path.exists() {
        std::fs::OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)?;
        tracing::info!(path = %path.display(), "created database file");
    }

    Ok(())
}

/// Logs go to stderr so command output can be piped.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let argv: Vec<String> = std::env::args().skip(1).collect();
    if argv.iter().any(|arg| arg == "--help" || arg == "-h") {
        print_usage();
        return Ok(());
    }

    let parsed = Args::parse(argv).map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    // Open + migrate SQLite at startup. Keep this in the binary glue so core/services stay pure.
    prepare_sqlite_file(&parsed.db_url)?;
    let services = AppServices::new_sqlite(&parsed.db_url, Clock::default_clock()).await?;
    tracing::debug!(db = %parsed.db_url, "services ready");

    match parsed.command {
        Command::Summary => {
            let analytics = services.analytics().overview().await?;
            print!("{}", output::summary(&analytics));
        }
        Command::Semester { id } => {
            let semester = services.semesters().get_semester(id).await?;
            print!("{}", output::semester(&semester));
        }
        Command::Add { id, draft } => {
            let saved = services.semesters().add_subject(id, draft).await?;
            if let Some(warning) = &saved.warning {
                eprintln!("warning: {warning}");
            }
            println!("added {}", output::subject_line(&saved.subject));
            print!("{}", output::semester_totals(&saved.semester));
        }
        Command::Edit {
            id,
            subject_id,
            draft,
        } => {
            let saved = services
                .semesters()
                .update_subject(id, &subject_id, draft)
                .await?;
            if let Some(warning) = &saved.warning {
                eprintln!("warning: {warning}");
            }
            println!("updated {}", output::subject_line(&saved.subject));
            print!("{}", output::semester_totals(&saved.semester));
        }
        Command::Remove { id, subject_id } => {
            let semester = services
                .semesters()
                .remove_subject(id, &subject_id)
                .await?;
            println!("removed {subject_id} from semester {id}");
            print!("{}", output::semester_totals(&semester));
        }
        Command::Clear { id } => {
            services.semesters().clear_semester(id).await?;
            println!("semester {id} cleared");
        }
        Command::Reset => {
            services.semesters().reset_all().await?;
            println!("all semesters and the subject catalog were reset");
        }
        Command::Catalog { query } => {
            let entries = services
                .catalog()
                .suggest(query.as_deref().unwrap_or(""))
                .await?;
            print!("{}", output::catalog(&entries));
        }
        Command::Report {
            format,
            options,
            out,
        } => {
            let report = match services.report(options).await {
                Err(ReportError::NoData) => {
                    println!("{}", output::NO_DATA_HINT);
                    return Ok(());
                }
                other => other?,
            };
            let rendered = match format {
                ReportFormat::Text => report.render_text(),
                ReportFormat::Json => report.to_json()?,
            };
            match out {
                Some(path) => {
                    std::fs::write(&path, rendered)?;
                    println!("report written to {}", path.display());
                }
                None => print!("{rendered}"),
            }
        }
        Command::Seed => {
            let added = seed::sample_grades(&services).await?;
            if added == 0 {
                println!("grades already present; run `rapor reset` first to reseed");
            } else {
                println!("seeded {added} subjects");
            }
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(err) = run().await {
        // At this layer (binary glue), printing once is fine.
        eprintln!("{err}");
        std::process::exit(2);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, ArgsError> {
        Args::parse(args.iter().map(ToString::to_string))
    }

    fn sem(id: u8) -> SemesterId {
        SemesterId::new(id).unwrap()
    }

    #[test]
    fn no_command_means_summary() {
        let args = parse(&["--db", "sqlite::memory:"]).unwrap();
        assert_eq!(args.command, Command::Summary);
        assert_eq!(args.db_url, "sqlite::memory:");
    }

    #[test]
    fn add_collects_a_draft() {
        let args = parse(&["add", "2", "--name", "Math", "--score", "88", "--kkm", "70"]).unwrap();
        assert_eq!(
            args.command,
            Command::Add {
                id: sem(2),
                draft: SubjectDraft::new("Math", 88).with_kkm("70"),
            }
        );
    }

    #[test]
    fn non_numeric_score_becomes_zero() {
        let args = parse(&["add", "1", "--name", "Math", "--score", "abc"]).unwrap();
        let Command::Add { draft, .. } = args.command else {
            panic!("expected add");
        };
        assert_eq!(draft.score, 0);
        assert_eq!(draft.kkm, None);
    }

    #[test]
    fn edit_and_remove_take_a_subject_id() {
        let args = parse(&["edit", "3", "abc-1", "--name", "Art", "--score", "90"]).unwrap();
        assert!(matches!(
            args.command,
            Command::Edit { id, ref subject_id, .. } if id == sem(3) && subject_id.as_str() == "abc-1"
        ));
        assert_eq!(
            parse(&["remove", "3"]).unwrap_err(),
            ArgsError::MissingArgument { what: "subject id" }
        );
    }

    #[test]
    fn semester_must_be_in_range() {
        assert_eq!(
            parse(&["clear", "6"]).unwrap_err(),
            ArgsError::InvalidSemester { raw: "6".into() }
        );
        assert_eq!(
            parse(&["semester"]).unwrap_err(),
            ArgsError::MissingArgument {
                what: "semester number"
            }
        );
    }

    #[test]
    fn flags_are_checked_per_command() {
        assert_eq!(
            parse(&["reset", "--name", "x"]).unwrap_err(),
            ArgsError::UnexpectedFlag {
                flag: "--name".into(),
                command: "reset"
            }
        );
        assert_eq!(
            parse(&["add", "1", "--score", "80"]).unwrap_err(),
            ArgsError::MissingArgument { what: "--name" }
        );
        assert_eq!(
            parse(&["summary", "--bogus"]).unwrap_err(),
            ArgsError::UnknownArg("--bogus".into())
        );
        assert_eq!(
            parse(&["frobnicate"]).unwrap_err(),
            ArgsError::UnknownCommand("frobnicate".into())
        );
    }

    #[test]
    fn report_options() {
        let args = parse(&[
            "report", "--format", "json", "--student", "Agit", "--school", "SMA 1", "--out",
            "r.json",
        ])
        .unwrap();
        let Command::Report {
            format,
            options,
            out,
        } = args.command
        else {
            panic!("expected report");
        };
        assert_eq!(format, ReportFormat::Json);
        assert_eq!(options.student_name.as_deref(), Some("Agit"));
        assert_eq!(options.school_name.as_deref(), Some("SMA 1"));
        assert_eq!(out, Some(PathBuf::from("r.json")));

        assert_eq!(
            parse(&["report", "--format", "pdf"]).unwrap_err(),
            ArgsError::InvalidFormat { raw: "pdf".into() }
        );
    }

    #[test]
    fn relative_db_paths_become_absolute() {
        let url = normalize_sqlite_url("sqlite:data/rapor.sqlite3".to_string());
        assert!(url.starts_with("sqlite:///"));
        assert!(url.ends_with("data/rapor.sqlite3"));
        assert_eq!(
            normalize_sqlite_url("sqlite://already.db".to_string()),
            "sqlite://already.db"
        );
    }
}
