//! `gradtrack` command-line front end.
//!
//! # Responsibility
//! - Parse arguments, resolve configuration and start logging.
//! - Put the password gate in front of every command but `login`.
//! - Render store state as plain text.

use chrono::Local;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use gradtrack_core::config::DEFAULT_CONFIG_FILE;
use gradtrack_core::db::open_db;
use gradtrack_core::editor::checklist;
use gradtrack_core::view::display::{display_text, format_date, is_overdue};
use gradtrack_core::{
    init_logging, status_counts, AppConfig, Application, ApplicationBackend, ApplicationDraft,
    ApplicationEditor, ApplicationStore, AuthFlags, AuthOutcome, BackendChoice, ChecklistProgress,
    DeleteOutcome, EditorError, EtatSet, JsonFileBackend, ListView, PasswordGate,
    SqliteTableBackend, SortDirection, SortKey, Status,
};
use log::{info, warn};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;
use uuid::Uuid;

type CliResult<T> = Result<T, Box<dyn Error>>;

const SORT_KEYS: [&str; 7] = [
    "uni",
    "formation",
    "ville",
    "etat",
    "deadline",
    "date-applied",
    "created-at",
];

fn main() -> ExitCode {
    let matches = build_cli().get_matches();
    match run(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn build_cli() -> Command {
    Command::new("gradtrack")
        .version(gradtrack_core::core_version())
        .about("Track graduate program applications")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help(format!("Config file (default: ./{DEFAULT_CONFIG_FILE})")),
        )
        .arg(
            Arg::new("backend")
                .long("backend")
                .global(true)
                .value_parser(["local", "table"])
                .help("Persistence backend"),
        )
        .arg(
            Arg::new("data-dir")
                .long("data-dir")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding data, logs and the login marker"),
        )
        .subcommand(
            Command::new("login")
                .about("Unlock with the shared password read from stdin")
                .arg(
                    Arg::new("remember")
                        .long("remember")
                        .action(ArgAction::SetTrue)
                        .help("Stay logged in across runs"),
                ),
        )
        .subcommand(Command::new("logout").about("Forget the login"))
        .subcommand(
            Command::new("list")
                .about("List applications")
                .arg(Arg::new("search").long("search").help("Substring filter"))
                .arg(
                    Arg::new("sort")
                        .long("sort")
                        .value_parser(SORT_KEYS)
                        .help("Sort column (default: newest first)"),
                )
                .arg(
                    Arg::new("desc")
                        .long("desc")
                        .action(ArgAction::SetTrue)
                        .help("Sort descending"),
                ),
        )
        .subcommand(
            field_args(Command::new("add").about("Create an application"))
                .mut_arg("uni", |arg| arg.required(true))
                .mut_arg("formation", |arg| arg.required(true)),
        )
        .subcommand(
            field_args(Command::new("update").about("Edit an application")).arg(id_arg()),
        )
        .subcommand(
            Command::new("remove")
                .about("Delete an application")
                .arg(id_arg())
                .arg(
                    Arg::new("yes")
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation prompt"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Show one application")
                .arg(id_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Edit the checklist of an application")
                .subcommand_required(true)
                .subcommand(
                    Command::new("add")
                        .arg(id_arg())
                        .arg(Arg::new("text").required(true)),
                )
                .subcommand(Command::new("toggle").arg(id_arg()).arg(step_arg()))
                .subcommand(Command::new("remove").arg(id_arg()).arg(step_arg())),
        )
        .subcommand(Command::new("stats").about("Counts per status"))
}

fn id_arg() -> Arg {
    Arg::new("id")
        .required(true)
        .value_parser(parse_uuid)
        .help("Application id")
}

fn step_arg() -> Arg {
    Arg::new("step")
        .required(true)
        .value_parser(parse_uuid)
        .help("Checklist step id")
}

fn parse_uuid(value: &str) -> Result<Uuid, String> {
    Uuid::parse_str(value.trim()).map_err(|err| format!("invalid id `{value}`: {err}"))
}

fn field_args(command: Command) -> Command {
    let text = |name: &'static str| Arg::new(name).long(name);
    command
        .arg(text("uni"))
        .arg(text("formation"))
        .arg(text("ville"))
        .arg(text("campus"))
        .arg(text("mail"))
        .arg(text("site"))
        .arg(text("notes"))
        .arg(
            Arg::new("status")
                .long("status")
                .action(ArgAction::Append)
                .help("Status label or slug; repeat for several"),
        )
        .arg(text("date-applied").help("YYYY-MM-DD, empty to clear"))
        .arg(text("deadline").help("YYYY-MM-DD, empty to clear"))
}

fn run(matches: &ArgMatches) -> CliResult<()> {
    let config = resolve_config(matches)?;
    if let Err(err) = init_logging(&config.log_level, &config.log_dir) {
        eprintln!("warning: logging disabled: {err}");
    }

    let mut flags = AuthFlags::new(config.auth_marker_path());
    let gate = PasswordGate::new(config.password.clone());

    let Some((name, args)) = matches.subcommand() else {
        return Err("no command given".into());
    };
    match name {
        "login" => return login(&gate, &mut flags, args.get_flag("remember")),
        "logout" => {
            flags.revoke()?;
            info!("event=auth_logout module=cli status=ok");
            println!("Logged out.");
            return Ok(());
        }
        _ => {}
    }

    if !flags.is_authed() {
        prompt_password(&gate, &mut flags)?;
    }

    match config.backend {
        BackendChoice::Local => {
            let store = ApplicationStore::open(JsonFileBackend::new(config.json_path()));
            dispatch(store, name, args)
        }
        BackendChoice::Table => {
            let conn = open_db(config.db_path())?;
            let store = ApplicationStore::open(SqliteTableBackend::new(&conn));
            dispatch(store, name, args)
        }
    }
}

fn resolve_config(matches: &ArgMatches) -> CliResult<AppConfig> {
    let mut config = AppConfig::load(matches.get_one::<PathBuf>("config").map(PathBuf::as_path))?;

    if let Some(backend) = matches.get_one::<String>("backend") {
        config.backend = backend.parse()?;
    }
    if let Some(data_dir) = matches.get_one::<PathBuf>("data-dir") {
        let data_dir = std::env::current_dir()?.join(data_dir);
        if config.log_dir == config.data_dir.join("logs") {
            config.log_dir = data_dir.join("logs");
        }
        config.data_dir = data_dir;
    }
    Ok(config)
}

fn read_line() -> CliResult<String> {
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn login(gate: &PasswordGate, flags: &mut AuthFlags, remember: bool) -> CliResult<()> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let input = read_line()?;

    match gate.submit(&input, remember, flags)? {
        AuthOutcome::Granted if remember => println!("Logged in; this machine stays unlocked."),
        AuthOutcome::Granted => println!("Password accepted for this run only."),
        AuthOutcome::Rejected => return Err("incorrect password".into()),
    }
    Ok(())
}

fn prompt_password(gate: &PasswordGate, flags: &mut AuthFlags) -> CliResult<()> {
    eprintln!("Locked. Run `gradtrack login --remember` to skip this prompt.");
    eprint!("Password: ");
    io::stderr().flush()?;
    let input = read_line()?;

    match gate.submit(&input, false, flags)? {
        AuthOutcome::Granted => Ok(()),
        AuthOutcome::Rejected => Err("incorrect password".into()),
    }
}

fn dispatch<B: ApplicationBackend>(
    mut store: ApplicationStore<B>,
    name: &str,
    args: &ArgMatches,
) -> CliResult<()> {
    if let Some(err) = store.error() {
        eprintln!("!! could not load applications ({}): {err}", store.backend_kind().as_str());
    }

    match name {
        "list" => list(&store, args),
        "add" => add(&mut store, args),
        "update" => update(&mut store, args),
        "remove" => remove(&mut store, args),
        "show" => {
            let app = find(&store, args)?;
            print_detail(app);
            Ok(())
        }
        "check" => check(&mut store, args),
        "stats" => {
            print_stats(store.list());
            Ok(())
        }
        other => Err(format!("unknown command `{other}`").into()),
    }
}

fn find<'a, B: ApplicationBackend>(
    store: &'a ApplicationStore<B>,
    args: &ArgMatches,
) -> CliResult<&'a Application> {
    let id = id_of(args, "id")?;
    store
        .get(id)
        .ok_or_else(|| format!("no application with id {id}").into())
}

fn id_of(args: &ArgMatches, name: &str) -> CliResult<Uuid> {
    args.get_one::<Uuid>(name)
        .copied()
        .ok_or_else(|| format!("missing `{name}`").into())
}

fn sort_key(name: &str) -> Option<SortKey> {
    let key = match name {
        "uni" => SortKey::Uni,
        "formation" => SortKey::Formation,
        "ville" => SortKey::Ville,
        "etat" => SortKey::Etat,
        "deadline" => SortKey::Deadline,
        "date-applied" => SortKey::DateApplied,
        "created-at" => SortKey::CreatedAt,
        _ => return None,
    };
    Some(key)
}

fn list<B: ApplicationBackend>(store: &ApplicationStore<B>, args: &ArgMatches) -> CliResult<()> {
    let mut view = ListView::new();
    if let Some(query) = args.get_one::<String>("search") {
        view.set_query(query.as_str());
    }
    if let Some(key) = args.get_one::<String>("sort").and_then(|name| sort_key(name)) {
        view.click_header(key);
    }
    if args.contains_id("sort") {
        view.sort.direction = if args.get_flag("desc") {
            SortDirection::Desc
        } else {
            SortDirection::Asc
        };
    }

    let rows = view.rows(store);
    if rows.is_empty() {
        println!("No applications.");
        return Ok(());
    }

    let today = Local::now().date_naive();
    for app in rows {
        let overdue = if is_overdue(app.deadline, today) { " !" } else { "" };
        println!(
            "{}  {} | {} | {} | {} | deadline {}{overdue}",
            app.id,
            app.uni,
            app.formation,
            display_text(&app.ville),
            app.etat,
            format_date(app.deadline),
        );
    }
    Ok(())
}

/// Copies the flags present in `args` onto `draft`.
fn apply_fields(draft: &mut ApplicationDraft, args: &ArgMatches) -> CliResult<()> {
    let text_fields: [(&str, &mut String); 9] = [
        ("uni", &mut draft.uni),
        ("formation", &mut draft.formation),
        ("ville", &mut draft.ville),
        ("campus", &mut draft.campus),
        ("mail", &mut draft.mail),
        ("site", &mut draft.site),
        ("notes", &mut draft.notes),
        ("date-applied", &mut draft.date_applied),
        ("deadline", &mut draft.deadline),
    ];
    for (name, slot) in text_fields {
        if let Some(value) = args.get_one::<String>(name) {
            *slot = value.clone();
        }
    }

    if let Some(labels) = args.get_many::<String>("status") {
        draft.etat = labels
            .map(|label| label.parse::<Status>())
            .collect::<Result<EtatSet, _>>()?;
    }
    Ok(())
}

fn save_editor<B: ApplicationBackend>(
    mut editor: ApplicationEditor,
    store: &mut ApplicationStore<B>,
) -> CliResult<Application> {
    match editor.save(store) {
        Ok(app) => Ok(app),
        Err(EditorError::Invalid(errors)) => {
            for field in errors.iter() {
                eprintln!("  {} is missing or malformed", field.name());
            }
            Err(EditorError::Invalid(errors).into())
        }
        Err(err) => Err(err.into()),
    }
}

fn add<B: ApplicationBackend>(store: &mut ApplicationStore<B>, args: &ArgMatches) -> CliResult<()> {
    let mut editor = ApplicationEditor::create();
    apply_fields(&mut editor.draft, args)?;
    let app = save_editor(editor, store)?;
    println!("Added {}", app.id);
    Ok(())
}

fn update<B: ApplicationBackend>(
    store: &mut ApplicationStore<B>,
    args: &ArgMatches,
) -> CliResult<()> {
    let mut editor = ApplicationEditor::edit(find(store, args)?);
    apply_fields(&mut editor.draft, args)?;
    let app = save_editor(editor, store)?;
    println!("Updated {}", app.id);
    Ok(())
}

fn remove<B: ApplicationBackend>(
    store: &mut ApplicationStore<B>,
    args: &ArgMatches,
) -> CliResult<()> {
    let id = find(store, args)?.id;
    let mut view = ListView::new();

    if view.click_delete(store, id, Instant::now()) != DeleteOutcome::Armed {
        return Err("delete was not armed".into());
    }
    if !args.get_flag("yes") {
        eprint!(
            "Delete {id}? Press Enter within {}s to confirm: ",
            view.delete.timeout().as_secs()
        );
        io::stderr().flush()?;
        read_line()?;
    }

    match view.click_delete(store, id, Instant::now()) {
        DeleteOutcome::Deleted => {
            println!("Deleted {id}");
            Ok(())
        }
        DeleteOutcome::Armed => {
            warn!("event=delete_confirm module=cli status=expired id={id}");
            Err("confirmation timed out; nothing was deleted".into())
        }
        DeleteOutcome::Failed(message) => Err(message.into()),
    }
}

fn check<B: ApplicationBackend>(
    store: &mut ApplicationStore<B>,
    args: &ArgMatches,
) -> CliResult<()> {
    let Some((action, args)) = args.subcommand() else {
        return Err("missing checklist action".into());
    };
    let id = id_of(args, "id")?;

    match action {
        "add" => {
            let text = args.get_one::<String>("text").map(String::as_str).unwrap_or("");
            match checklist::append(store, id, text)? {
                Some(step) => println!("Added step {}", step.id),
                None => println!("Empty step ignored."),
            }
        }
        "toggle" => {
            let step_id = id_of(args, "step")?;
            let app = checklist::toggle(store, id, step_id)?;
            match app.step(step_id) {
                Some(step) if step.done => println!("Done: {}", step.text),
                Some(step) => println!("Reopened: {}", step.text),
                None => println!("No step {step_id}; checklist unchanged."),
            }
            print_checklist(&app);
        }
        "remove" => {
            let app = checklist::remove(store, id, id_of(args, "step")?)?;
            print_checklist(&app);
        }
        other => return Err(format!("unknown checklist action `{other}`").into()),
    }
    Ok(())
}

fn print_detail(app: &Application) {
    println!("{}", app.id);
    println!("  Université     {}", display_text(&app.uni));
    println!("  Formation      {}", display_text(&app.formation));
    println!("  Ville          {}", display_text(&app.ville));
    println!("  Campus         {}", display_text(&app.campus));
    println!("  Mail           {}", display_text(&app.mail));
    println!("  Site           {}", display_text(&app.site));
    println!("  État           {}", app.etat);
    println!("  Candidature    {}", format_date(app.date_applied));
    println!("  Date limite    {}", format_date(app.deadline));
    println!("  Notes          {}", display_text(&app.notes));
    println!("  Créée le       {}", app.created_at.with_timezone(&Local).format("%d/%m/%Y %H:%M"));
    print_checklist(app);
}

fn print_checklist(app: &Application) {
    let progress = ChecklistProgress::of(&app.checklist);
    println!(
        "  Checklist      {}/{} ({}%)",
        progress.done,
        progress.total,
        progress.percent()
    );
    for step in &app.checklist {
        let mark = if step.done { 'x' } else { ' ' };
        println!("    [{mark}] {}  {}", step.text, step.id);
    }
}

fn print_stats(apps: &[Application]) {
    println!("Total          {}", apps.len());
    for (status, count) in status_counts(apps) {
        println!("  {:<22} {count}", status.label());
    }
}
