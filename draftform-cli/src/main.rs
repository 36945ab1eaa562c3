use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result, WrapErr, eyre};
use serde_json::Value;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use draftform::{
    EditorOutcome, EntityForm, FormEditor, FormSession, SchemaRegistry, UiOptions,
    auth::{AuthSession, Credentials, FileTokenStore},
    dehydrate, hydrate,
    io::{DocumentFormat, OutputOptions, emit, parse_document_any},
    schema::config_schema,
    store::{AuthorizedStore, FileStore, ListingQuery, ManagePage, PageOutcome},
    upload::LocalUploader,
};

#[derive(Debug, Parser)]
#[command(
    name = "draftform",
    version,
    about = "Create, edit and review community-site records through schema-driven forms"
)]
struct Cli {
    /// Directory holding one JSON array per collection
    #[arg(long, env = "DRAFTFORM_STORE", value_name = "DIR", default_value = "data")]
    store: PathBuf,

    /// Extra entity schemas: file path, inline payload, or "-" for stdin
    #[arg(long, value_name = "SPEC")]
    schemas: Option<String>,

    /// Where the admin session is kept (defaults to the user config dir)
    #[arg(long = "session-file", env = "DRAFTFORM_SESSION", value_name = "PATH")]
    session_file: Option<PathBuf>,

    /// Write printed documents to this file; the extension picks the format
    #[arg(short, long, global = true, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Print documents on a single line
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print the JSON Schema for entity schema documents, or one entity schema
    Schema {
        #[arg(short, long)]
        entity: Option<String>,
    },
    /// List known entities
    Entities,
    /// Print stored records matching the search and filter
    List {
        #[arg(short, long)]
        entity: String,
        #[arg(long)]
        search: Option<String>,
        #[arg(long)]
        filter: Option<String>,
    },
    /// Print the form draft a record opens as
    Hydrate {
        #[arg(short, long)]
        entity: String,
        /// Record spec: file path, inline payload, or "-" for stdin
        #[arg(short, long, value_name = "SPEC")]
        record: Option<String>,
        /// Date used for blank date fields (YYYY-MM-DD)
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Print the payload a record would be saved as
    Normalize {
        #[arg(short, long)]
        entity: String,
        #[arg(short, long, value_name = "SPEC")]
        record: String,
        #[arg(long)]
        today: Option<NaiveDate>,
    },
    /// Run the form rules against a record
    Check {
        #[arg(short, long)]
        entity: String,
        #[arg(short, long, value_name = "SPEC")]
        record: String,
    },
    /// Open the terminal editor for a new or existing record
    Edit {
        #[arg(short, long)]
        entity: String,
        #[arg(long)]
        id: Option<String>,
        /// Directory uploaded images are copied into
        #[arg(long, value_name = "DIR")]
        media_dir: Option<PathBuf>,
    },
    /// Delete a stored record
    Delete {
        #[arg(short, long)]
        entity: String,
        #[arg(long)]
        id: String,
    },
    /// Remember the admin credentials
    Login {
        #[arg(long)]
        email: String,
        #[arg(long)]
        token: String,
    },
    /// Forget the admin credentials
    Logout,
    /// Show who is signed in
    Whoami,
}

fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();
    let cli = Cli::parse();
    let registry = load_registry(cli.schemas.as_deref())?;

    match &cli.command {
        Command::Schema { entity } => {
            let value = match entity {
                Some(name) => serde_json::to_value(lookup(&registry, name)?.schema())?,
                None => config_schema(),
            };
            print_value(&cli, &value)
        }
        Command::Entities => {
            for name in registry.names() {
                println!("{name}");
            }
            Ok(())
        }
        Command::List {
            entity,
            search,
            filter,
        } => {
            let form = lookup(&registry, entity)?;
            let mut page = ManagePage::load(form, FileStore::new(&cli.store))?;
            page.set_query(ListingQuery {
                search: search.clone(),
                filter: filter.clone(),
            });
            let visible: Vec<Value> = page.visible().into_iter().cloned().collect();
            print_value(&cli, &Value::Array(visible))
        }
        Command::Hydrate {
            entity,
            record,
            today,
        } => {
            let form = lookup(&registry, entity)?;
            let record = record
                .as_deref()
                .map(|spec| load_value(spec, "record"))
                .transpose()?;
            let draft = hydrate(form.schema(), record.as_ref(), today.unwrap_or_else(local_today));
            print_value(&cli, &draft.to_view())
        }
        Command::Normalize {
            entity,
            record,
            today,
        } => {
            let form = lookup(&registry, entity)?;
            let record = load_value(record, "record")?;
            let draft = hydrate(form.schema(), Some(&record), today.unwrap_or_else(local_today));
            print_value(&cli, &Value::Object(dehydrate(form.schema(), &draft)))
        }
        Command::Check { entity, record } => {
            let form = lookup(&registry, entity)?;
            let record = load_value(record, "record")?;
            let session = FormSession::open(form, Some(&record), local_today());
            match session.validate() {
                Ok(()) => {
                    println!("ok");
                    Ok(())
                }
                Err(failure) => Err(eyre!(
                    "{} ({} tab, field {})",
                    failure.message,
                    failure.tab,
                    failure.field
                )),
            }
        }
        Command::Edit {
            entity,
            id,
            media_dir,
        } => {
            let form = lookup(&registry, entity)?;
            let mut page = open_authorized_page(&cli, form)?;
            let today = local_today();
            let session = match id {
                Some(id) => page
                    .open_edit(id, today)
                    .ok_or_else(|| eyre!("{entity} '{id}' not found"))?,
                None => page.open_create(today),
            };
            let mut options = UiOptions::default();
            if let Some(dir) = media_dir {
                options = options.with_uploader(LocalUploader::new(dir));
            }
            let mut editor = FormEditor::new(session).with_options(options);
            let outcome = editor.run().map_err(Report::msg)?;
            let mut session = editor.into_session();
            match outcome {
                EditorOutcome::Saved(_) => report(&cli, page.save(&mut session)),
                EditorOutcome::Cancelled => {
                    session.cancel();
                    eprintln!("cancelled; nothing saved");
                    Ok(())
                }
            }
        }
        Command::Delete { entity, id } => {
            let form = lookup(&registry, entity)?;
            let mut page = open_authorized_page(&cli, form)?;
            report(&cli, page.delete(id))
        }
        Command::Login { email, token } => {
            let mut auth = auth_session(&cli)?;
            auth.login(Credentials {
                token: token.clone(),
                email: email.clone(),
            })
            .map_err(Report::msg)?;
            println!("signed in as {email}");
            Ok(())
        }
        Command::Logout => {
            auth_session(&cli)?.logout().map_err(Report::msg)?;
            println!("signed out");
            Ok(())
        }
        Command::Whoami => {
            match auth_session(&cli)?.email() {
                Some(email) => println!("{email}"),
                None => println!("not signed in"),
            }
            Ok(())
        }
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_env("DRAFTFORM_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

fn load_registry(schemas: Option<&str>) -> Result<SchemaRegistry> {
    let mut registry = SchemaRegistry::with_builtins()?;
    if let Some(spec) = schemas {
        let document = load_value(spec, "schemas")?;
        let count = registry
            .extend_from_value(&document)
            .map_err(Report::msg)?;
        debug!(count, "registered extra entity schemas");
    }
    Ok(registry)
}

fn lookup(registry: &SchemaRegistry, name: &str) -> Result<Arc<EntityForm>> {
    registry.get(name).ok_or_else(|| {
        let known: Vec<&str> = registry.names().collect();
        eyre!("unknown entity '{name}' (known: {})", known.join(", "))
    })
}

fn auth_session(cli: &Cli) -> Result<AuthSession<FileTokenStore>> {
    let path = cli
        .session_file
        .clone()
        .unwrap_or_else(FileTokenStore::default_path);
    AuthSession::init(FileTokenStore::new(path)).map_err(Report::msg)
}

fn open_authorized_page(
    cli: &Cli,
    form: Arc<EntityForm>,
) -> Result<ManagePage<AuthorizedStore<FileStore, FileTokenStore>>> {
    let auth = auth_session(cli)?;
    if !auth.is_authenticated() {
        return Err(eyre!("not signed in; run `draftform login` first"));
    }
    let store = AuthorizedStore::new(FileStore::new(&cli.store), auth);
    Ok(ManagePage::load(form, store)?)
}

fn report(cli: &Cli, outcome: PageOutcome) -> Result<()> {
    match outcome {
        PageOutcome::Saved(record) => print_value(cli, &record),
        PageOutcome::Deleted(id) => {
            println!("deleted {id}");
            Ok(())
        }
        PageOutcome::Invalid(failure) => Err(eyre!(failure.message)),
        PageOutcome::LoginRequired => Err(eyre!("login required; run `draftform login`")),
        PageOutcome::Failed(message) => Err(eyre!(message)),
    }
}

fn print_value(cli: &Cli, value: &Value) -> Result<()> {
    let options = match &cli.output {
        Some(path) => OutputOptions::for_path(path),
        None => OutputOptions::default(),
    };
    emit(value, &options.with_pretty(!cli.compact)).map_err(Report::msg)
}

/// `-` reads stdin, an existing path reads the file, anything else is parsed
/// as inline content.
fn load_value(spec: &str, label: &str) -> Result<Value> {
    let (contents, format) = if spec == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .wrap_err("failed to read from stdin")?;
        (buffer, DocumentFormat::default())
    } else if Path::new(spec).is_file() {
        let path = Path::new(spec);
        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("failed to read {label} from {}", path.display()))?;
        (contents, DocumentFormat::from_path(path).unwrap_or_default())
    } else {
        (spec.to_string(), DocumentFormat::default())
    };
    parse_document_any(&contents, format)
        .map_err(|err| eyre!("failed to parse {label}: {err:#}"))
}
