/// Command layer between a user-facing front end and the catalog.
///
/// A front end (REPL, CLI, test) gathers arguments, builds a [`Command`]
/// and renders the [`CommandOutput`] it gets back:
///
/// ```ignore
/// use colfam::{Command, CommandOutput, Shell, StoreOptions};
///
/// let shell = Shell::open("tables", StoreOptions::default())?;
/// let out = shell.execute(Command::Create {
///     name: "users".to_string(),
///     column_families: vec!["personal".to_string(), "work".to_string()],
///     max_versions: Some(3),
///     overwrite: false,
/// })?;
/// if let CommandOutput::Created(table) = out {
///     println!("created {}", table.name);
/// }
/// ```
mod command;
#[allow(clippy::module_inception)]
mod shell;

pub use command::{Command, CommandOutput, PutAction};
pub use shell::Shell;
