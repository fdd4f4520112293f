use std::path::Path;

use tracing::{debug, warn};

use crate::{
    catalog::Catalog,
    options::{CreateMode, StoreOptions},
    shell::{Command, CommandOutput, PutAction},
    table::{FamilyValues, validate_family_name, validate_table_name},
    util::{Result, Status},
};

/// Entry point for a presentation layer.
///
/// Takes a [`Command`] built from user input, checks that its arguments are
/// well-formed, runs it against the catalog and hands back a
/// [`CommandOutput`]. The shell never prompts or prints; overwrite
/// confirmation and rendering belong to the caller.
pub struct Shell {
    catalog: Catalog,
}

impl Shell {
    pub fn new(catalog: Catalog) -> Self {
        Shell { catalog }
    }

    pub fn open<P: AsRef<Path>>(dir: P, options: StoreOptions) -> Result<Self> {
        Ok(Shell::new(Catalog::open(dir, options)?))
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn execute(&self, command: Command) -> Result<CommandOutput> {
        let name = command.name();
        debug!(command = name, "executing command");

        let result = self.dispatch(command);
        if let Err(e) = &result {
            warn!(command = name, error = %e, "command failed");
        }
        result
    }

    fn dispatch(&self, command: Command) -> Result<CommandOutput> {
        let catalog = &self.catalog;
        match command {
            Command::Create {
                name,
                column_families,
                max_versions,
                overwrite,
            } => {
                let name = table_name(&name)?;
                let families = family_list(&column_families)?;
                if families.is_empty() {
                    return Err(Status::invalid_argument(
                        "A table needs at least one column family",
                    ));
                }
                if max_versions == Some(0) {
                    return Err(Status::invalid_argument(
                        "max_versions must be a positive integer",
                    ));
                }
                let mode = if overwrite {
                    CreateMode::Overwrite
                } else {
                    CreateMode::FailIfExists
                };
                let snapshot = catalog.create(name, &families, max_versions, mode)?;
                Ok(CommandOutput::Created(snapshot))
            }
            Command::List => Ok(CommandOutput::Tables(catalog.list())),
            Command::Disable { name } => {
                catalog.disable(table_name(&name)?)?;
                Ok(CommandOutput::Done)
            }
            Command::Enable { name } => {
                catalog.enable(table_name(&name)?)?;
                Ok(CommandOutput::Done)
            }
            Command::IsEnabled { name } => Ok(CommandOutput::Enabled(
                catalog.is_enabled(table_name(&name)?)?,
            )),
            Command::Alter {
                name,
                new_name,
                add_families,
            } => {
                let name = table_name(&name)?;
                let new_name = table_name(&new_name)?;
                let families = family_list(&add_families)?;
                let snapshot = catalog.alter(name, new_name, &families)?;
                Ok(CommandOutput::Altered(snapshot))
            }
            Command::Drop { name } => {
                catalog.drop(table_name(&name)?)?;
                Ok(CommandOutput::Done)
            }
            Command::DropAll { pattern } => {
                let pattern = pattern.trim();
                if pattern.is_empty() {
                    return Err(Status::invalid_argument("Pattern must not be empty"));
                }
                glob::Pattern::new(pattern)?;
                Ok(CommandOutput::DropAll(catalog.drop_all(pattern)?))
            }
            Command::Describe { name } => Ok(CommandOutput::Description(
                catalog.describe(table_name(&name)?)?,
            )),
            Command::Put {
                table,
                action,
                values,
            } => {
                let table = table_name(&table)?;
                check_values(&values)?;
                match action {
                    PutAction::Insert => {
                        Ok(CommandOutput::Inserted(catalog.insert(table, &values)?))
                    }
                    PutAction::Update(row) => {
                        catalog.update(table, &row, &values)?;
                        Ok(CommandOutput::Done)
                    }
                }
            }
            Command::Get { table, row } => Ok(CommandOutput::Row(
                catalog.get_row(table_name(&table)?, &row)?,
            )),
            Command::Cell {
                table,
                row,
                family,
                property,
            } => Ok(CommandOutput::Cell(catalog.cell(
                table_name(&table)?,
                &row,
                family.trim(),
                property.trim(),
            )?)),
            Command::Scan { table } => Ok(CommandOutput::Rows(catalog.scan(table_name(&table)?)?)),
            Command::Count { table } => Ok(CommandOutput::Count(
                catalog.count_rows(table_name(&table)?)?,
            )),
            Command::Export { table } => Ok(CommandOutput::Export(
                catalog.export(table_name(&table)?)?,
            )),
        }
    }
}

fn table_name(name: &str) -> Result<&str> {
    let name = name.trim();
    validate_table_name(name)?;
    Ok(name)
}

fn family_list(families: &[String]) -> Result<Vec<String>> {
    families
        .iter()
        .map(|f| {
            let f = f.trim();
            validate_family_name(f)?;
            Ok(f.to_string())
        })
        .collect()
}

fn check_values(values: &FamilyValues) -> Result<()> {
    if values.is_empty() {
        return Err(Status::invalid_argument("Put needs at least one value"));
    }
    for (family, props) in values {
        validate_family_name(family)?;
        if props.is_empty() {
            return Err(Status::invalid_argument(format!(
                "Column family '{family}' has no properties"
            )));
        }
        if props.keys().any(|p| p.trim().is_empty()) {
            return Err(Status::invalid_argument(format!(
                "Column family '{family}' has an empty property name"
            )));
        }
    }
    Ok(())
}
