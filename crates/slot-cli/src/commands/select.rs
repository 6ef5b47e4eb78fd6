//! Select command for managing the selected reservation units.

use std::fmt::Write;

use anyhow::Result;

use crate::cli::SelectAction;
use crate::config::Config;
use crate::store::SelectionStore;

/// Formats the selection for terminal display.
pub fn format_selection(store: &SelectionStore) -> String {
    let mut output = String::new();

    if store.units().is_empty() {
        writeln!(output, "No units selected.").unwrap();
        return output;
    }

    writeln!(output, "SELECTED UNITS ({})", store.units().len()).unwrap();
    for pk in store.units() {
        writeln!(output, "  #{pk}").unwrap();
    }
    output
}

/// Applies `action` to `store`, returning the message to print.
pub fn apply(store: &mut SelectionStore, action: &SelectAction) -> Result<String> {
    let message = match action {
        SelectAction::Add { pk } => {
            if store.add(*pk) {
                store.save()?;
                format!("Selected unit #{pk}.\n")
            } else {
                format!("Unit #{pk} is already selected.\n")
            }
        }
        SelectAction::Remove { pk } => {
            if store.remove(*pk) {
                store.save()?;
                format!("Removed unit #{pk}.\n")
            } else {
                format!("Unit #{pk} was not selected.\n")
            }
        }
        SelectAction::List { json } => {
            if *json {
                format!("{}\n", serde_json::to_string_pretty(store.units())?)
            } else {
                format_selection(store)
            }
        }
        SelectAction::Clear => {
            store.clear();
            store.save()?;
            "Selection cleared.\n".to_string()
        }
    };
    Ok(message)
}

/// Runs the select command.
pub fn run(action: &SelectAction, config: &Config) -> Result<()> {
    let mut store = SelectionStore::load(&config.selection_path)?;
    print!("{}", apply(&mut store, action)?);
    Ok(())
}
