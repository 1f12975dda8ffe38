//! Catalog command handler

use crate::cli::{CatalogArgs, OutputFormat};
use crate::error::Result;
use crate::output::OutputWriter;
use indexmap::IndexMap;
use mesh_core::{PredicateRegistry, StepKind};

const KINDS: [StepKind; 4] = [
    StepKind::Filter,
    StepKind::Format,
    StepKind::Rule,
    StepKind::Callback,
];

/// Built-in identifiers grouped by step kind
pub fn builtin_identifiers(kind: Option<StepKind>) -> IndexMap<&'static str, Vec<String>> {
    let registry = PredicateRegistry::with_builtins();

    KINDS
        .into_iter()
        .filter(|candidate| kind.map_or(true, |kind| kind == *candidate))
        .map(|kind| {
            let identifiers: Vec<String> = registry
                .identifiers(kind)
                .into_iter()
                .map(str::to_string)
                .collect();
            (kind.as_str(), identifiers)
        })
        .filter(|(_, identifiers)| !identifiers.is_empty())
        .collect()
}

/// Handle the catalog command
pub fn handle_catalog(args: CatalogArgs, output: &mut OutputWriter) -> Result<()> {
    let catalog = builtin_identifiers(args.kind.map(StepKind::from));

    if output.format() != OutputFormat::Human {
        return output.data(&catalog);
    }

    let rows = catalog
        .iter()
        .flat_map(|(kind, identifiers)| {
            identifiers
                .iter()
                .map(move |identifier| vec![kind.to_string(), identifier.clone()])
        })
        .collect();
    output.table(&["Kind", "Identifier"], rows)?;
    output.info("email_domain is available when a host registers an MX resolver")
}
