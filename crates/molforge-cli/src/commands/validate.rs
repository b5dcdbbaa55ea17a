use crate::cli::ValidateArgs;
use crate::error::Result;
use crate::io;
use molforge::engine::config::EngineConfig;
use molforge::engine::report::ValidationResult;
use molforge::engine::validation::ChemicalValidator;
use std::fmt::Write;
use tracing::{info, warn};

pub fn run(args: ValidateArgs, config: &EngineConfig) -> Result<()> {
    let (atoms, bonds) = io::read_molecule(&args.input)?;

    let mut validator = ChemicalValidator::new(&config.validation);
    let result = validator.validate(&atoms, &bonds);
    let summary = result.summary();
    info!(
        valid = result.is_valid,
        warnings = summary.total_warnings,
        suggestions = summary.suggestions,
        "Validation finished."
    );
    if !result.is_valid {
        warn!("Structure failed validation with {} high-severity warning(s).", summary.high);
    }

    if args.json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        print!("{}", render_report(&result));
    }
    Ok(())
}

/// Human-readable rendering of a validation result.
pub fn render_report(result: &ValidationResult) -> String {
    let mut out = String::new();
    let summary = result.summary();

    let verdict = if result.is_valid { "valid" } else { "INVALID" };
    let _ = writeln!(
        out,
        "Structure is {verdict}: {} warning(s) ({} high, {} medium, {} low), {} suggestion(s).",
        summary.total_warnings, summary.high, summary.medium, summary.low, summary.suggestions
    );

    if !result.warnings.is_empty() {
        let _ = writeln!(out, "\nWarnings:");
        for warning in &result.warnings {
            let subject = match (&warning.atom_symbol, &warning.atom_id) {
                (Some(symbol), Some(id)) => format!("{symbol} ({id})"),
                (None, Some(id)) => id.to_string(),
                _ => "structure".to_string(),
            };
            let _ = writeln!(
                out,
                "  [{:<6}] {:<16} {}: {}",
                warning.severity.to_string(),
                warning.kind.to_string(),
                subject,
                warning.message
            );
        }
    }

    if !result.suggestions.is_empty() {
        let _ = writeln!(out, "\nSuggestions:");
        for suggestion in &result.suggestions {
            let _ = writeln!(
                out,
                "  {} ({}): {} - {}",
                suggestion.atom_symbol, suggestion.atom_id, suggestion.action, suggestion.reason
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use molforge::core::models::atom::Atom;
    use molforge::core::models::topology::{Bond, BondType};
    use molforge::engine::validation::validate_molecule;
    use nalgebra::Point3;

    #[test]
    fn report_lists_warnings_and_suggestions() {
        let atoms = vec![
            Atom::new("c1", "C", Point3::origin()),
            Atom::new("h1", "H", Point3::new(1.09, 0.0, 0.0)),
        ];
        let bonds = vec![Bond::new("b1", "c1", "h1", BondType::Single)];
        let result = validate_molecule(&atoms, &bonds);
        let report = render_report(&result);

        assert!(report.starts_with("Structure is valid"));
        assert!(report.contains("incomplete-octet"));
        assert!(report.contains("C (c1)"));
        assert!(report.contains("Suggestions:"));
        assert!(report.contains("Add 3 hydrogen atom(s)"));
    }

    #[test]
    fn clean_structures_render_only_the_verdict() {
        let report = render_report(&ValidationResult::default());
        assert_eq!(
            report,
            "Structure is valid: 0 warning(s) (0 high, 0 medium, 0 low), 0 suggestion(s).\n"
        );
    }

    #[test]
    fn graph_level_warnings_name_the_structure() {
        let atoms = vec![Atom::new("c1", "C", Point3::origin())];
        let bonds = vec![Bond::new("b1", "c1", "ghost", BondType::Single)];
        let report = render_report(&validate_molecule(&atoms, &bonds));
        assert!(report.starts_with("Structure is INVALID"));
        assert!(report.contains("dangling-bond"));
        assert!(report.contains("structure:"));
    }
}
