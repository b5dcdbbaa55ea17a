use crate::cli::FormulaArgs;
use crate::error::Result;
use crate::io;
use molforge::core::chemistry::bonding::{molecular_formula, molecular_weight};

pub fn run(args: FormulaArgs) -> Result<()> {
    let (atoms, _) = io::read_molecule(&args.input)?;
    println!(
        "{}\t{:.3} g/mol",
        molecular_formula(&atoms),
        molecular_weight(&atoms)
    );
    Ok(())
}
