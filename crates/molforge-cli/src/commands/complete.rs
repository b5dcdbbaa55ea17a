use crate::cli::CompleteArgs;
use crate::error::Result;
use crate::io;
use molforge::engine::completion::auto_complete_with_hydrogen;
use molforge::engine::config::EngineConfig;
use tracing::info;

pub fn run(args: CompleteArgs, config: &EngineConfig) -> Result<()> {
    let (mut atoms, mut bonds) = io::read_molecule(&args.input)?;

    let completion = auto_complete_with_hydrogen(&atoms, &bonds, config)?;
    info!("Adding {} hydrogen atom(s).", completion.len());
    atoms.extend(completion.atoms);
    bonds.extend(completion.bonds);

    io::write_molecule(args.output.as_deref(), &atoms, &bonds)
}
