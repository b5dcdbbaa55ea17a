use crate::core::models::atom::Atom;
use crate::core::spatial::{NearbyPair, SpatialQuery, sort_pairs};
use tracing::{debug, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Every unordered pair of distinct atoms in `index` within `max_distance`.
///
/// Each atom runs its own radius query and keeps only partners with a larger identifier,
/// so no seen-set is shared between workers. Pairs are sorted by identifier pair and
/// repeated identifier pairs collapse to the closest one, matching
/// [`SpatialQuery::find_nearby_pairs`].
#[instrument(skip_all, name = "nearby_pairs_task")]
pub fn run<Q>(index: &Q, max_distance: f64) -> Vec<NearbyPair<'_>>
where
    Q: SpatialQuery + Sync + ?Sized,
{
    if max_distance < 0.0 || index.len() < 2 {
        return Vec::new();
    }

    let atoms: Vec<&Atom> = index.atoms().collect();

    #[cfg(not(feature = "parallel"))]
    let iterator = atoms.iter();

    #[cfg(feature = "parallel")]
    let iterator = atoms.par_iter();

    let mut pairs: Vec<NearbyPair<'_>> = iterator
        .map(|&atom| {
            index
                .query_radius(&atom.position, max_distance)
                .into_iter()
                .filter(|other| atom.id < other.id)
                .map(|other| NearbyPair::new(atom, other))
                .collect::<Vec<_>>()
        })
        .flatten()
        .collect();

    sort_pairs(&mut pairs);
    debug!(
        atoms = atoms.len(),
        pairs = pairs.len(),
        max_distance,
        "Enumerated nearby pairs."
    );
    pairs
}
