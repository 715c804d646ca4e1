//! Lattice law checks
//!
//! Monotonicity of `merge` is a precondition on domain authors that the
//! engine cannot check at runtime. These helpers check the laws on a sample
//! of values; property tests feed them generated samples.

use crate::features::lattice::domain::entity_map::EntityMap;
use crate::features::lattice::domain::map_domain::MapAbstractDomain;
use crate::features::lattice::domain::value_domain::{AbstractValueDomain, LatticeOrdering};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LawViolation {
    #[error("merge is not commutative for {a} and {b}")]
    NotCommutative { a: String, b: String },

    #[error("merge is not idempotent for {0}")]
    NotIdempotent(String),

    #[error("bottom is not the identity of merge for {0}")]
    BottomNotIdentity(String),

    #[error("compare({a}, merge({a}, {b})) is neither Less nor Equal")]
    NotUpperBound { a: String, b: String },

    #[error("compare is not reflexive for {0}")]
    NotReflexive(String),
}

/// Commutativity, idempotence, bottom identity, and compare/merge consistency
pub fn check_value_laws<D: AbstractValueDomain>(
    domain: &D,
    samples: &[D::Value],
) -> Result<(), LawViolation> {
    let bottom = domain.bottom();
    for a in samples {
        if domain.merge(a, a) != *a {
            return Err(LawViolation::NotIdempotent(format!("{a:?}")));
        }
        if domain.merge(a, &bottom) != *a {
            return Err(LawViolation::BottomNotIdentity(format!("{a:?}")));
        }
        if domain.compare(a, a) != LatticeOrdering::Equal {
            return Err(LawViolation::NotReflexive(format!("{a:?}")));
        }
        for b in samples {
            let ab = domain.merge(a, b);
            if ab != domain.merge(b, a) {
                return Err(LawViolation::NotCommutative {
                    a: format!("{a:?}"),
                    b: format!("{b:?}"),
                });
            }
            if !domain.compare(a, &ab).is_le() {
                return Err(LawViolation::NotUpperBound {
                    a: format!("{a:?}"),
                    b: format!("{b:?}"),
                });
            }
        }
    }
    Ok(())
}

/// Merge idempotence and reflexive stability over entity maps
pub fn check_map_laws<D: AbstractValueDomain>(
    maps: &MapAbstractDomain<'_, D>,
    samples: &[EntityMap<D::Value>],
) -> Result<(), LawViolation> {
    for a in samples {
        if !maps.is_stable(&maps.merge(a, a), a) {
            return Err(LawViolation::NotIdempotent(format!("{a:?}")));
        }
        if !maps.is_stable(a, a) {
            return Err(LawViolation::NotReflexive(format!("{a:?}")));
        }
        for b in samples {
            let ab = maps.merge(a, b);
            if !maps.is_stable(&ab, &maps.merge(b, a)) {
                return Err(LawViolation::NotCommutative {
                    a: format!("{a:?}"),
                    b: format!("{b:?}"),
                });
            }
            if !maps.compare(a, &ab).is_le() {
                return Err(LawViolation::NotUpperBound {
                    a: format!("{a:?}"),
                    b: format!("{b:?}"),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod tests_support {
    use super::*;

    /// Chain lattice 0 < 1 < ... < n
    pub struct Height(pub u8);

    impl AbstractValueDomain for Height {
        type Value = u8;

        fn bottom(&self) -> u8 {
            0
        }

        fn unknown(&self) -> u8 {
            self.0
        }

        fn compare(&self, a: &u8, b: &u8) -> LatticeOrdering {
            match a.cmp(b) {
                std::cmp::Ordering::Less => LatticeOrdering::Less,
                std::cmp::Ordering::Equal => LatticeOrdering::Equal,
                std::cmp::Ordering::Greater => LatticeOrdering::Greater,
            }
        }

        fn merge(&self, a: &u8, b: &u8) -> u8 {
            *a.max(b)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::Height;
    use super::*;
    use crate::features::entity::AnalysisEntity;
    use crate::features::lattice::MissingEntryPolicy;

    /// Merge that forgets its second argument
    struct LeftBiased;

    impl AbstractValueDomain for LeftBiased {
        type Value = u8;

        fn bottom(&self) -> u8 {
            0
        }

        fn unknown(&self) -> u8 {
            9
        }

        fn compare(&self, a: &u8, b: &u8) -> LatticeOrdering {
            Height(9).compare(a, b)
        }

        fn merge(&self, a: &u8, _b: &u8) -> u8 {
            *a
        }
    }

    #[test]
    fn test_chain_lattice_satisfies_laws() {
        assert_eq!(check_value_laws(&Height(4), &[0, 1, 2, 3, 4]), Ok(()));
    }

    #[test]
    fn test_left_biased_merge_is_rejected() {
        let err = check_value_laws(&LeftBiased, &[1, 2]).unwrap_err();
        assert!(matches!(err, LawViolation::NotCommutative { .. }));
    }

    #[test]
    fn test_map_laws_for_both_policies() {
        let domain = Height(3);
        let samples: Vec<EntityMap<u8>> = vec![
            EntityMap::new(),
            [(AnalysisEntity::local("x"), 1)].into_iter().collect(),
            [(AnalysisEntity::local("x"), 3), (AnalysisEntity::local("y"), 2)]
                .into_iter()
                .collect(),
        ];
        for policy in [MissingEntryPolicy::CarryThrough, MissingEntryPolicy::DropUnknown] {
            let maps = MapAbstractDomain::new(&domain, policy);
            assert_eq!(check_map_laws(&maps, &samples), Ok(()), "{policy:?}");
        }
    }
}
