use crate::features::lattice::{AbstractValueDomain, LatticeOrdering};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertySetValue {
    /// Not an object the rule tracks
    NotApplicable,
    /// Guard set to a non-null value
    Unflagged,
    /// Guard unset or null
    Flagged,
    /// Flagged on some paths
    MaybeFlagged,
    Unknown,
}

impl PropertySetValue {
    /// Object of the rule's type with a known guard state
    pub fn is_tracked(self) -> bool {
        matches!(
            self,
            PropertySetValue::Unflagged | PropertySetValue::Flagged | PropertySetValue::MaybeFlagged
        )
    }

    pub fn is_hazardous(self) -> bool {
        matches!(self, PropertySetValue::Flagged | PropertySetValue::MaybeFlagged)
    }

    fn height(self) -> u8 {
        match self {
            PropertySetValue::NotApplicable => 0,
            PropertySetValue::Unflagged | PropertySetValue::Flagged => 1,
            PropertySetValue::MaybeFlagged => 2,
            PropertySetValue::Unknown => 3,
        }
    }
}

impl fmt::Display for PropertySetValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PropertySetValue::NotApplicable => "not_applicable",
            PropertySetValue::Unflagged => "unflagged",
            PropertySetValue::Flagged => "flagged",
            PropertySetValue::MaybeFlagged => "maybe_flagged",
            PropertySetValue::Unknown => "unknown",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PropertySetDomain;

impl AbstractValueDomain for PropertySetDomain {
    type Value = PropertySetValue;

    fn bottom(&self) -> PropertySetValue {
        PropertySetValue::NotApplicable
    }

    fn unknown(&self) -> PropertySetValue {
        PropertySetValue::Unknown
    }

    fn compare(&self, a: &PropertySetValue, b: &PropertySetValue) -> LatticeOrdering {
        if a == b {
            return LatticeOrdering::Equal;
        }
        match a.height().cmp(&b.height()) {
            std::cmp::Ordering::Less => LatticeOrdering::Less,
            std::cmp::Ordering::Greater => LatticeOrdering::Greater,
            // Unflagged vs Flagged
            std::cmp::Ordering::Equal => LatticeOrdering::Incomparable,
        }
    }

    fn merge(&self, a: &PropertySetValue, b: &PropertySetValue) -> PropertySetValue {
        use PropertySetValue::*;
        match (*a, *b) {
            (x, y) if x == y => x,
            (NotApplicable, x) | (x, NotApplicable) => x,
            (Unknown, _) | (_, Unknown) => Unknown,
            _ => MaybeFlagged,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PropertySetValue::*;
    use super::*;
    use crate::features::lattice::laws::check_value_laws;

    const ALL: [PropertySetValue; 5] = [NotApplicable, Unflagged, Flagged, MaybeFlagged, Unknown];

    #[test]
    fn test_domain_satisfies_lattice_laws() {
        assert_eq!(check_value_laws(&PropertySetDomain, &ALL), Ok(()));
    }

    #[test]
    fn test_divergent_guard_states_merge_to_maybe() {
        let d = PropertySetDomain;
        assert_eq!(d.merge(&Flagged, &Unflagged), MaybeFlagged);
        assert_eq!(d.merge(&Flagged, &MaybeFlagged), MaybeFlagged);
        assert_eq!(d.merge(&NotApplicable, &Flagged), Flagged);
        assert_eq!(d.merge(&Unknown, &Unflagged), Unknown);
        assert_eq!(d.compare(&Flagged, &Unflagged), LatticeOrdering::Incomparable);
        assert_eq!(d.compare(&Flagged, &MaybeFlagged), LatticeOrdering::Less);
    }

    #[test]
    fn test_classification() {
        assert!(MaybeFlagged.is_hazardous());
        assert!(!Unflagged.is_hazardous());
        assert!(Unflagged.is_tracked());
        assert!(!Unknown.is_tracked());
        assert_eq!(MaybeFlagged.to_string(), "maybe_flagged");
    }
}
