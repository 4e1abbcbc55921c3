//! Edge compatibility rules between neighbouring tiles.

use crate::feature::FeatureFlags;

/// Check whether a candidate edge may touch an already placed edge.
///
/// Rules are evaluated for every flag present on the existing edge:
/// - an empty edge on either side never matches
/// - `CITY` needs `CITY`
/// - `ROAD` and `ROAD_INTERSECTION` need any road flag
/// - `ROAD_END` needs any road flag or `CITY` (a road may stop at a city wall)
///
/// `CITY` on the existing side still needs `CITY`, so a road end may be laid
/// against a city wall but a city may not be laid against a road end.
/// - `MONASTERY` needs `MONASTERY`, `FIELD` needs `FIELD`
/// - `SHIELD` never rejects
///
/// Centers are accepted for intersection continuity checks but do not
/// currently restrict anything.
pub fn compatible(
    existing_edge: FeatureFlags,
    candidate_edge: FeatureFlags,
    _candidate_center: FeatureFlags,
    _existing_center: FeatureFlags,
) -> bool {
    if existing_edge.is_empty() || candidate_edge.is_empty() {
        return false;
    }

    existing_edge
        .iter()
        .all(|flag| flag_satisfied(flag, candidate_edge))
}

/// What the candidate edge must carry for a single existing flag
fn flag_satisfied(existing: FeatureFlags, candidate: FeatureFlags) -> bool {
    let required = if existing == FeatureFlags::CITY {
        FeatureFlags::CITY
    } else if existing == FeatureFlags::ROAD || existing == FeatureFlags::ROAD_INTERSECTION {
        FeatureFlags::ROAD_FAMILY
    } else if existing == FeatureFlags::ROAD_END {
        FeatureFlags::ROAD_FAMILY | FeatureFlags::CITY
    } else if existing == FeatureFlags::MONASTERY {
        FeatureFlags::MONASTERY
    } else if existing == FeatureFlags::FIELD {
        FeatureFlags::FIELD
    } else {
        return true;
    };
    candidate.intersects(required)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn edges(existing: FeatureFlags, candidate: FeatureFlags) -> bool {
        compatible(existing, candidate, FeatureFlags::FIELD, FeatureFlags::FIELD)
    }

    #[test]
    fn test_empty_edges_never_match() {
        assert!(!edges(FeatureFlags::empty(), FeatureFlags::FIELD));
        assert!(!edges(FeatureFlags::FIELD, FeatureFlags::empty()));
        assert!(!edges(FeatureFlags::empty(), FeatureFlags::empty()));
    }

    #[test]
    fn test_city_needs_city() {
        assert!(edges(FeatureFlags::CITY, FeatureFlags::CITY));
        assert!(edges(FeatureFlags::CITY, FeatureFlags::CITY | FeatureFlags::SHIELD));
        assert!(!edges(FeatureFlags::CITY, FeatureFlags::FIELD));
        assert!(!edges(FeatureFlags::CITY, FeatureFlags::ROAD));
    }

    #[test]
    fn test_road_family_connects() {
        for existing in [
            FeatureFlags::ROAD,
            FeatureFlags::ROAD_INTERSECTION,
            FeatureFlags::ROAD | FeatureFlags::ROAD_END,
        ] {
            for candidate in [
                FeatureFlags::ROAD,
                FeatureFlags::ROAD_INTERSECTION,
                FeatureFlags::ROAD | FeatureFlags::ROAD_END,
            ] {
                assert!(edges(existing, candidate), "{existing:?} vs {candidate:?}");
            }
            assert!(!edges(existing, FeatureFlags::FIELD));
        }
    }

    #[test]
    fn test_road_end_may_meet_city_from_its_side_only() {
        assert!(edges(FeatureFlags::ROAD_END, FeatureFlags::CITY));
        assert!(!edges(FeatureFlags::CITY, FeatureFlags::ROAD_END));
    }

    #[test]
    fn test_bare_road_ends_connect() {
        assert!(edges(FeatureFlags::ROAD_END, FeatureFlags::ROAD_END));
        assert!(edges(FeatureFlags::ROAD_END, FeatureFlags::ROAD_INTERSECTION));
        assert!(edges(FeatureFlags::ROAD_INTERSECTION, FeatureFlags::ROAD_END));
        assert!(!edges(FeatureFlags::ROAD_END, FeatureFlags::FIELD));
    }

    #[test]
    fn test_field_and_monastery() {
        assert!(edges(FeatureFlags::FIELD, FeatureFlags::FIELD));
        assert!(!edges(FeatureFlags::FIELD, FeatureFlags::CITY));
        assert!(edges(FeatureFlags::MONASTERY, FeatureFlags::MONASTERY));
        assert!(!edges(FeatureFlags::MONASTERY, FeatureFlags::FIELD));
    }

    #[test]
    fn test_shield_alone_does_not_block() {
        assert!(edges(FeatureFlags::SHIELD, FeatureFlags::FIELD));
        assert!(edges(FeatureFlags::CITY | FeatureFlags::SHIELD, FeatureFlags::CITY));
    }

    #[test]
    fn test_intersection_center_is_permissive() {
        assert!(compatible(
            FeatureFlags::ROAD,
            FeatureFlags::ROAD,
            FeatureFlags::ROAD_INTERSECTION,
            FeatureFlags::ROAD_INTERSECTION,
        ));
    }
}
