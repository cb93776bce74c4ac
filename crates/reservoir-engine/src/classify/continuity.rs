use serde::{Deserialize, Serialize};

/// How far a candidate question number may jump from the previous one.
///
/// Used by live extraction (loose) and by answer stripping (strict). Both
/// values are plain configuration; callers pick or override them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Continuity {
    /// Largest accepted increase over the previous number.
    pub max_gap: u32,
    /// Numbers at or above this are rejected (years, page counts), subject to
    /// [`Continuity::ceiling_scope`].
    pub ceiling: u32,
    #[serde(default)]
    pub ceiling_scope: CeilingScope,
}

/// Which candidates the ceiling is checked against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CeilingScope {
    /// Every candidate number.
    #[default]
    Always,
    /// Only the first question of a document; later numbers are bounded by
    /// the gap alone.
    FirstOnly,
}

impl Continuity {
    /// Live extraction: gaps below 20, numbers below 500.
    pub const LIVE: Continuity = Continuity {
        max_gap: 19,
        ceiling: 500,
        ceiling_scope: CeilingScope::Always,
    };

    /// Answer stripping: gaps of at most 2, first number below 200.
    pub const STRICT: Continuity = Continuity {
        max_gap: 2,
        ceiling: 200,
        ceiling_scope: CeilingScope::FirstOnly,
    };

    /// Whether `found` may start a new question after `previous`.
    ///
    /// `previous == 0` means no question has been seen yet, in which case any
    /// number under the ceiling is accepted. Zero itself is never a question
    /// number.
    pub fn accepts(&self, previous: u32, found: u32) -> bool {
        if found == 0 {
            return false;
        }
        let capped = previous == 0 || self.ceiling_scope == CeilingScope::Always;
        if capped && found >= self.ceiling {
            return false;
        }
        if previous == 0 {
            return true;
        }
        found > previous && found - previous <= self.max_gap.max(1)
    }
}

impl Default for Continuity {
    fn default() -> Self {
        Self::LIVE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5, 6, true)]
    #[case(5, 7, true)]
    #[case(5, 24, true)]
    #[case(5, 25, false)]
    #[case(5, 40, false)]
    #[case(5, 5, false)]
    #[case(5, 4, false)]
    #[case(0, 1, true)]
    #[case(0, 37, true)]
    #[case(0, 2016, false)]
    #[case(480, 499, true)]
    #[case(490, 500, false)]
    #[case(0, 0, false)]
    fn live_bound(#[case] previous: u32, #[case] found: u32, #[case] accepted: bool) {
        assert_eq!(Continuity::LIVE.accepts(previous, found), accepted);
    }

    #[test]
    fn live_bound_accepts_whole_window() {
        for found in 6..=24 {
            assert!(Continuity::LIVE.accepts(5, found), "{found} should be accepted");
        }
        for found in 25..=60 {
            assert!(!Continuity::LIVE.accepts(5, found), "{found} should be rejected");
        }
    }

    #[rstest]
    #[case(10, 11, true)]
    #[case(10, 12, true)]
    #[case(10, 13, false)]
    #[case(0, 150, true)]
    #[case(0, 200, false)]
    #[case(199, 200, true)]
    #[case(200, 202, true)]
    #[case(250, 253, false)]
    fn strict_bound(#[case] previous: u32, #[case] found: u32, #[case] accepted: bool) {
        assert_eq!(Continuity::STRICT.accepts(previous, found), accepted);
    }

    #[test]
    fn zero_gap_still_accepts_successor() {
        let c = Continuity {
            max_gap: 0,
            ceiling: 100,
            ceiling_scope: CeilingScope::Always,
        };
        assert!(c.accepts(3, 4));
        assert!(!c.accepts(3, 5));
    }

    #[test]
    fn scope_defaults_to_always() {
        let c: Continuity = serde_json::from_str(r#"{"max_gap": 3, "ceiling": 50}"#).unwrap();
        assert_eq!(c.ceiling_scope, CeilingScope::Always);
        let c: Continuity =
            serde_json::from_str(r#"{"max_gap": 2, "ceiling": 200, "ceiling_scope": "first_only"}"#)
                .unwrap();
        assert_eq!(c, Continuity::STRICT);
    }
}
