//! Property tests for the quantified invariants in the core
//! specification's §8.

use ifc_step::IfcStepFile;
use proptest::prelude::*;

/// Generates a syntactically well-formed instance line:
/// `#<id>=<TYPE>(<n reals>);\n`.
fn instance_line(id: u32, type_name: &str, arity: usize) -> String {
    let args = (0..arity).map(|i| format!("{}.0", i + 1)).collect::<Vec<_>>().join(",");
    format!("#{id}={type_name}({args});\n")
}

fn type_name_strategy() -> impl Strategy<Value = String> {
    prop_oneof![Just("IFCWALL".to_string()), Just("IFCSLAB".to_string()), Just("IFCPROJECT".to_string())]
}

proptest! {
    /// Invariant 1: `num_lines()` equals the count of STEP instance
    /// lines (`;`-terminated lines starting with `#`).
    #[test]
    fn num_lines_matches_the_count_of_instance_lines(
        specs in prop::collection::vec((1u32..200, type_name_strategy(), 0usize..4), 1..40)
    ) {
        let mut src = String::new();
        for (i, (id, ty, arity)) in specs.iter().enumerate() {
            src.push_str(&instance_line(*id, ty, *arity));
            if i % 5 == 0 {
                src.push_str("NOTE_NOT_AN_INSTANCE_LINE;\n");
            }
        }

        let mut file = IfcStepFile::new();
        file.load(src.as_bytes());

        prop_assert_eq!(file.num_lines(), specs.len() + src.matches("NOTE_NOT_AN_INSTANCE_LINE").count());
    }

    /// Invariant 2: for every line record `l`,
    /// `express_id_to_line_id(l.express_id) == l.line_index` — true for
    /// the *last* line claiming a given express-id, since a later
    /// assignment overwrites the index (spec §8, concrete scenario).
    #[test]
    fn express_id_to_line_id_points_at_the_last_claimant(
        specs in prop::collection::vec((1u32..50, type_name_strategy(), 0usize..3), 1..30)
    ) {
        let mut src = String::new();
        for (id, ty, arity) in &specs {
            src.push_str(&instance_line(*id, ty, *arity));
        }

        let mut file = IfcStepFile::new();
        file.load(src.as_bytes());

        let mut last_line_for_id = std::collections::HashMap::new();
        for line in file.lines() {
            if line.express_id != 0 {
                last_line_for_id.insert(line.express_id, line.line_index);
            }
        }
        for (&id, &line_index) in &last_line_for_id {
            prop_assert_eq!(file.express_id_to_line_id(id), line_index);
            prop_assert_eq!(file.line(line_index).express_id, id);
        }
    }

    /// Invariant 3: `line_ids_with_type(t)` is in strictly increasing
    /// order and each entry's line truly has fingerprint `t`.
    #[test]
    fn line_ids_with_type_are_increasing_and_correctly_typed(
        specs in prop::collection::vec((1u32..200, type_name_strategy(), 0usize..3), 1..40)
    ) {
        let mut src = String::new();
        for (id, ty, arity) in &specs {
            src.push_str(&instance_line(*id, ty, *arity));
        }

        let mut file = IfcStepFile::new();
        file.load(src.as_bytes());

        for ty in ["IFCWALL", "IFCSLAB", "IFCPROJECT"] {
            let fingerprint = ifc_step::crc32(ty.as_bytes());
            let ids = file.line_ids_with_type(fingerprint);
            for w in ids.windows(2) {
                prop_assert!(w[0] < w[1]);
            }
            for &line_id in ids {
                prop_assert_eq!(file.line(line_id).ifc_type, fingerprint);
            }
        }
    }
}
