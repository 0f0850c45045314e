use anyhow::Result;
use marksheet::{DigitClassifier, DigitTensor, RegionKind, StudentRecord, Subpart};

#[test]
fn region_kinds_parse_from_detector_class_names() {
    assert_eq!(RegionKind::parse("usn"), Some(RegionKind::Usn));
    assert_eq!(RegionKind::parse("totalMarks"), Some(RegionKind::TotalMarks));
    assert_eq!(
        RegionKind::parse("3b"),
        Some(RegionKind::Question {
            number: 3,
            subpart: Subpart::B
        })
    );
    assert_eq!(
        RegionKind::parse("10e"),
        Some(RegionKind::Question {
            number: 10,
            subpart: Subpart::E
        })
    );

    assert_eq!(RegionKind::parse(""), None);
    assert_eq!(RegionKind::parse("sem"), None);
    assert_eq!(RegionKind::parse("1f"), None);
    assert_eq!(RegionKind::parse("0a"), None);
    assert_eq!(RegionKind::parse("11a"), None);
    assert_eq!(RegionKind::parse("x2"), None);
}

#[test]
fn new_record_holds_all_fifty_empty_leaves() {
    let record = StudentRecord::new();

    assert_eq!(record.usn, "");
    assert_eq!(record.total_marks, "");
    assert_eq!(record.questions.len(), 10);
    for number in 1..=10 {
        let subparts = &record.questions[&format!("q{number}")];
        assert_eq!(subparts.len(), 5);
        assert!(subparts.values().all(String::is_empty));
    }
}

#[test]
fn applied_values_land_on_the_right_leaf() {
    let mut record = StudentRecord::new();

    record.apply(
        RegionKind::Question {
            number: 4,
            subpart: Subpart::D,
        },
        "6",
    );
    record.apply(RegionKind::Usn, "421034");
    record.apply(RegionKind::TotalMarks, "42");

    assert_eq!(record.questions["q4"]["d"], "6");
    assert_eq!(record.usn, "421034");
    assert_eq!(record.total_marks, "42");
}

#[test]
fn reconciliation_sums_numeric_leaves_only() {
    let mut record = StudentRecord::new();
    record.apply(
        RegionKind::Question {
            number: 1,
            subpart: Subpart::A,
        },
        "3",
    );
    record.apply(
        RegionKind::Question {
            number: 2,
            subpart: Subpart::C,
        },
        "5",
    );
    // a leaf that does not parse as a number contributes nothing
    record.apply(
        RegionKind::Question {
            number: 3,
            subpart: Subpart::A,
        },
        "?",
    );

    record.reconcile_total_marks();
    assert_eq!(record.total_marks, "8");
}

#[test]
fn reconciliation_never_overrides_a_classified_total() {
    let mut record = StudentRecord::new();
    record.apply(RegionKind::TotalMarks, "7");
    record.apply(
        RegionKind::Question {
            number: 1,
            subpart: Subpart::A,
        },
        "9",
    );

    record.reconcile_total_marks();
    assert_eq!(record.total_marks, "7");
}

struct EqualScores;

impl DigitClassifier for EqualScores {
    fn classify(&self, _tensor: &DigitTensor) -> Result<[f32; 10]> {
        Ok([0.1; 10])
    }
}

#[test]
fn prediction_ties_resolve_to_the_lowest_digit() -> Result<()> {
    let digit = marksheet::inference::predict_digit(&EqualScores, &DigitTensor::zeros())?;
    assert_eq!(digit, '0');
    Ok(())
}
