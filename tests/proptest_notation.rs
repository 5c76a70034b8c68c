use prelosa::derive::{format_spacing, parse_spacing_code, render_bar_label};
use prelosa::text::{normalize_text, parse_notation, DiameterUnit};
use proptest::prelude::*;

mod proptest_helpers;

use proptest_helpers::{arb_raw_notation, arb_spacing};

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn spacing_code_roundtrip_is_stable(spacing in arb_spacing()) {
        let code = format_spacing(spacing);
        let reparsed = parse_spacing_code(&code).expect("formatted code parses");

        prop_assert_eq!(format_spacing(reparsed), code);
        prop_assert!((reparsed - spacing).abs() < 5e-4);
    }

    #[test]
    fn spacing_codes_are_short_for_whole_centimetre_tenths(tenths in 1u32..=9) {
        let spacing = tenths as f64 / 10.0;
        prop_assert_eq!(format_spacing(spacing), (tenths * 10).to_string());
    }

    #[test]
    fn raw_notations_parse_into_their_parts(
        (raw, count, caliber, digits) in arb_raw_notation(),
    ) {
        let normalized = normalize_text(&raw);
        prop_assert!(normalized.contains('∅'), "normalized: {}", normalized);
        prop_assert!(!normalized.contains('\\'), "normalized: {}", normalized);

        let parsed = parse_notation(&normalized);
        prop_assert_eq!(parsed.count, Some(count));
        prop_assert_eq!(parsed.diameter.as_deref(), Some(caliber));
        prop_assert_eq!(parsed.unit, Some(DiameterUnit::Inch));
        prop_assert_eq!(parsed.spacing_code.as_deref(), Some(digits.as_str()));
    }

    #[test]
    fn normalizing_a_parsed_notation_twice_changes_nothing(
        (raw, _count, _caliber, _digits) in arb_raw_notation(),
    ) {
        let once = normalize_text(&raw);
        prop_assert_eq!(normalize_text(&once), once);
    }

    #[test]
    fn rendered_labels_read_back(spacing in arb_spacing(), count in 1u32..=4) {
        // Labels use the typographic Ø; drawing text uses ∅.
        let label = render_bar_label(count, "3/8\"", spacing).replace('Ø', "∅");
        let parsed = parse_notation(&normalize_text(&label));

        prop_assert_eq!(parsed.count, Some(count));
        prop_assert_eq!(parsed.diameter.as_deref(), Some("3/8\""));
        let expected = parse_spacing_code(&format_spacing(spacing));
        prop_assert_eq!(parsed.spacing, expected);
    }
}
