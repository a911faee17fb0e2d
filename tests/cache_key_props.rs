//! Property tests for cache key derivation

use chrono::{DateTime, NaiveDateTime};
use proptest::prelude::*;

use journey_search::cache::derive_key;
use journey_search::models::SearchInput;

const NAMESPACE: &str = "test";

// Czech letters with diacritics and their plain counterparts
const ACCENTS: [(char, char); 9] = [
    ('á', 'a'),
    ('č', 'c'),
    ('ř', 'r'),
    ('ě', 'e'),
    ('í', 'i'),
    ('ž', 'z'),
    ('š', 's'),
    ('ů', 'u'),
    ('ý', 'y'),
];

fn departure() -> impl Strategy<Value = NaiveDateTime> {
    // 2000-01-01 .. 2100-01-01, whole seconds or with a fraction
    (946_684_800i64..4_102_444_800i64, prop_oneof![Just(0u32), 0u32..1_000_000_000])
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap().naive_utc())
}

fn strip_accents(name: &str) -> String {
    name.chars()
        .map(|c| {
            ACCENTS
                .iter()
                .find(|(accented, _)| *accented == c)
                .map_or(c, |(_, plain)| *plain)
        })
        .collect()
}

// Lowercase ASCII letters mixed with the accented ones, at least one letter
fn accented_name() -> impl Strategy<Value = String> {
    let letters: Vec<char> = ('a'..='z').chain(ACCENTS.iter().map(|(accented, _)| *accented)).collect();
    prop::collection::vec(prop::sample::select(letters), 1..16).prop_map(|chars| chars.into_iter().collect())
}

proptest! {
    #[test]
    fn equal_inputs_give_equal_keys(
        origin in "\\PC{0,30}",
        destination in "\\PC{0,30}",
        departure in departure(),
    ) {
        let input = SearchInput::new(origin.clone(), destination.clone(), departure);
        let same = SearchInput::new(origin, destination, departure);

        prop_assert_eq!(derive_key(NAMESPACE, &input), derive_key(NAMESPACE, &input));
        prop_assert_eq!(derive_key(NAMESPACE, &input), derive_key(NAMESPACE, &same));
    }

    #[test]
    fn case_does_not_change_the_key(
        origin in "[a-z]{1,12}( [a-z]{1,12})?",
        destination in "[a-z]{1,12}",
        departure in departure(),
    ) {
        let lower = SearchInput::new(origin.clone(), destination.clone(), departure);
        let upper = SearchInput::new(origin.to_uppercase(), destination.to_uppercase(), departure);

        prop_assert_eq!(derive_key(NAMESPACE, &lower), derive_key(NAMESPACE, &upper));
    }

    #[test]
    fn diacritics_do_not_change_the_key(
        origin in accented_name(),
        destination in accented_name(),
        departure in departure(),
    ) {
        let accented = SearchInput::new(origin.clone(), destination.clone(), departure);
        let plain = SearchInput::new(strip_accents(&origin), strip_accents(&destination), departure);

        prop_assert_eq!(derive_key(NAMESPACE, &accented), derive_key(NAMESPACE, &plain));
    }

    #[test]
    fn different_departures_give_different_keys(
        first in departure(),
        second in departure(),
    ) {
        prop_assume!(first != second);
        let a = SearchInput::new("Prague", "Brno", first);
        let b = SearchInput::new("Prague", "Brno", second);

        prop_assert_ne!(derive_key(NAMESPACE, &a), derive_key(NAMESPACE, &b));
    }
}
