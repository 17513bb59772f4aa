//! Property-based tests for domain invariants
//!
//! These tests use proptest to verify invariants across many random inputs.

use domain::{EmailAddress, Location, User, WeatherEntry, WeatherSnapshot};
use proptest::prelude::*;
use serde_json::json;

// ============================================================================
// Value Object Property Tests
// ============================================================================

mod value_object_tests {
    use super::*;

    proptest! {
        #[test]
        fn non_blank_location_kept_verbatim(s in "[A-Za-z ,]{0,12}[A-Za-z][A-Za-z ,]{0,12}") {
            let location = Location::new(s.clone()).unwrap();
            prop_assert_eq!(location.as_str(), s.as_str());
        }

        #[test]
        fn whitespace_location_rejected(s in "[ \t\n]{0,10}") {
            prop_assert!(Location::new(s).is_err());
        }

        #[test]
        fn email_is_trimmed(local in "[a-z]{1,10}", pad in "[ ]{0,3}") {
            let raw = format!("{pad}{local}@example.com{pad}");
            let email = EmailAddress::new(raw).unwrap();
            prop_assert_eq!(email.as_str(), format!("{local}@example.com"));
        }
    }
}

// ============================================================================
// Weather History Property Tests
// ============================================================================

mod history_tests {
    use super::*;

    proptest! {
        #[test]
        fn history_is_append_only(temps in prop::collection::vec(-40i64..50, 0..20)) {
            let mut user = User::register(Some("a@b.c"), Some("Oslo")).unwrap();
            let mut previous: Vec<WeatherEntry> = Vec::new();

            for temp in temps {
                let snapshot = WeatherSnapshot::from_value(json!({"main": {"temp": temp}})).unwrap();
                user.append_weather(WeatherEntry::new(snapshot));

                let history = user.weather_history();
                prop_assert_eq!(history.len(), previous.len() + 1);
                prop_assert_eq!(&history[..previous.len()], previous.as_slice());
                previous = history.to_vec();
            }
        }
    }
}
