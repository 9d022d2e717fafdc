//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! test fixtures. Each test:
//! 1. Reads ops.csv (and events.csv when present) from a fixture directory
//! 2. Replays all operations through the ledger
//! 3. Generates summary CSV output
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Recipient resolution (handles, email, phone normalization)
//! - Rejections (insufficient funds, self transfer, unknown recipient)
//! - Idempotent provider crediting (inline and via an events file)
//! - Malformed input rows

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use std::fs;
    use std::path::Path;
    use wallet_ledger::replay::{self, IngestConfig};
    use wallet_ledger::SUMMARY_WINDOW;

    /// Run a test fixture by replaying ops.csv and comparing with expected.csv
    ///
    /// This helper function:
    /// 1. Reads ops.csv from tests/fixtures/{fixture_name}/
    /// 2. Picks up events.csv from the same directory when present
    /// 3. Replays everything through `replay::run`
    /// 4. Compares the summary output with expected.csv
    ///
    /// # Arguments
    ///
    /// * `fixture_name` - Name of the fixture directory (e.g., "happy_path")
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Input or expected files cannot be read
    /// - Output doesn't match expected
    fn run_test_fixture(fixture_name: &str) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let ops_path = format!("{}/ops.csv", fixture_dir);
        let events_path = format!("{}/events.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&ops_path).exists(),
            "Ops file not found: {}",
            ops_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let events = Path::new(&events_path)
            .exists()
            .then(|| Path::new(&events_path).to_path_buf());

        let mut output = Vec::new();
        replay::run(
            Path::new(&ops_path),
            events.as_deref(),
            &IngestConfig::default(),
            SUMMARY_WINDOW,
            &mut output,
        )
        .unwrap_or_else(|e| panic!("Failed to replay fixture {}: {}", fixture_name, e));

        let actual_output =
            String::from_utf8(output).expect("Summary output was not valid UTF-8");
        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {}\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures
    #[rstest]
    #[case("happy_path")]
    #[case("transfer_chain")]
    #[case("recipient_not_found")]
    #[case("insufficient_funds")]
    #[case("self_transfer")]
    #[case("raw_recipient")]
    #[case("phone_resolution")]
    #[case("duplicate_provider_credits")]
    #[case("provider_events")]
    #[case("malformed_data")]
    fn test_fixtures(#[case] fixture: &str) {
        run_test_fixture(fixture);
    }
}
