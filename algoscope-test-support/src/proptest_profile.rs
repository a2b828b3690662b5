//! Environment-driven case counts for the property suites.
//!
//! Every suite reads the same variable so CI can scale all of them at once.

use std::env;

/// Environment variable overriding the number of proptest cases.
pub const PBT_CASES_ENV_KEY: &str = "ALGOSCOPE_PBT_CASES";

/// Case budget resolved for one property suite.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProptestRunProfile {
    cases: u32,
}

impl ProptestRunProfile {
    /// Reads [`PBT_CASES_ENV_KEY`], falling back to `default_cases` when it is
    /// unset or invalid.
    ///
    /// # Examples
    /// ```
    /// use algoscope_test_support::proptest_profile::ProptestRunProfile;
    ///
    /// let profile = ProptestRunProfile::load(64);
    /// assert!(profile.cases() > 0);
    /// ```
    #[must_use]
    pub fn load(default_cases: u32) -> Self {
        let cases = match env::var(PBT_CASES_ENV_KEY) {
            Ok(raw) => parse_cases(&raw).unwrap_or_else(|reason| {
                tracing::warn!(
                    env = PBT_CASES_ENV_KEY,
                    raw = %raw,
                    reason = %reason,
                    "invalid property-test case override; using default",
                );
                default_cases
            }),
            Err(_) => default_cases,
        };
        Self { cases }
    }

    /// Number of cases to run per property.
    #[must_use]
    pub fn cases(&self) -> u32 {
        self.cases
    }
}

fn parse_cases(raw: &str) -> Result<u32, String> {
    let parsed = raw
        .trim()
        .parse::<u32>()
        .map_err(|error| format!("parse error: {error}"))?;
    if parsed == 0 {
        return Err("cases must be > 0".to_owned());
    }
    Ok(parsed)
}
