//! Shared test utilities for `algoscope-core`.

use algoscope_test_support::proptest_profile::ProptestRunProfile;
use proptest::test_runner::Config as ProptestConfig;

/// Builds the proptest configuration shared by every property suite.
#[must_use]
pub(crate) fn suite_proptest_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases);
    ProptestConfig {
        cases: profile.cases(),
        ..ProptestConfig::default()
    }
}

/// Stack size for tests that must not recurse once per tree level.
const SHALLOW_STACK_BYTES: usize = 128 * 1024;

/// Runs `work` on a thread with a deliberately small stack and returns its
/// result.
pub(crate) fn on_shallow_stack<T, F>(work: F) -> T
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    std::thread::Builder::new()
        .name("shallow-stack".into())
        .stack_size(SHALLOW_STACK_BYTES)
        .spawn(work)
        .expect("spawn shallow-stack thread")
        .join()
        .expect("shallow-stack work completes")
}

/// Ascending values `0..len`, which BST insertion turns into a right spine.
pub(crate) fn ascending_chain(len: i64) -> crate::tree::Tree {
    let mut tree = crate::tree::Tree::new();
    for value in 0..len {
        tree.insert_bst(value).expect("ascending values are unique");
    }
    tree
}
