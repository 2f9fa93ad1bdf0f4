//! Runtime-wide tunables, read once from the environment when a
//! [`crate::virtual_dom::VirtualDom`] is constructed.

use std::env;

const DEFAULT_FASTLANE_THRESHOLD: usize = 100;
const DEFAULT_BULK_TEXT_THRESHOLD: usize = 10;
const DEFAULT_UPDATE_DEPTH_LIMIT: u32 = 100;

/// Tunables that shape scheduling and commit behavior without changing
/// program semantics. All of these have conservative, spec-mandated
/// defaults; overriding them is for benchmarking and stress tests, not
/// day-to-day app code.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Minimum number of items in a keyed list diff before the fast-lane is
    /// considered at all. Below this size the general reconciler's
    /// bookkeeping overhead is already negligible.
    pub fastlane_threshold: usize,
    /// Minimum number of text-only children a fast-lane batch must touch
    /// before the bulk text-update path engages instead of per-node edits.
    pub bulk_text_threshold: usize,
    /// Maximum number of times a single component may be re-rendered within
    /// one flush before the scheduler aborts with
    /// [`crate::error::CoreError::UpdateDepthExceeded`].
    pub update_depth_limit: u32,
    /// Enables additional debug-only invariant checks (hook-order
    /// recording, render-time write detection) at a performance cost.
    /// Defaults to `cfg!(debug_assertions)`.
    pub dev_mode: bool,
    /// Server-side rendering mode. `false` for every ordinary client mount;
    /// `weave-ssr` sets this on the config it builds its renderer's
    /// `VirtualDom` with.
    /// A resource created while this is set resolves synchronously or not
    /// at all: see [`crate::resource::ResourceCell::new`].
    pub ssr: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fastlane_threshold: DEFAULT_FASTLANE_THRESHOLD,
            bulk_text_threshold: DEFAULT_BULK_TEXT_THRESHOLD,
            update_depth_limit: DEFAULT_UPDATE_DEPTH_LIMIT,
            dev_mode: cfg!(debug_assertions),
            ssr: false,
        }
    }
}

impl RuntimeConfig {
    /// Builds a configuration from `WEAVE_*` environment variables, falling
    /// back to defaults for anything unset or unparsable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(v) = parse_env("WEAVE_FASTLANE_THRESHOLD") {
            config.fastlane_threshold = v;
        }
        if let Some(v) = parse_env("WEAVE_BULK_TEXT_THRESHOLD") {
            config.bulk_text_threshold = v;
        }
        if let Some(v) = parse_env("WEAVE_UPDATE_DEPTH_LIMIT") {
            config.update_depth_limit = v;
        }
        match env::var("WEAVE_DEV_MODE") {
            Ok(v) => config.dev_mode = v != "0" && !v.eq_ignore_ascii_case("false"),
            Err(_) => {}
        }

        config
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.parse().ok())
}
