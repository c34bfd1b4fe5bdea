pub mod ai;

// ============================================================================
// Profiling Macros
// ============================================================================

/// Conditionally log messages every 100 iterations when the perf_stats feature is enabled.
///
/// Meant for long-running loops (A* expansions, builder passes) where logging
/// every iteration would drown the output. When the perf_stats feature is
/// disabled this expands to nothing and the arguments are never evaluated.
///
/// # Example
/// ```ignore
/// profile_log!(explored, "[ASTAR] {} nodes explored, open set {}", explored, open.len());
/// ```
#[macro_export]
#[cfg(feature = "perf_stats")]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {
        if $counter % 100 == 0 {
            bevy::prelude::debug!($($arg)*);
        }
    };
}

#[macro_export]
#[cfg(not(feature = "perf_stats"))]
macro_rules! profile_log {
    ($counter:expr, $($arg:tt)*) => {};
}
