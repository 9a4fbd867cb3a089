// This file is part of Catchlog.
//
// Copyright (C) 2025 Matheus Cardoso <varvedb@matheus.sbs>
//
// This Source Code Form is subject to the terms of the Mozilla Public License
// v. 2.0. If a copy of the MPL was not distributed with this file, You can
// obtain one at http://mozilla.org/MPL/2.0/.

//! Utility macros for Catchlog.

/// Times the execution of a block and emits the elapsed duration as a `trace` event.
///
/// In **debug builds** (`debug_assertions` enabled), this macro records the start time,
/// executes the block, then emits `tracing::trace!` with the label and elapsed time
/// before returning the block's result.
///
/// In **release builds**, the timing is completely eliminated and only the block executes.
///
/// # Examples
///
/// ```ignore
/// use catchlog::timed_trace;
///
/// let rows = timed_trace!("query", {
///     expensive_scan()
/// });
/// ```
#[macro_export]
#[cfg(debug_assertions)]
macro_rules! timed_trace {
    ($label:expr, $block:expr) => {{
        let __timed_start = ::std::time::Instant::now();
        let __timed_result = $block;
        ::tracing::trace!(
            op = %$label,
            elapsed = ?__timed_start.elapsed(),
            "timed"
        );
        __timed_result
    }};
}

#[macro_export]
#[cfg(not(debug_assertions))]
macro_rules! timed_trace {
    ($label:expr, $block:expr) => {
        $block
    };
}
