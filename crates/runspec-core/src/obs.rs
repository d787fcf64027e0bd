//! Structured observability hooks for run-spec compilation.
//!
//! - `CompileSpan`: RAII guard scoping every event of one compilation
//! - emit functions for start, per-axis expansion, finish, and failure
//!
//! Events are emitted at `info!` level; failures at `warn!`.

use tracing::info;

/// RAII guard that enters a compilation-scoped tracing span.
///
/// ```ignore
/// let _span = CompileSpan::enter("mmlu");
/// // events below carry family = "mmlu"
/// ```
pub struct CompileSpan {
    _span: tracing::span::EnteredSpan,
}

impl CompileSpan {
    pub fn enter(family: &str) -> Self {
        let span = tracing::info_span!("runspec.compile", family = %family);
        Self {
            _span: span.entered(),
        }
    }
}

/// Emit event: compilation started.
pub fn emit_compile_started(family: &str, num_args: usize, num_expanders: usize) {
    info!(
        event = "compile.started",
        family = %family,
        num_args = num_args,
        num_expanders = num_expanders,
    );
}

/// Emit event: one expansion axis applied to the current run list.
pub fn emit_expansion_applied(key: &str, declared: &str, before: usize, after: usize) {
    info!(
        event = "compile.expansion_applied",
        key = %key,
        declared = %declared,
        before = before,
        after = after,
    );
}

/// Emit event: compilation produced `num_run_specs` run specs.
pub fn emit_compile_finished(family: &str, num_run_specs: usize, duration_us: u64) {
    info!(
        event = "compile.finished",
        family = %family,
        num_run_specs = num_run_specs,
        duration_us = duration_us,
    );
}

/// Emit event: compilation failed (warning level).
pub fn emit_compile_failed(family: &str, error: &dyn std::fmt::Display) {
    tracing::warn!(event = "compile.failed", family = %family, error = %error);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_span_enter() {
        let _span = CompileSpan::enter("simple1");
    }
}
