//! Vigil Watch
//!
//! Drives the monitoring API until a set of expected jobs or files has
//! reached a label, or a retry budget runs out.
//!
//! Architecture:
//! - Source: where filtered entities come from (`Session` over the HTTP client)
//! - Clock: how the loop waits between polls (`TokioClock` in production)
//! - Convergence: the POLLING → CONVERGED / TIMED_OUT / FAILED state machine
//!
//! Everything runs sequentially on the calling task.

pub mod clock;
pub mod convergence;
pub mod error;
pub mod source;

pub use clock::{Clock, TokioClock};
pub use convergence::{
    ConvergenceLoop, ConvergenceState, Outcome, PollReport, ProgressSink, RetryPolicy,
    SilentProgress,
};
pub use error::WatchError;
pub use source::{EventSource, Session};
