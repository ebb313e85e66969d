//! Footprint sinks and the two-way fan-out.
//!
//! A sink turns a [`FootprintSet`] into a persisted artifact. Sinks only
//! read the set, so any number of them can consume it concurrently.

use std::path::PathBuf;
use std::time::Instant;

use tracing::{info, warn};

use crate::build::FootprintSet;

/// Summary of one artifact written by a sink.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SinkReport {
    /// Sink name, e.g. `"raster"`.
    pub sink: &'static str,
    /// Where the artifact was written.
    pub path: PathBuf,
    /// Number of footprints written.
    pub features: usize,
    /// Artifact size on disk.
    pub bytes: u64,
}

/// A consumer of footprints producing one artifact.
pub trait FootprintSink: Sync {
    type Error: std::error::Error + Send;

    fn name(&self) -> &'static str;

    fn write(&self, footprints: &FootprintSet) -> Result<SinkReport, Self::Error>;
}

/// Run two sinks over the same footprints concurrently.
///
/// Both sinks always run to completion; the error of one never hides or
/// cancels the result of the other.
pub fn fan_out<A, B>(
    footprints: &FootprintSet,
    first: &A,
    second: &B,
) -> (Result<SinkReport, A::Error>, Result<SinkReport, B::Error>)
where
    A: FootprintSink,
    B: FootprintSink,
{
    rayon::join(
        || run_sink(first, footprints),
        || run_sink(second, footprints),
    )
}

fn run_sink<S: FootprintSink>(
    sink: &S,
    footprints: &FootprintSet,
) -> Result<SinkReport, S::Error> {
    let start = Instant::now();
    let result = sink.write(footprints);
    let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;

    match &result {
        Ok(report) => info!(
            sink = report.sink,
            path = %report.path.display(),
            features = report.features,
            bytes = report.bytes,
            elapsed_ms = elapsed_ms,
            "Sink finished"
        ),
        Err(e) => warn!(
            sink = sink.name(),
            error = %e,
            elapsed_ms = elapsed_ms,
            "Sink failed"
        ),
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Debug, thiserror::Error)]
    #[error("sink refused")]
    struct Refused;

    struct Counting {
        seen: AtomicUsize,
    }

    impl FootprintSink for Counting {
        type Error = Refused;

        fn name(&self) -> &'static str {
            "counting"
        }

        fn write(&self, footprints: &FootprintSet) -> Result<SinkReport, Refused> {
            self.seen.store(footprints.len(), Ordering::SeqCst);
            Ok(SinkReport {
                sink: "counting",
                path: PathBuf::from("/dev/null"),
                features: footprints.len(),
                bytes: 0,
            })
        }
    }

    struct Failing;

    impl FootprintSink for Failing {
        type Error = Refused;

        fn name(&self) -> &'static str {
            "failing"
        }

        fn write(&self, _: &FootprintSet) -> Result<SinkReport, Refused> {
            Err(Refused)
        }
    }

    #[test]
    fn test_failure_does_not_stop_other_sink() {
        let counting = Counting {
            seen: AtomicUsize::new(usize::MAX),
        };
        let set = FootprintSet::default();

        let (first, second) = fan_out(&set, &Failing, &counting);
        assert!(first.is_err());
        assert_eq!(second.unwrap().features, 0);
        assert_eq!(counting.seen.load(Ordering::SeqCst), 0);
    }
}
