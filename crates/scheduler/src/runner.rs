//! Per-channel source execution

use contracts::Source;
use tracing::trace;

use crate::buffer::BatchBuffer;

/// Poll every ready source once and buffer what it produces
///
/// Sources run in list order. Returns the number of records pushed; a
/// channel only attempts a transmission when this is non-zero.
pub fn run_sources(sources: &mut [Box<dyn Source>], buffer: &mut BatchBuffer) -> usize {
    let mut pushed = 0;

    for source in sources.iter_mut() {
        if !source.check_ready() {
            continue;
        }

        let records = source.produce();
        trace!(kind = source.kind(), records = records.len(), "source polled");

        pushed += records.len();
        for record in records {
            buffer.push(record);
        }
    }

    pushed
}
