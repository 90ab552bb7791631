//! Dual-stream interleaver for battle mode.
//!
//! DESIGN
//! ======
//! Both snapshot streams are fused and polled concurrently each round, so
//! both upstream requests dispatch before either side's first byte is
//! awaited and neither side blocks the other's progress. Values are
//! cumulative snapshots, which is what makes holding an exhausted side's
//! last value correct: it already contains everything that side produced.

use futures::{Stream, StreamExt, join, pin_mut};

/// Interleave two snapshot streams into synchronized `(a, b)` pairs.
///
/// Each round advances both sides; a side that has ended keeps its last
/// value without being re-polled for work. One pair is emitted per round
/// in which at least one side advanced; the round in which both report
/// exhaustion emits nothing and ends the sequence.
pub fn interleave<A, B>(side_a: A, side_b: B) -> impl Stream<Item = (String, String)>
where
    A: Stream<Item = String>,
    B: Stream<Item = String>,
{
    async_stream::stream! {
        let side_a = side_a.fuse();
        let side_b = side_b.fuse();
        pin_mut!(side_a, side_b);

        let mut last_a = String::new();
        let mut last_b = String::new();

        loop {
            let (next_a, next_b) = join!(side_a.next(), side_b.next());
            let a_done = next_a.is_none();
            let b_done = next_b.is_none();
            if let Some(value) = next_a {
                last_a = value;
            }
            if let Some(value) = next_b {
                last_b = value;
            }
            if a_done && b_done {
                break;
            }
            yield (last_a.clone(), last_b.clone());
        }
    }
}

#[cfg(test)]
#[path = "battle_test.rs"]
mod tests;
