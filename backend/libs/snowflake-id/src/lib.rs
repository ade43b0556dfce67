//! Snowflake ID Library
//!
//! Time-ordered 64-bit identifiers for the Pulse backend, minted without
//! cross-instance coordination. Every id embeds its creation instant, so the
//! id doubles as a sort key and as the routing key for time-partitioned
//! storage.
//!
//! **Layout** (63 usable bits, the sign bit stays zero):
//! - 41 bits: milliseconds since the service epoch (`2023-08-06T00:00:00Z`)
//! - 10 bits: machine discriminator (0..=1023)
//! - 12 bits: per-millisecond sequence
//!
//! Ids from one generator instance are strictly increasing. Ordering across
//! instances is only as precise as clock synchronization between hosts; a
//! deliberately weak guarantee, not a total order.

use chrono::{DateTime, Utc};
use std::sync::Mutex;
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

/// Service epoch: `2023-08-06T00:00:00Z` as unix milliseconds.
pub const EPOCH_MS: i64 = 1_691_280_000_000;

const TIMESTAMP_BITS: u32 = 41;
const MACHINE_BITS: u32 = 10;
const SEQUENCE_BITS: u32 = 12;

const MACHINE_SHIFT: u32 = SEQUENCE_BITS;
const TIMESTAMP_SHIFT: u32 = SEQUENCE_BITS + MACHINE_BITS;

const MAX_MACHINE_ID: u16 = (1 << MACHINE_BITS) - 1;
const SEQUENCE_MASK: i64 = (1 << SEQUENCE_BITS) - 1;
const MAX_TIMESTAMP: i64 = (1 << TIMESTAMP_BITS) - 1;

/// Error type for generator construction
#[derive(Debug, Error)]
pub enum SnowflakeError {
    #[error("machine id {0} out of range (0..={MAX_MACHINE_ID})")]
    MachineIdOutOfRange(u16),
}

struct GeneratorState {
    last_ms: i64,
    sequence: i64,
}

/// Allocator for time-ordered ids.
///
/// One instance per process; safe to share behind an `Arc` across request
/// handlers. Allocation is pure CPU work and never fails.
pub struct SnowflakeGenerator {
    machine_id: i64,
    state: Mutex<GeneratorState>,
}

impl SnowflakeGenerator {
    /// Create a generator with an explicit machine discriminator.
    ///
    /// Every concurrently running instance must be configured with a distinct
    /// machine id, otherwise uniqueness degrades to clock precision.
    pub fn new(machine_id: u16) -> Result<Self, SnowflakeError> {
        if machine_id > MAX_MACHINE_ID {
            return Err(SnowflakeError::MachineIdOutOfRange(machine_id));
        }
        Ok(Self {
            machine_id: i64::from(machine_id),
            state: Mutex::new(GeneratorState {
                last_ms: 0,
                sequence: 0,
            }),
        })
    }

    /// Allocate the next id. Strictly greater than every id previously
    /// returned by this instance.
    pub fn next_id(&self) -> i64 {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());

        let mut now = current_millis();
        // Hold the line if the clock stepped backwards; monotonicity wins
        // over wall-clock accuracy.
        if now < state.last_ms {
            now = state.last_ms;
        }

        if now == state.last_ms {
            state.sequence = (state.sequence + 1) & SEQUENCE_MASK;
            if state.sequence == 0 {
                // 4096 ids in one millisecond: spin to the next tick.
                while now <= state.last_ms {
                    now = current_millis();
                }
            }
        } else {
            state.sequence = 0;
        }
        state.last_ms = now;

        let elapsed = (now - EPOCH_MS) & MAX_TIMESTAMP;
        (elapsed << TIMESTAMP_SHIFT) | (self.machine_id << MACHINE_SHIFT) | state.sequence
    }
}

/// Milliseconds since the service epoch embedded in `id`.
pub fn millis_of(id: i64) -> i64 {
    id >> TIMESTAMP_SHIFT
}

/// Creation instant embedded in `id`, recovered losslessly at millisecond
/// resolution.
pub fn timestamp_of(id: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(EPOCH_MS + millis_of(id)).unwrap_or_default()
}

/// Time-partition key for `id` under a fixed-width window.
///
/// `bucket = floor(ms_since_epoch(id) / window_ms)`. The window is a
/// deployment-wide constant; changing it once data exists re-routes future
/// writes without migrating existing rows.
pub fn bucket_of(id: i64, window: std::time::Duration) -> i64 {
    millis_of(id) / window.as_millis() as i64
}

/// Bucket that an id allocated right now would land in.
pub fn current_bucket(window: std::time::Duration) -> i64 {
    (current_millis() - EPOCH_MS) / window.as_millis() as i64
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    const WINDOW_3H: Duration = Duration::from_secs(3 * 60 * 60);

    /// Build an id whose embedded timestamp is `ms` past the epoch.
    fn id_at(ms: i64) -> i64 {
        ms << TIMESTAMP_SHIFT
    }

    #[test]
    fn ids_are_strictly_increasing() {
        let gen = SnowflakeGenerator::new(1).unwrap();
        let mut prev = gen.next_id();
        for _ in 0..10_000 {
            let next = gen.next_id();
            assert!(next > prev, "{next} not greater than {prev}");
            prev = next;
        }
    }

    #[test]
    fn machine_id_out_of_range_is_rejected() {
        assert!(SnowflakeGenerator::new(1023).is_ok());
        assert!(matches!(
            SnowflakeGenerator::new(1024),
            Err(SnowflakeError::MachineIdOutOfRange(1024))
        ));
    }

    #[test]
    fn timestamp_roundtrips_through_the_id() {
        let gen = SnowflakeGenerator::new(7).unwrap();
        let before = Utc::now();
        let id = gen.next_id();
        let after = Utc::now();

        let embedded = timestamp_of(id);
        assert!(embedded >= before - chrono::Duration::milliseconds(2));
        assert!(embedded <= after + chrono::Duration::milliseconds(2));
    }

    #[test]
    fn distinct_machines_never_collide_within_a_millisecond() {
        let a = SnowflakeGenerator::new(1).unwrap();
        let b = SnowflakeGenerator::new(2).unwrap();
        let ids_a: Vec<i64> = (0..100).map(|_| a.next_id()).collect();
        let ids_b: Vec<i64> = (0..100).map(|_| b.next_id()).collect();
        for id in &ids_a {
            assert!(!ids_b.contains(id));
        }
    }

    #[test]
    fn bucket_is_constant_within_one_window() {
        // Window = 3h: epoch+1h and epoch+2h59m share bucket 0,
        // epoch+3h01m lands in bucket 1.
        let hour = 60 * 60 * 1000;
        assert_eq!(bucket_of(id_at(hour), WINDOW_3H), 0);
        assert_eq!(bucket_of(id_at(2 * hour + 59 * 60 * 1000), WINDOW_3H), 0);
        assert_eq!(bucket_of(id_at(3 * hour + 60 * 1000), WINDOW_3H), 1);
    }

    #[test]
    fn bucket_is_non_decreasing_in_time() {
        let mut prev = 0;
        for ms in (0..48 * 60 * 60 * 1000).step_by(17 * 60 * 1000) {
            let bucket = bucket_of(id_at(ms), WINDOW_3H);
            assert!(bucket >= prev);
            prev = bucket;
        }
    }

    #[test]
    fn current_bucket_matches_a_freshly_allocated_id() {
        let gen = SnowflakeGenerator::new(0).unwrap();
        let id = gen.next_id();
        let bucket = bucket_of(id, WINDOW_3H);
        assert_eq!(bucket, current_bucket(WINDOW_3H));
    }
}
