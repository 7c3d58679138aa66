//! End-to-end transactions against the scripted mock line.
//!
//! These cover the whole driver stack — handshake, bit sampling, frame
//! assembly, checksum — with the timing the sensor actually produces,
//! played on a virtual clock.

use std::sync::Arc;
use std::thread;

use embedded_hal::digital::PinState;
use roomsense::config::SensorTiming;
use roomsense::error::SensorError;
use roomsense::sensors::line::Direction;
use roomsense::sensors::Dht11;

use crate::mock_line::{LineOp, MockLine};

fn dht(line: &MockLine) -> Dht11<MockLine> {
    Dht11::new(line.clone(), SensorTiming::default())
}

#[test]
fn reads_valid_frame_end_to_end() {
    // 37 %RH, 25 °C, checksum 37 + 0 + 25 + 0 = 62.
    let line = MockLine::with_frame([37, 0, 25, 0, 62]);
    let reading = dht(&line).read().unwrap();
    assert_eq!(reading.humidity_percent, 37);
    assert_eq!(reading.temperature_celsius, 25);
}

#[test]
fn corrupted_checksum_is_rejected_with_raw_bytes() {
    let line = MockLine::with_frame([37, 0, 25, 0, 63]);
    let err = dht(&line).read().unwrap_err();
    assert_eq!(
        err,
        SensorError::Checksum {
            frame: [37, 0, 25, 0, 63]
        }
    );
}

#[test]
fn all_zero_frame_is_valid() {
    let line = MockLine::with_frame([0, 0, 0, 0, 0]);
    let reading = dht(&line).read().unwrap();
    assert_eq!(reading.humidity_percent, 0);
    assert_eq!(reading.temperature_celsius, 0);
}

#[test]
fn silent_sensor_fails_fast_with_not_responding() {
    let line = MockLine::silent();
    let err = dht(&line).read().unwrap_err();
    assert_eq!(err, SensorError::NotResponding);

    // Start hold (19 ms) plus the bounded ack waits — nowhere near a hang.
    assert!(line.elapsed_us() < 25_000, "took {} µs", line.elapsed_us());
}

#[test]
fn mid_frame_stall_reports_the_bit_index() {
    let line = MockLine::stalling_after([37, 0, 25, 0, 62], 17);
    let err = dht(&line).read().unwrap_err();
    assert_eq!(err, SensorError::LineTimeout { bit: 17 });
}

#[test]
fn bus_is_released_high_after_success() {
    let line = MockLine::with_frame([37, 0, 25, 0, 62]);
    dht(&line).read().unwrap();

    let ops = line.ops();
    let tail: Vec<LineOp> = ops.iter().rev().take(2).map(|(_, op)| *op).collect();
    assert_eq!(
        tail,
        vec![
            LineOp::SetLevel(PinState::High),
            LineOp::SetDirection(Direction::Output)
        ]
    );
}

#[test]
fn bus_is_released_high_after_failure() {
    let line = MockLine::silent();
    dht(&line).read().unwrap_err();

    let ops = line.ops();
    let tail: Vec<LineOp> = ops.iter().rev().take(2).map(|(_, op)| *op).collect();
    assert_eq!(
        tail,
        vec![
            LineOp::SetLevel(PinState::High),
            LineOp::SetDirection(Direction::Output)
        ]
    );
}

#[test]
fn sensor_can_be_read_again_after_a_transaction() {
    let line = MockLine::with_frame([60, 0, 23, 0, 83]);
    let dht = dht(&line);
    let first = dht.read().unwrap();
    let second = dht.read().unwrap();
    assert_eq!(first, second);
}

#[test]
fn concurrent_reads_never_interleave_line_operations() {
    let line = MockLine::with_frame([37, 0, 25, 0, 62]);
    let dht = Arc::new(dht(&line));

    let a = Arc::clone(&dht);
    let b = Arc::clone(&dht);
    let ta = thread::spawn(move || a.read());
    let tb = thread::spawn(move || b.read());
    ta.join().unwrap().unwrap();
    tb.join().unwrap().unwrap();

    // Both transactions completed; their op streams must be contiguous:
    // the recorded thread ids may switch at most once.
    let ops = line.ops();
    let switches = ops
        .windows(2)
        .filter(|w| w[0].0 != w[1].0)
        .count();
    assert!(switches <= 1, "line ops interleaved: {} switches", switches);
}
