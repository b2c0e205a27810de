//! Drive a session against a simulated launcher and print the predictions.
//!
//! Usage: cargo run --example session

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use launchkit::codec;
use launchkit::protocol::config::{SLOT_EFFICIENCY, SLOT_FORCE_OFFSET, SLOT_FRICTION_COEFFICIENT, SLOT_SPRING_ID};
use launchkit::protocol::{ConfigResponse, ConfigStatus, ConnectionState, RangeUpdate};
use launchkit::units::{self, LengthUnit};
use launchkit::{Command, Event, MemoryStore, SensorId, Session, Settings};

// ---------------------------------------------------------------------------
// Simulated device
// ---------------------------------------------------------------------------

/// Answers every config GET from a fixed table.
fn device_value(cmd: &launchkit::protocol::ConfigRequest) -> i32 {
    if cmd.target != launchkit::ConfigTarget::Device {
        return 0;
    }
    match usize::from(cmd.slot) {
        SLOT_FORCE_OFFSET => codec::float_to_int_bits(0.5),
        SLOT_EFFICIENCY => codec::float_to_int_bits(0.85),
        SLOT_FRICTION_COEFFICIENT => codec::float_to_int_bits(0.2),
        SLOT_SPRING_ID => 2,
        _ => 0,
    }
}

fn main() {
    let outbox: Rc<RefCell<VecDeque<Command>>> = Rc::default();
    let sink = Rc::clone(&outbox);
    let mut session = Session::new(
        move |cmd: Command| sink.borrow_mut().push_back(cmd),
        Settings::new(MemoryStore::new()),
    );
    session.observers.spring_name.subscribe(|name| {
        println!("spring: {}", name.as_deref().unwrap_or("-"));
    });

    let now = Instant::now();
    session.handle(Event::Connection(ConnectionState::Ready), now);

    // Pump requests through the simulated device until the syncs settle.
    loop {
        let Some(cmd) = outbox.borrow_mut().pop_front() else {
            break;
        };
        if let Command::Config(req) = cmd {
            let resp = ConfigResponse {
                target: req.target,
                slot: req.slot,
                value: device_value(&req),
                status: ConfigStatus::Ok,
            };
            session.handle(Event::Config(resp), now);
        }
    }
    println!(
        "model: {}  force offset {:.2} N  efficiency {:.2}  friction {:.2}",
        session.model().name(),
        session.model().force_offset(),
        session.model().efficiency(),
        session.model().friction_coefficient(),
    );

    session.select_projectile("Foam Ball");
    for _ in 0..session.filter(SensorId::Long).sample_size() {
        session.handle(
            Event::Range(RangeUpdate { sensor: SensorId::Long, range_mm: 1165 }),
            now,
        );
    }
    println!("launch height: {:.2} m", *session.observers.device_height.get() / 1000.0);

    println!();
    println!("{:>8} {:>10} {:>10} {:>10}", "pos mm", "energy J", "v m/s", "dist ft");
    for range in (12..=82).rev().step_by(10) {
        for _ in 0..session.filter(SensorId::Short).sample_size() {
            session.handle(
                Event::Range(RangeUpdate { sensor: SensorId::Short, range_mm: range }),
                now,
            );
        }
        let position = *session.observers.carriage_position.get();
        let impact = session.predict(15.0);
        println!(
            "{:>8.1} {:>10.3} {:>10.2} {:>10.1}",
            position,
            session.model().potential_energy_at_position(position),
            impact.velocity,
            units::convert(LengthUnit::Meter, LengthUnit::Foot, impact.distance),
        );
    }
}
