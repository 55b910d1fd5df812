use std::net::TcpListener;

use portprobe::{PortProbe, is_available};
use rand::SeedableRng;
use rand::rngs::StdRng;

#[test]
fn listener_on_fixed_port_blocks_until_closed() {
    // Skip quietly if something on this machine already owns the port.
    let Ok(listener) = TcpListener::bind("0.0.0.0:54000") else {
        return;
    };
    assert!(!is_available(54000));
    drop(listener);
    assert!(is_available(54000));
}

#[test]
fn hundred_free_ports_stay_free() {
    let mut probe = PortProbe::new();
    for _ in 0..100 {
        let port = probe.random_free_port();
        assert!((49152..=65533).contains(&port), "{} out of range", port);
        assert!(is_available(port), "port {} was taken right after the check", port);
    }
}

#[test]
fn repeated_checks_have_no_side_effects() {
    let mut probe = PortProbe::with_rng(StdRng::seed_from_u64(2024));
    let port = probe.random_free_port();
    assert!(is_available(port));
    assert!(is_available(port));
    assert!(probe.is_available(port));
}

#[test]
fn reserved_port_is_not_handed_out_twice() {
    let mut probe = PortProbe::new();
    let held = probe.reserve().unwrap();
    assert!(!is_available(held.port()));

    let other = probe.find_free_port().unwrap();
    assert_ne!(other, held.port());

    let port = held.release();
    assert!(is_available(port));
}
