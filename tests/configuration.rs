use std::net::Ipv4Addr;
use std::time::Duration;

use raw_ping::{Attempts, Destination, PingConfig, PingErrorKind, PingSession};

// These run without privileges.

#[test]
fn oversized_packet_is_a_configuration_error() {
    let config = PingConfig { packet_size: 2000, ..PingConfig::new("127.0.0.1") };

    let error = raw_ping::ping(&config).unwrap_err();

    assert_eq!(PingErrorKind::Configuration, error.kind);
}

#[test]
fn empty_host_is_a_configuration_error() {
    let error = raw_ping::ping(&PingConfig::default()).unwrap_err();

    assert_eq!(PingErrorKind::Configuration, error.kind);
    assert_eq!("PingError: Invalid or empty hostname.", error.to_string());
}

#[test]
fn ttl_out_of_bounds_is_a_configuration_error() {
    let config = PingConfig { ttl: 300, timeout: Duration::from_millis(10), ..PingConfig::new("127.0.0.1") };

    assert_eq!(PingErrorKind::Configuration, raw_ping::ping(&config).unwrap_err().kind);
}

#[test]
fn zero_attempts_is_a_configuration_error() {
    let config = PingConfig { attempts: Attempts::Count(0), ..PingConfig::new("127.0.0.1") };

    assert_eq!(PingErrorKind::Configuration, raw_ping::ping(&config).unwrap_err().kind);
}

#[test]
fn socket_failure_is_a_setup_error() {
    let config = PingConfig::new("127.0.0.1");

    // Succeeds only with CAP_NET_RAW.
    if let Err(error) = PingSession::create(&config, Destination::from(Ipv4Addr::LOCALHOST)) {
        assert_eq!(PingErrorKind::Setup, error.kind);
    }
}
