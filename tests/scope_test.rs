/*!
 * Scope Tests
 * Construction, configuration composition, and stdio channel semantics
 */

use appcell::{AppCell, AvailablePorts, Namespace, Properties, ScopeError, DEFAULT_PIPE_CAPACITY};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::json;
use std::io::{Read, Write};
use std::sync::Arc;

fn init_logs() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn allocator(range: std::ops::Range<u16>) -> Arc<AvailablePorts> {
    Arc::new(AvailablePorts::new(range))
}

#[test]
fn test_default_construction() {
    init_logs();
    let cell = AppCell::builder("defaults").build().unwrap();

    assert_eq!(cell.name(), "defaults");
    assert!(cell.properties().is_empty());
    assert!(!cell.is_stderr_redirected());
    assert!(!cell.is_closed());
    assert_eq!(cell.stdout_reader().stats().capacity, DEFAULT_PIPE_CAPACITY);

    // The owned namespace draws its port from the process-wide allocator
    let port = cell.namespace().port();
    assert!(AvailablePorts::shared().range().contains(&port));
}

#[test]
fn test_empty_name_is_rejected() {
    let err = AppCell::builder("").build().unwrap_err();
    assert_eq!(err, ScopeError::EmptyName);
}

#[test]
fn test_invalid_capacity_is_fatal() {
    let err = AppCell::builder("hollow")
        .ports(allocator(40000..40010))
        .capacity(0)
        .build()
        .unwrap_err();

    assert!(matches!(
        err,
        ScopeError::AllocationFailed { ref scope, .. } if scope == "hollow"
    ));
}

#[test]
fn test_property_overrides_win_over_defaults() {
    let cell = AppCell::builder("props")
        .ports(allocator(40010..40020))
        .defaults(Properties::new().with("A", "0").with("B", "2"))
        .overrides(Properties::new().with("A", "1"))
        .build()
        .unwrap();

    assert_eq!(cell.properties().get("A"), Some("1"));
    assert_eq!(cell.properties().get("B"), Some("2"));
    assert_eq!(cell.properties().len(), 2);
}

#[test]
fn test_stdout_delivers_in_write_order() {
    let cell = AppCell::builder("stdout")
        .ports(allocator(40020..40030))
        .build()
        .unwrap();

    let mut writer = cell.stdout_writer();
    writer.write_all(b"first ").unwrap();
    writer.write_all(b"second").unwrap();

    let mut reader = cell.stdout_reader();
    let mut buf = [0u8; 12];
    reader.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"first second");
}

#[test]
fn test_stderr_is_independent_by_default() {
    let cell = AppCell::builder("stderr")
        .ports(allocator(40030..40040))
        .build()
        .unwrap();

    cell.stderr_writer().try_write(b"warn").unwrap();
    cell.stdout_writer().try_write(b"info").unwrap();

    let mut err_buf = [0u8; 4];
    cell.stderr_reader().unwrap().read_exact(&mut err_buf).unwrap();
    assert_eq!(&err_buf, b"warn");

    let mut out_buf = [0u8; 4];
    cell.stdout_reader().read_exact(&mut out_buf).unwrap();
    assert_eq!(&out_buf, b"info");
}

#[test]
fn test_redirect_merges_streams_in_call_order() {
    let cell = AppCell::builder("merged")
        .ports(allocator(40040..40050))
        .redirect_stderr(true)
        .build()
        .unwrap();

    let mut out = cell.stdout_writer();
    let mut err = cell.stderr_writer();
    out.write_all(b"out:1 ").unwrap();
    err.write_all(b"err:1 ").unwrap();
    out.write_all(b"out:2").unwrap();

    let mut merged = [0u8; 17];
    cell.stdout_reader().read_exact(&mut merged).unwrap();
    assert_eq!(&merged, b"out:1 err:1 out:2");
}

#[test]
fn test_stderr_reader_fails_while_redirected() {
    let cell = AppCell::builder("redirected")
        .ports(allocator(40050..40060))
        .redirect_stderr(true)
        .build()
        .unwrap();

    assert!(cell.is_stderr_redirected());
    assert!(matches!(
        cell.stderr_reader(),
        Err(ScopeError::StderrRedirected { ref scope }) if scope == "redirected"
    ));

    // The precondition violation is reported in any scope state
    cell.close();
    assert!(matches!(
        cell.stderr_reader(),
        Err(ScopeError::StderrRedirected { .. })
    ));
}

#[test]
fn test_stdin_direction_is_inverted() {
    let cell = AppCell::builder("stdin")
        .ports(allocator(40060..40070))
        .build()
        .unwrap();

    // Observer feeds input; the application reads it
    let mut sink = cell.stdin_writer();
    sink.write_all(b"input line").unwrap();

    let mut source = cell.stdin_reader();
    let mut buf = [0u8; 10];
    source.read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"input line");
}

#[test]
fn test_app_stdio_surface_aliases_channel_ends() {
    let cell = AppCell::builder("surface")
        .ports(allocator(40070..40080))
        .build()
        .unwrap();

    let mut out = cell.stdio().out();
    out.write_all(b"via surface").unwrap();

    let mut buf = [0u8; 11];
    cell.stdout_reader().read_exact(&mut buf).unwrap();
    assert_eq!(&buf, b"via surface");
}

#[test]
fn test_borrowed_namespace_is_not_released() {
    let ports = allocator(40080..40090);
    let namespace = Arc::new(Namespace::new("external", Arc::clone(&ports)).unwrap());

    let cell = AppCell::builder("borrower")
        .ports(Arc::clone(&ports))
        .namespace(Arc::clone(&namespace))
        .build()
        .unwrap();

    assert_eq!(cell.namespace().port(), namespace.port());
    cell.close();

    // The cell never releases what it only borrowed
    assert!(!namespace.is_closed());
    namespace.register("still-alive", json!(true)).unwrap();
}

#[test]
fn test_owned_namespace_is_released_on_close() {
    let ports = allocator(40090..40091);
    let cell = AppCell::builder("owner")
        .ports(Arc::clone(&ports))
        .build()
        .unwrap();

    let namespace = Arc::clone(cell.namespace());
    let port = namespace.port();
    assert!(matches!(
        Namespace::new("starved", Arc::clone(&ports)),
        Err(ScopeError::PortsExhausted { .. })
    ));

    cell.close();

    assert!(namespace.is_closed());
    // The management port went back to the allocator
    assert_eq!(Namespace::new("reborn", ports).unwrap().port(), port);
}

#[test]
fn test_namespace_snapshot_serves_introspection() {
    let cell = AppCell::builder("introspect")
        .ports(allocator(40100..40110))
        .build()
        .unwrap();

    let namespace = cell.namespace();
    namespace.register("state", json!("running")).unwrap();
    namespace
        .register("stdout", json!({"capacity": DEFAULT_PIPE_CAPACITY}))
        .unwrap();

    let snapshot = namespace.snapshot();
    assert_eq!(snapshot["state"], json!("running"));
    assert_eq!(snapshot["stdout"]["capacity"], json!(DEFAULT_PIPE_CAPACITY));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Any non-empty name and any sane capacity yield a usable scope.
    #[test]
    fn test_valid_inputs_always_build(
        name in proptest::collection::vec(proptest::char::range('a', 'z'), 1..16),
        capacity in 1usize..4096,
    ) {
        let name: String = name.into_iter().collect();
        let cell = AppCell::builder(name)
            .ports(Arc::new(AvailablePorts::new(42000..42010)))
            .capacity(capacity)
            .build()
            .unwrap();

        let mut sink = cell.stdin_writer();
        sink.write_all(b"x").unwrap();
        let mut buf = [0u8; 1];
        cell.stdin_reader().read_exact(&mut buf).unwrap();
        prop_assert_eq!(&buf, b"x");

        let mut out = cell.stdout_writer();
        out.write_all(b"y").unwrap();
        cell.stdout_reader().read_exact(&mut buf).unwrap();
        prop_assert_eq!(&buf, b"y");

        cell.close();
    }
}
