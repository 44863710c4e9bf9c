use super::*;

/// Verbosity flags map onto increasingly chatty levels
#[test]
fn test_from_verbosity() {
    assert_eq!(LogLevel::from_verbosity(0), LogLevel::Info);
    assert_eq!(LogLevel::from_verbosity(1), LogLevel::Debug);
    assert_eq!(LogLevel::from_verbosity(5), LogLevel::Trace);
    assert_eq!(tracing::Level::from(LogLevel::Warn), tracing::Level::WARN);
}

/// Repeated initialization is harmless
#[test]
fn test_init_twice() {
    init_debug();
    init();
}
