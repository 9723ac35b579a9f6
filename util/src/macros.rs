/// Print to stderr, for use before the tracing subscriber is installed.
#[macro_export]
macro_rules! bootstrap {
    ($x:expr $( , $xs:expr )* $(,)?) => {
        eprintln!(concat!("[{} bootstrap] ", $x), $crate::build::PACKAGE $( , $xs )*)
    };
}

/// Log an `Err` at error level and continue, yielding the `Ok` value as an `Option`.
#[macro_export]
macro_rules! trace_catch {
    ($val:expr, $($rest:tt)*) => {
        match $val {
            Ok(val) => Some(val),
            Err(e) => {
                ::tracing::error!(error = %e, $($rest)*);
                None
            },
        }
    };
}
