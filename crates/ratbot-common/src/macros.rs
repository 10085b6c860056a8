/// Helper macro to log an error and all its causes.
#[macro_export]
macro_rules! log_error {
    ($e:expr, $fmt:expr $(, $($arg:tt)*)?) => {
        $crate::log_base!(error, $e, $fmt $(, $($arg)*)*)
    };
}

/// Helper macro to log a warning and all its causes.
#[macro_export]
macro_rules! log_warn {
    ($e:expr, $fmt:expr $(, $($arg:tt)*)?) => {
        $crate::log_base!(warn, $e, $fmt $(, $($arg)*)*)
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! log_base {
    ($level:tt, $e:expr, $fmt:expr $(, $($arg:tt)*)?) => {{
        let e = $crate::__anyhow::Error::from($e);

        $crate::__tracing::$level!($fmt $(, $($arg)*)*);

        for e in e.chain() {
            $crate::__tracing::$level!("Caused by: {}", e);
        }
    }};
}
