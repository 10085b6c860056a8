use std::panic::{self, PanicHookInfo};
use std::thread;

/// Install a panic hook which logs panics, with the panicking thread and the
/// source location as fields.
pub fn panic_logger() {
    panic::set_hook(Box::new(|info| {
        let thread = thread::current();
        let location = info.location().map(|l| l.to_string());

        tracing::error!(
            target: "panic",
            thread = thread.name().unwrap_or("<unnamed>"),
            location = location.as_deref().unwrap_or("<unknown>"),
            "Panicked: {}",
            payload(info),
        );
    }));
}

fn payload<'a>(info: &'a PanicHookInfo<'_>) -> &'a str {
    if let Some(s) = info.payload().downcast_ref::<&'static str>() {
        return s;
    }

    if let Some(s) = info.payload().downcast_ref::<String>() {
        return s;
    }

    "Box<dyn Any>"
}
