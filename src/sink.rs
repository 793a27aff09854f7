/// Receiver for human-readable progress lines.
///
/// The extractor and the folder walker never print anything themselves; every
/// message goes through a sink injected by the caller. Closures taking `&str`
/// are sinks, so a one-off `&|line: &str| println!("{line}")` is enough for
/// simple uses.
pub trait LogSink {
    /// Append one line to the log.
    fn log(&self, message: &str);
}

impl<F> LogSink for F
where
    F: Fn(&str),
{
    fn log(&self, message: &str) {
        self(message)
    }
}
