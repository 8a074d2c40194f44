/// Record that a handle is about to release its resource.
///
/// Expands to nothing unless the `log` feature is enabled.
macro_rules! trace_release
{
    ($variant:expr, $token:expr) => {
        #[cfg(feature = "log")]
        ::log::trace!("{}: releasing {:p}", $variant, $token);
    };
}
