/// Transport-level failures. These never reach the wire directly; the
/// leaf handler that catches one maps it to a `Status`/`ErrorKind` pair
/// (spec.md §7).
#[derive(Copy, Clone, Eq, PartialEq, Debug, thiserror::Error)]
pub enum BusError {
    #[error("serial bus transaction timed out waiting for the busy bit to clear")]
    Timeout,
    #[error("device returned a fault")]
    DeviceFault,
    #[error("memory-mapped region could not be opened")]
    MapFailed,
}
