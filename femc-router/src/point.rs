//! Generic leaf-point handlers implementing the three dispatch cases a
//! leaf handler still has to deal with once the router has already
//! dropped an oversized-monitor request (spec.md §4.1, §4.4):
//! monitor-on-monitor, control-write, monitor-on-control. A writable
//! point's `Shadow<T>` doubles as both "last control message" and
//! "current value" — reading a monitor-RCA for a writable point
//! returns the same record a monitor-on-control read would, which is
//! the simplification this workspace makes over keeping two copies.

use std::sync::Mutex;

use femc_abi::{ErrorKind, Payload, Reply, Request, Shadow, Status, WireValue};

/// A read-only telemetry point: only `is_monitor_on_monitor` applies;
/// any control-class request against it is a routing bug upstream
/// (the RCA tree should never expose a writable address here), so we
/// just answer with the best status we can rather than panic.
pub fn monitor_only<T: WireValue>(read: impl FnOnce() -> Result<T, ErrorKind>) -> Reply {
    match read() {
        Ok(value) => Reply::new(value.encode(), Status::NoError),
        Err(err) => Reply::new(Payload::empty(), err.as_status()),
    }
}

/// A writable point backed by one `Shadow<T>`. `validate` rejects an
/// out-of-domain control value before hardware is ever touched
/// (spec.md §4.1's command-value-range case); `apply` performs the
/// actual write.
pub fn writable<T: WireValue>(
    request: &Request,
    cell: &Mutex<Shadow<T>>,
    validate: impl Fn(T) -> bool,
    apply: impl FnOnce(T) -> Result<(), ErrorKind>,
) -> Reply {
    if request.is_control_write() {
        let Some(value) = T::decode(request.payload) else {
            let mut shadow = cell.lock().unwrap();
            shadow.save(request.payload);
            shadow.set_status(Status::ConErrorRng);
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        };

        let mut shadow = cell.lock().unwrap();
        shadow.save_value(value);

        if !validate(value) {
            shadow.set_status(Status::ConErrorRng);
            return Reply::new(Payload::empty(), Status::ConErrorRng);
        }

        match apply(value) {
            Ok(()) => {
                shadow.set_status(Status::NoError);
                Reply::new(Payload::empty(), Status::NoError)
            }
            Err(hw_err) => {
                shadow.set_status(Status::Error);
                Reply::new(Payload::empty(), hw_err.as_status())
            }
        }
    } else {
        // Monitor-on-monitor and monitor-on-control both read the
        // same shadow record (see module doc).
        let shadow = cell.lock().unwrap();
        let (payload, status) = shadow.load();
        Reply::new(payload, status)
    }
}
