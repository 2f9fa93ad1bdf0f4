//! An `Rc`-backed `Waker` vtable.
//!
//! `std::task::Wake` only hands out wakers from `Arc<W: Send + Sync>`, which
//! this core can't honor: a resource's future closes over `Rc<Runtime>` and
//! other non-`Send` state, since nothing here pretends to be anything but
//! single-threaded. `RcWake` is the textbook manual-vtable waker (the shape
//! `futures`' old `ArcWake` used before `Wake` landed in std), rebuilt here
//! on `Rc` instead of `Arc`.

use std::rc::Rc;
use std::task::{RawWaker, RawWakerVTable, Waker};

pub(crate) trait RcWake {
    fn wake_by_ref(self: &Rc<Self>);

    fn into_waker(self: Rc<Self>) -> Waker
    where
        Self: Sized,
    {
        let ptr = Rc::into_raw(self) as *const ();
        unsafe { Waker::from_raw(RawWaker::new(ptr, vtable::<Self>())) }
    }
}

fn vtable<W: RcWake>() -> &'static RawWakerVTable {
    &RawWakerVTable::new(clone_raw::<W>, wake_raw::<W>, wake_by_ref_raw::<W>, drop_raw::<W>)
}

unsafe fn clone_raw<W: RcWake>(data: *const ()) -> RawWaker {
    let rc = std::mem::ManuallyDrop::new(Rc::<W>::from_raw(data as *const W));
    std::mem::forget(rc.clone());
    RawWaker::new(data, vtable::<W>())
}

unsafe fn wake_raw<W: RcWake>(data: *const ()) {
    let rc = Rc::<W>::from_raw(data as *const W);
    RcWake::wake_by_ref(&rc);
}

unsafe fn wake_by_ref_raw<W: RcWake>(data: *const ()) {
    let rc = std::mem::ManuallyDrop::new(Rc::<W>::from_raw(data as *const W));
    RcWake::wake_by_ref(&rc);
}

unsafe fn drop_raw<W: RcWake>(data: *const ()) {
    drop(Rc::<W>::from_raw(data as *const W));
}
