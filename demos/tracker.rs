//! Walks both owners through construction, transfer, duplication and scope exit with an
//! instrumented `Tracker` that logs its own lifetime.
//!
//! Run with `RUST_LOG=trace cargo run --example tracker` to also see the owners' own events.

use std::cell::Cell;

use log::info;
use scoped_owners::{ExclusiveOwner, SharedOwner};

thread_local! {
    static CONSTRUCTED: Cell<usize> = const { Cell::new(0) };
    static DESTRUCTED: Cell<usize> = const { Cell::new(0) };
}

struct Tracker {
    id: u32,
}

impl Tracker {
    fn new(id: u32) -> Box<Self> {
        let tracker = Box::new(Tracker { id });
        CONSTRUCTED.with(|count| count.set(count.get() + 1));
        info!("[construct] id {} @{:p}", tracker.id, &*tracker);
        tracker
    }

    fn print(&self) {
        info!("running task {}", self.id);
    }
}

impl Drop for Tracker {
    fn drop(&mut self) {
        DESTRUCTED.with(|count| count.set(count.get() + 1));
        info!("[destruct]  id {} @{:p}", self.id, self);
    }
}

fn exclusive_owner() {
    info!("========= exclusive owner =========");

    let mut p1 = ExclusiveOwner::from_box(Tracker::new(1));
    p1.print();

    let mut p2 = p1.take();
    if p1.is_empty() {
        info!("p1 was transferred and is now empty");
    }
    if p2.is_owning() {
        info!("p2 took over from p1");
        p2.print();
    }

    let mut p3 = ExclusiveOwner::<Tracker>::empty();
    p3.transfer_from(&mut p2);
    if p2.is_empty() {
        info!("p2 was transferred and is now empty");
    }
    if p3.is_owning() {
        info!("p3 took over from p2");
        p3.print();
    }

    info!("--- scope ---");
    {
        let p4 = ExclusiveOwner::from_box(Tracker::new(2));
        p4.print();
    }
    info!("left the inner scope");
}

fn shared_owner() {
    info!("========= shared owner =========");

    let mut p1 = SharedOwner::from_box(Tracker::new(101));
    p1.print();
    info!("count p1: {}", p1.use_count());

    let p2 = p1.clone();
    p2.print();
    info!("count p1: {}", p1.use_count());
    info!("count p2: {}", p2.use_count());

    let mut p3 = SharedOwner::<Tracker>::empty();
    p3.clone_from(&p2);
    info!("count after copy-assign: {}", p3.use_count());

    {
        let p4 = p1.clone();
        info!("inner scope count: {}", p4.use_count());
    }
    info!("count after the inner scope: {}", p1.use_count());

    let p5 = p1.take();
    if p1.is_empty() {
        info!("p1 was transferred and is now empty");
    }
    if p5.is_owning() {
        p5.print();
        info!("count p5: {}", p5.use_count());
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    info!("=========================== owner walkthrough ===========================");
    exclusive_owner();
    shared_owner();

    let constructed = CONSTRUCTED.with(Cell::get);
    let destructed = DESTRUCTED.with(Cell::get);
    info!("constructed {constructed}, destructed {destructed}");
    assert_eq!(constructed, destructed, "every tracker must be deleted exactly once");
    info!("=========================== done ===========================");
}
