// Shared helpers for the unit tests

use allocator_api2::alloc::{ AllocError, Allocator, Global };
use std::{
    alloc::Layout,
    cell::Cell,
    ptr::NonNull,
    sync::Once
};

static LOGGER: Once = Once::new();

pub(crate) fn init_logging() {
    LOGGER.call_once(|| {
        use simplelog::*;
        // another test harness may have already set a logger
        let _ = TestLogger::init(LevelFilter::Trace, Config::default());
    });
}

// Forwards to Global, tracking live blocks. Once a budget is set, each allocation
// spends one unit and fails when nothing is left.
pub(crate) struct CountingAlloc {
    live: Cell<usize>,
    budget: Cell<Option<usize>>
}

impl CountingAlloc {
    pub(crate) fn new() -> Self { Self { live: Cell::new(0), budget: Cell::new(None) } }
    pub(crate) fn live(&self) -> usize { self.live.get() }
    pub(crate) fn set_budget(&self, budget: Option<usize>) { self.budget.set(budget) }
}

unsafe impl Allocator for CountingAlloc {
    fn allocate(&self, layout: Layout) -> Result<NonNull<[u8]>, AllocError> {
        match self.budget.get() {
            Some(0) => return Err(AllocError),
            Some(n) => self.budget.set(Some(n - 1)),
            None => {}
        }
        let block = Global.allocate(layout)?;
        self.live.set(self.live.get() + 1);
        Ok(block)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        self.live.set(self.live.get() - 1);
        Global.deallocate(ptr, layout)
    }
}

#[cfg(test)]
pub mod tests {
    use super::init_logging;
    use log::LevelFilter;
    use std::error::Error;

    type TestReturn = Result<(), Box<dyn Error>>;

    #[test]
    pub fn logger_installs_once() -> TestReturn {
        init_logging();
        init_logging();
        assert_eq!(log::max_level(), LevelFilter::Trace);
        log::trace!("test logger is live");
        Ok(())
    }
}
