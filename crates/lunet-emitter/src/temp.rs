//! Temp variable allocation.
//!
//! Temps stage intermediate values so a side-effecting target is evaluated
//! exactly once. Names are unique among currently live temps; a released
//! name may be handed out again by a later allocation. Lifetimes never cross
//! the statement that allocated them.

use rustc_hash::FxHashSet;

#[derive(Default)]
pub struct TempAllocator {
    live: FxHashSet<String>,
}

impl TempAllocator {
    pub fn new() -> Self {
        TempAllocator::default()
    }

    /// Allocate the lowest-numbered free temp name and mark it live.
    pub fn allocate(&mut self) -> String {
        let mut n = 1usize;
        loop {
            let name = format!("_t{n}");
            if !self.live.contains(&name) {
                self.live.insert(name.clone());
                return name;
            }
            n += 1;
        }
    }

    /// Release a live temp so its name can be reused.
    pub fn release(&mut self, name: &str) {
        self.live.remove(name);
    }

    pub fn is_live(&self, name: &str) -> bool {
        self.live.contains(name)
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }
}
