use arc_swap::ArcSwap;
use std::sync::Arc;

use crate::statistic::VegetationStatistic;

/// Read side of the published statistic. Cheap to clone; reads never block.
#[derive(Clone)]
pub struct StatisticCache {
    slot: Arc<ArcSwap<VegetationStatistic>>,
}

/// The only handle able to replace the published statistic.
///
/// Not `Clone`: whoever owns it is the single writer, which is what lets the
/// slot get away with a plain pointer swap instead of a lock.
pub struct StatisticPublisher {
    slot: Arc<ArcSwap<VegetationStatistic>>,
}

impl StatisticCache {
    pub fn new() -> (Self, StatisticPublisher) {
        let slot = Arc::new(ArcSwap::from_pointee(VegetationStatistic::default()));
        (
            Self {
                slot: Arc::clone(&slot),
            },
            StatisticPublisher { slot },
        )
    }

    pub fn current(&self) -> VegetationStatistic {
        **self.slot.load()
    }
}

impl StatisticPublisher {
    pub fn publish(&self, statistic: VegetationStatistic) {
        self.slot.store(Arc::new(statistic));
    }

    pub fn current(&self) -> VegetationStatistic {
        **self.slot.load()
    }
}
