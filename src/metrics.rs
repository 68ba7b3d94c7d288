use lazy_static::lazy_static;
use prometheus::{CounterVec, IntCounterVec, Opts, Registry};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();
    pub static ref NUM_ALLOCATIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("num_allocations", "Number of allocation calls"),
        &["kind"]
    )
    .expect("Metric can be created");
    pub static ref ALLOCATED_QUANTITY: CounterVec = CounterVec::new(
        Opts::new("allocated_quantity", "Total quantity assigned to lots"),
        &["kind"]
    )
    .expect("Metric can be created");
    pub static ref SHORTAGE_QUANTITY: CounterVec = CounterVec::new(
        Opts::new("shortage_quantity", "Total requested quantity left unfilled"),
        &["kind"]
    )
    .expect("Metric can be created");
}

pub fn register_custom_metrics() {
    REGISTRY
        .register(Box::new(NUM_ALLOCATIONS.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(ALLOCATED_QUANTITY.clone()))
        .expect("collector can be registered");
    REGISTRY
        .register(Box::new(SHORTAGE_QUANTITY.clone()))
        .expect("collector can be registered");
}
