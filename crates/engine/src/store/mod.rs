mod bucket;
mod capture_store;
mod retention;

pub use bucket::CaptureBucket;
pub use capture_store::CaptureStore;
pub use retention::RetentionWindow;
