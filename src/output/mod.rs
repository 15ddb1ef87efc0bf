mod input;
mod report;
mod store;

pub use input::RunInput;
pub use report::write_run_report;
pub use store::{load_run_output, write_run_output, write_stratified, RunOutput};
