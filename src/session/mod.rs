pub mod report;
pub mod run;
pub mod state;

pub use report::RunReport;
pub use run::{process_folder, RunEvent, RunHandle, Session};
pub use state::{RunState, Stage};
