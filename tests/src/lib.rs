mod exec_log;
pub use exec_log::ExecLog;

pub use logging_driver::{DriverOp, LoggingConnection, LoggingDriver};

pub use setup::{company, company_on_disk, company_schema, company_schema_with, connect, seed, Seed, Setup};
