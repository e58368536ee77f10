mod field;
mod model;
mod value;
mod row;
mod migration_result;
mod verification_report;

pub use field::{FieldDescriptor, FieldType};
pub use model::{ModelDescriptor, SchemaMap};
pub use value::{CanonicalValue, RawValue, TypedValue};
pub use row::{SourceRow, TextRow};
pub use migration_result::{MigrationResult, MigrationSummary, MigrationTotals, MAX_SAMPLE_ERRORS};
pub use verification_report::{
    CheckReport, CountMismatch, VerificationReport, DEFAULT_MAX_MISMATCHES,
};
