mod executor;
mod schema;
mod verifier;

pub use executor::ExecutorError;
pub use schema::SchemaError;
pub use verifier::VerifierError;
