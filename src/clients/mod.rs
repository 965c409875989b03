pub mod firestore_client;
pub mod functions_client;
pub mod http_client;

pub use firestore_client::{DocumentStore, FirestoreClient, FirestoreClientError};
pub use functions_client::{CallableFunctionsClient, FunctionsClientError, RemoteProcedure};
