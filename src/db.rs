pub mod remote;
pub use remote::{Filter, Record, RemoteError, RemoteStore};
pub mod supabase;
pub use supabase::SupabaseStore;
pub mod postgres;
pub use postgres::PostgresStore;
pub mod base44;
pub use base44::Base44Store;
pub mod memory;
pub use memory::MemoryStore;
