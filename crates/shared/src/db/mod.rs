pub mod connection;
pub mod pool;

pub use connection::{ConnectionManager, ConnectionState, Connector};
pub use pool::{Db, PgConnector};

pub type PgConnections = ConnectionManager<PgConnector>;
