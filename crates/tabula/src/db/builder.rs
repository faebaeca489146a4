use super::{Catalog, Db};
use crate::Result;

use tabula_core::{Driver, Error, Schema};

use std::{
    collections::HashMap,
    sync::{atomic::AtomicUsize, Arc, Mutex},
};

#[derive(Debug, Default)]
pub struct Builder {
    schema: Option<Arc<Schema>>,
}

impl Builder {
    /// Sets the schema every connection opened by this builder uses.
    pub fn schema(&mut self, schema: impl Into<Arc<Schema>>) -> &mut Self {
        self.schema = Some(schema.into());
        self
    }

    /// Opens a connection through `driver`.
    pub async fn connect(&mut self, driver: &dyn Driver) -> Result<Db> {
        let Some(schema) = self.schema.clone() else {
            return Err(Error::invalid_schema(
                "no schema was given to the builder before connecting",
            ));
        };

        let connection = driver
            .connect()
            .await
            .map_err(|err| err.context(format!("connecting to `{}`", driver.url())))?;

        let catalog = Arc::new(Catalog {
            schema,
            fetch_cache: Mutex::new(HashMap::new()),
            joins: Mutex::new(HashMap::new()),
            next_connection_id: AtomicUsize::new(0),
        });
        Ok(Db::from_connection(catalog, connection))
    }
}
