use super::{SchemaDescriptor, SchemaError};
use crate::connector::{ChainConnector, ConnectorSlot};
use crate::dispatcher::DispatchError;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Deferred descriptor constructor for schemas whose rules depend on the
/// active chain connector.
///
/// Invoked once per request, right before loading, with the connector snapshot
/// taken for that request.
pub trait SchemaFactory: Send + Sync {
    fn build(&self, connector: Arc<dyn ChainConnector>) -> Result<SchemaDescriptor, SchemaError>;
}

impl<F> SchemaFactory for F
where
    F: Fn(Arc<dyn ChainConnector>) -> Result<SchemaDescriptor, SchemaError> + Send + Sync,
{
    fn build(&self, connector: Arc<dyn ChainConnector>) -> Result<SchemaDescriptor, SchemaError> {
        self(connector)
    }
}

/// Where a binding gets its descriptor from
#[derive(Clone)]
pub enum SchemaSource {
    /// Built once at startup and shared by every request
    Static(Arc<SchemaDescriptor>),
    Factory(Arc<dyn SchemaFactory>),
}

impl SchemaSource {
    #[must_use]
    pub fn fixed(schema: SchemaDescriptor) -> Self {
        SchemaSource::Static(Arc::new(schema))
    }

    pub fn factory<F>(factory: F) -> Self
    where
        F: SchemaFactory + 'static,
    {
        SchemaSource::Factory(Arc::new(factory))
    }

    #[must_use]
    pub fn is_factory(&self) -> bool {
        matches!(self, SchemaSource::Factory(_))
    }

    /// Produce the descriptor for one request.
    ///
    /// A factory whose connector is not configured yields
    /// [`DispatchError::DependencyUnavailable`].
    pub fn resolve(
        &self,
        slot: &ConnectorSlot,
        resource: &str,
    ) -> Result<Arc<SchemaDescriptor>, DispatchError> {
        match self {
            SchemaSource::Static(schema) => Ok(Arc::clone(schema)),
            SchemaSource::Factory(factory) => {
                let Some(connector) = slot.snapshot() else {
                    warn!(
                        resource = %resource,
                        "Schema factory invoked without an active chain connector"
                    );
                    return Err(DispatchError::DependencyUnavailable {
                        resource: resource.to_string(),
                    });
                };
                let schema = factory.build(connector)?;
                debug!(
                    resource = %resource,
                    schema = %schema.name(),
                    field_count = schema.fields().len(),
                    "Schema built by factory"
                );
                Ok(Arc::new(schema))
            }
        }
    }
}

impl fmt::Debug for SchemaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SchemaSource::Static(schema) => f.debug_tuple("Static").field(&schema.name()).finish(),
            SchemaSource::Factory(_) => write!(f, "Factory(<fn>)"),
        }
    }
}

impl From<SchemaDescriptor> for SchemaSource {
    fn from(schema: SchemaDescriptor) -> Self {
        SchemaSource::fixed(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{BitcoinNetwork, StaticConnector};
    use crate::schema::{FieldSpec, FieldType};

    fn counting_factory(
        connector: Arc<dyn ChainConnector>,
    ) -> Result<SchemaDescriptor, SchemaError> {
        let name = format!("accounts@{}", connector.bitcoin_network());
        SchemaDescriptor::builder(name)
            .field(FieldSpec::new("address", FieldType::Address).required())
            .build()
    }

    #[test]
    fn factory_without_connector_is_dependency_unavailable() {
        let source = SchemaSource::factory(counting_factory);
        let slot = ConnectorSlot::new();
        let err = source.resolve(&slot, "blockchain_accounts").unwrap_err();
        assert!(matches!(err, DispatchError::DependencyUnavailable { .. }));
    }

    #[test]
    fn factory_sees_the_connector_installed_at_request_time() {
        let source = SchemaSource::factory(counting_factory);
        let slot = ConnectorSlot::new();
        slot.install(Arc::new(StaticConnector::new(BitcoinNetwork::Mainnet)));
        let first = source.resolve(&slot, "r").unwrap();
        assert_eq!(first.name(), "accounts@mainnet");

        slot.install(Arc::new(StaticConnector::new(BitcoinNetwork::Testnet)));
        let second = source.resolve(&slot, "r").unwrap();
        assert_eq!(second.name(), "accounts@testnet");
    }

    #[test]
    fn static_source_shares_one_descriptor() {
        let schema = SchemaDescriptor::builder("fixed").build().unwrap();
        let source = SchemaSource::fixed(schema);
        let slot = ConnectorSlot::new();
        let a = source.resolve(&slot, "r").unwrap();
        let b = source.resolve(&slot, "r").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
