use crate::broker_actor::InMemoryBroker;
use crate::clients::{CacheClient, ItemStoreClient, OrderStoreClient};
use crate::config::Settings;
use crate::coordinator::{OrderCreationCoordinator, OrderRetrievalCoordinator, OrderService};
use crate::publisher::EventPublisher;
use std::sync::Arc;
use tracing::{error, info};

/// The running order core.
///
/// `OrderSystem` is responsible for:
/// - **Lifecycle Management**: Starting and stopping the store actors
/// - **Dependency Wiring**: Handing store clients and the publisher to the coordinators
///
/// # Architecture
///
/// Four actors stand in for the external stores:
/// - **Header store**: relational order headers, ids assigned on insert
/// - **Item store**: line item documents, unique on `(order, product)`
/// - **Cache**: order views with an absolute TTL
/// - **Broker**: the append-only topic log events are published to
///
/// # Example
///
/// ```ignore
/// let system = OrderSystem::new(Settings::default());
/// let cancel = CancellationToken::new();
///
/// let view = system.service.create_order(123, items, &cancel).await?;
/// let again = system.service.get_order(view.id, &cancel).await?;
///
/// system.shutdown().await?;
/// ```
pub struct OrderSystem {
    /// `createOrder` / `getOrder`
    pub service: OrderService,

    pub orders: OrderStoreClient,
    pub items: ItemStoreClient,
    pub cache: CacheClient,

    /// Read access to published events
    pub broker: InMemoryBroker,

    pub settings: Settings,

    /// Task handles for all running actors (used for graceful shutdown)
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl OrderSystem {
    /// Spawns every store actor and wires the service. Must be called inside a Tokio runtime.
    pub fn new(settings: Settings) -> Self {
        // 1. Create actors
        let (header_actor, orders) = crate::header_actor::new(settings.store_buffer);
        let (item_actor, items) = crate::item_actor::new(settings.store_buffer);
        let (cache_actor, cache) = crate::cache_actor::new(settings.store_buffer);
        let (broker_actor, broker) = crate::broker_actor::new(settings.store_buffer);

        // 2. Start them
        let handles = vec![
            tokio::spawn(header_actor.run()),
            tokio::spawn(item_actor.run()),
            tokio::spawn(cache_actor.run()),
            tokio::spawn(broker_actor.run()),
        ];

        // 3. Wire the coordinators
        let publisher = Arc::new(EventPublisher::new(Arc::new(broker.clone()), settings.producer.clone()));
        let creation = OrderCreationCoordinator::new(
            orders.clone(),
            items.clone(),
            cache.clone(),
            publisher,
            settings.topic.clone(),
            settings.cache_ttl,
        );
        let retrieval =
            OrderRetrievalCoordinator::new(orders.clone(), items.clone(), cache.clone(), settings.cache_ttl);

        info!(topic = %settings.topic, cache_ttl_secs = settings.cache_ttl.as_secs(), "Order system started");

        Self {
            service: OrderService::new(creation, retrieval),
            orders,
            items,
            cache,
            broker,
            settings,
            handles,
        }
    }

    /// Gracefully shuts down the entire system.
    ///
    /// Dropping the clients closes the actors' channels; each actor drains and exits.
    /// Clones of the service or clients held elsewhere keep their actor alive, so they
    /// must be dropped before calling this.
    ///
    /// # Returns
    ///
    /// - `Ok(())` if all actors shut down cleanly
    /// - `Err(String)` if any actor task failed or panicked
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down system...");

        drop(self.service);
        drop(self.orders);
        drop(self.items);
        drop(self.cache);
        drop(self.broker);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("System shutdown complete.");
        Ok(())
    }
}
