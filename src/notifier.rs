//! In-process fan-out of inventory changes to connected dashboards.
//!
//! Every mutating inventory call publishes the full item list. Subscribers
//! replace their local copy on each `inventoryUpdate`, so a receiver that
//! lags behind only needs the newest message and older ones may be dropped.

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::models::{InventoryItem, ItemKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct LowStockAlert {
    pub item_id: Uuid,
    pub name: String,
    pub kind: ItemKind,
    pub available: i64,
    pub threshold: i64,
}

/// Wire format: `{"event": "...", "data": ...}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum InventoryEvent {
    #[serde(rename = "inventoryUpdate")]
    InventoryUpdate(Vec<InventoryItem>),
    #[serde(rename = "lowStockAlert")]
    LowStockAlert(LowStockAlert),
}

impl InventoryEvent {
    pub fn to_json(&self) -> String {
        // Serialising plain data with string keys cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Clone)]
pub struct Notifier {
    sender: broadcast::Sender<InventoryEvent>,
    low_stock_threshold: i64,
}

impl Notifier {
    pub fn new(capacity: usize, low_stock_threshold: i64) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            low_stock_threshold,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<InventoryEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    pub fn low_stock_threshold(&self) -> i64 {
        self.low_stock_threshold
    }

    /// Events produced for one snapshot: the snapshot itself, then one alert per low item.
    pub fn events_for(&self, items: Vec<InventoryItem>) -> Vec<InventoryEvent> {
        let alerts: Vec<InventoryEvent> = items
            .iter()
            .filter(|item| item.is_low_stock(self.low_stock_threshold))
            .map(|item| {
                InventoryEvent::LowStockAlert(LowStockAlert {
                    item_id: item.id,
                    name: item.name.clone(),
                    kind: item.kind,
                    available: item.available,
                    threshold: self.low_stock_threshold,
                })
            })
            .collect();

        let mut events = Vec::with_capacity(alerts.len() + 1);
        events.push(InventoryEvent::InventoryUpdate(items));
        events.extend(alerts);
        events
    }

    /// Broadcast a full inventory snapshot. Returns how many subscribers were listening.
    pub fn publish_inventory(&self, items: Vec<InventoryItem>) -> usize {
        let mut delivered = 0;
        for event in self.events_for(items) {
            // send only fails when nobody is subscribed
            delivered = self.sender.send(event).unwrap_or(0);
        }
        tracing::debug!(subscribers = delivered, "inventory snapshot published");
        delivered
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn item(name: &str, kind: ItemKind, total: i64, sold: i64) -> InventoryItem {
        InventoryItem {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            total_quantity: total,
            sold_quantity: sold,
            available: InventoryItem::available_of(total, sold),
            unit_price: 100,
            wholesale_price: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn low_item_triggers_alert_after_snapshot() {
        let notifier = Notifier::new(16, 10);
        let mut rx = notifier.subscribe();

        let diesel = item("Diesel", ItemKind::Fuel, 5000, 1200);
        let wipers = item("Wiper Blades", ItemKind::Shop, 20, 17);
        notifier.publish_inventory(vec![diesel.clone(), wipers.clone()]);

        match rx.recv().await.unwrap() {
            InventoryEvent::InventoryUpdate(items) => {
                assert_eq!(items, vec![diesel, wipers.clone()]);
            }
            other => panic!("expected snapshot first, got {other:?}"),
        }
        match rx.recv().await.unwrap() {
            InventoryEvent::LowStockAlert(alert) => {
                assert_eq!(alert.name, "Wiper Blades");
                assert_eq!(alert.available, 3);
                assert_eq!(alert.item_id, wipers.id);
                assert_eq!(alert.threshold, 10);
            }
            other => panic!("expected low stock alert, got {other:?}"),
        }
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn item_at_threshold_is_not_low() {
        let notifier = Notifier::new(4, 10);
        let events = notifier.events_for(vec![item("Coolant", ItemKind::Shop, 10, 0)]);
        assert_eq!(events.len(), 1);
    }

    #[test]
    fn publishing_without_subscribers_is_not_an_error() {
        let notifier = Notifier::new(4, 10);
        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(notifier.publish_inventory(vec![item("Petrol 95", ItemKind::Fuel, 3, 0)]), 0);
    }

    #[tokio::test]
    async fn every_subscriber_gets_the_snapshot() {
        let notifier = Notifier::new(4, 1);
        let mut a = notifier.subscribe();
        let mut b = notifier.subscribe();
        assert_eq!(notifier.publish_inventory(vec![]), 2);
        assert_eq!(a.recv().await.unwrap(), InventoryEvent::InventoryUpdate(vec![]));
        assert_eq!(b.recv().await.unwrap(), InventoryEvent::InventoryUpdate(vec![]));
    }

    #[test]
    fn events_use_named_wire_tags() {
        let alert = InventoryEvent::LowStockAlert(LowStockAlert {
            item_id: Uuid::nil(),
            name: "Air Freshener".into(),
            kind: ItemKind::Shop,
            available: 2,
            threshold: 10,
        });
        let json: serde_json::Value = serde_json::from_str(&alert.to_json()).unwrap();
        assert_eq!(json["event"], "lowStockAlert");
        assert_eq!(json["data"]["name"], "Air Freshener");
        assert_eq!(json["data"]["available"], 2);
        assert_eq!(json["data"]["kind"], "shop");

        let update = InventoryEvent::InventoryUpdate(vec![]).to_json();
        assert_eq!(update, r#"{"event":"inventoryUpdate","data":[]}"#);
    }
}
