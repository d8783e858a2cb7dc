//! Order placement and the kitchen-side order list.

use crate::catalog::api_url;
use crate::config::Config;
use crate::error::OrderError;
use crate::i18n::Language;
use crate::menu::Catalog;
use chrono::Utc;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, info, warn};

// ==================== Wire Types ====================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    #[serde(default, deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_qty")]
    pub qty: u32,
    /// Display price of one unit
    #[serde(default, deserialize_with = "lenient_string")]
    pub price: String,
}

fn default_qty() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    pub restaurant_number: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table_number: Option<String>,
    pub items: Vec<OrderLine>,
    pub total: u64,
}

impl OrderRequest {
    /// Build an order from `(item id, quantity)` pairs looked up in `catalog`.
    pub fn from_selection(
        catalog: &Catalog,
        selection: &[(&str, u32)],
        lang: Language,
        restaurant_number: &str,
        table_number: Option<&str>,
    ) -> Result<Self, OrderError> {
        let mut items = Vec::with_capacity(selection.len());
        let mut total = 0u64;

        for (id, qty) in selection.iter().copied().filter(|(_, qty)| *qty > 0) {
            let item = catalog
                .find_item_by_id(id)
                .ok_or_else(|| OrderError::UnknownItem(id.to_string()))?;
            let translation = item.translation(lang).cloned().unwrap_or_default();
            let line_total = translation.parsed_price().saturating_mul(u64::from(qty));
            total = total.saturating_add(line_total);
            items.push(OrderLine {
                id: item.id.clone(),
                name: item.display_name(lang).to_string(),
                qty,
                price: translation.price,
            });
        }

        if items.is_empty() {
            return Err(OrderError::Rejected("order has no items".to_string()));
        }

        Ok(Self {
            restaurant_number: restaurant_number.to_string(),
            table_number: table_number.map(str::to_string),
            items,
            total,
        })
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceOrderResponse {
    success: bool,
    #[serde(default, alias = "order_id", deserialize_with = "lenient_opt_string")]
    order_id: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    InProgress,
    Served,
    Completed,
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::InProgress => "in_progress",
            OrderStatus::Served => "served",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    /// Accepts the status names plus the portal's action names ("start", "serve", "complete", "cancel").
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(OrderStatus::Pending),
            "in_progress" | "start" => Ok(OrderStatus::InProgress),
            "served" | "serve" => Ok(OrderStatus::Served),
            "completed" | "complete" => Ok(OrderStatus::Completed),
            "cancelled" | "cancel" => Ok(OrderStatus::Cancelled),
            other => Err(format!("Unknown order status '{}'", other)),
        }
    }
}

/// An order as the backend reports it.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Order {
    #[serde(deserialize_with = "lenient_string")]
    pub id: String,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default, deserialize_with = "order_lines")]
    pub items: Vec<OrderLine>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub total: String,
    #[serde(
        default,
        alias = "table_no",
        alias = "table_number",
        deserialize_with = "lenient_opt_string"
    )]
    pub table: Option<String>,
    #[serde(default, alias = "created_at")]
    pub placed_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrderListResponse {
    success: bool,
    #[serde(default)]
    orders: Vec<Order>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StatusUpdateResponse {
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    Ok(lenient_opt_string(deserializer)?.unwrap_or_default())
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<String>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(None),
        Value::String(s) => Ok(Some(s)),
        Value::Number(n) => Ok(Some(n.to_string())),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}

/// Order items arrive either as an array or as a JSON-encoded string of one.
fn order_lines<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<OrderLine>, D::Error> {
    match Value::deserialize(deserializer)? {
        Value::Null => Ok(Vec::new()),
        Value::String(encoded) => serde_json::from_str(&encoded).map_err(serde::de::Error::custom),
        value => serde_json::from_value(value).map_err(serde::de::Error::custom),
    }
}

// ==================== Client ====================

/// Outcome of a successful placement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacedOrder {
    pub order_id: Option<String>,
    /// True when no order API is configured and nothing left this process
    pub local: bool,
}

pub struct OrderClient {
    api_base: Option<String>,
    restaurant: String,
    client: reqwest::Client,
}

impl OrderClient {
    pub fn new(
        api_base: Option<String>,
        restaurant: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, OrderError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_base,
            restaurant: restaurant.into(),
            client,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, OrderError> {
        Self::new(
            config.api_base.clone(),
            config.restaurant_number.clone(),
            config.http_timeout,
        )
    }

    fn endpoint(&self, segments: &[&str]) -> Result<reqwest::Url, OrderError> {
        let base = self.api_base.as_deref().ok_or(OrderError::NotConfigured)?;
        api_url(base, segments).map_err(OrderError::Rejected)
    }

    /// Submit an order. Without an API base the order is acknowledged locally.
    pub async fn place_order(&self, request: &OrderRequest) -> Result<PlacedOrder, OrderError> {
        if self.api_base.is_none() {
            let order_id = format!("local-{}", Utc::now().timestamp_millis() % 1_000_000);
            info!("No order API configured, acknowledged locally as {}", order_id);
            return Ok(PlacedOrder {
                order_id: Some(order_id),
                local: true,
            });
        }

        let url = self.endpoint(&["api", "order"])?;
        info!(
            "Placing order with {} items for restaurant {}",
            request.items.len(),
            request.restaurant_number
        );

        let response = self.client.post(url).json(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        // The backend reports rejections in the body, sometimes with a 4xx
        let parsed: PlaceOrderResponse = match serde_json::from_str(&body) {
            Ok(parsed) => parsed,
            Err(_) if !status.is_success() => {
                return Err(OrderError::Status {
                    status: status.as_u16(),
                    body,
                })
            }
            Err(e) => return Err(e.into()),
        };

        if !parsed.success {
            let reason = parsed.error.unwrap_or_else(|| "unknown error".to_string());
            warn!("Order rejected: {}", reason);
            return Err(OrderError::Rejected(reason));
        }

        info!("Order placed: {:?}", parsed.order_id);
        Ok(PlacedOrder {
            order_id: parsed.order_id,
            local: false,
        })
    }

    /// Every order for this restaurant.
    pub async fn list_orders(&self) -> Result<Vec<Order>, OrderError> {
        let mut url = self.endpoint(&["api", "orders"])?;
        url.query_pairs_mut()
            .append_pair("restaurant_number", &self.restaurant);
        debug!("Fetching orders from {}", url);

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OrderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        let parsed: OrderListResponse = serde_json::from_str(&body)?;
        if !parsed.success {
            return Err(OrderError::Rejected(
                parsed.error.unwrap_or_else(|| body.clone()),
            ));
        }
        Ok(parsed.orders)
    }

    /// Move an order to `status`.
    pub async fn update_status(&self, order_id: &str, status: OrderStatus) -> Result<(), OrderError> {
        let url = self.endpoint(&["api", "orders", order_id])?;
        info!("Setting order {} to {}", order_id, status);

        let response = self
            .client
            .patch(url)
            .json(&serde_json::json!({ "status": status }))
            .send()
            .await?;

        let http_status = response.status();
        let body = response.text().await?;
        let parsed: Option<StatusUpdateResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(parsed) if http_status.is_success() && parsed.success => Ok(()),
            Some(StatusUpdateResponse {
                error: Some(reason),
                ..
            }) => Err(OrderError::Rejected(reason)),
            _ if !http_status.is_success() => Err(OrderError::Status {
                status: http_status.as_u16(),
                body,
            }),
            _ => Err(OrderError::Rejected(body)),
        }
    }
}

// ==================== Display ====================

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Order #{}  Table: {}  [{}]",
            self.id,
            self.table.as_deref().unwrap_or("-"),
            self.status
        )?;
        if self.items.is_empty() {
            writeln!(f, "  No items")?;
        }
        for line in &self.items {
            let label = if line.name.is_empty() { &line.id } else { &line.name };
            writeln!(f, "  {}× {}  {}", line.qty, label, line.price)?;
        }
        let total = if self.total.is_empty() { "0.00" } else { &self.total };
        write!(f, "  Total: ₹{}", total)?;
        if let Some(placed) = &self.placed_at {
            write!(f, "  ({})", placed)?;
        }
        writeln!(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::build_catalog;
    use crate::menu::{Category, MenuItem};
    use serde_json::json;
    use wiremock::{
        matchers::{body_json, method, path, query_param},
        Mock, MockServer, ResponseTemplate,
    };

    // ==================== Helper Functions ====================

    fn sample_catalog() -> Catalog {
        let dish = |id: &str, name: &str, price: &str| -> MenuItem {
            serde_json::from_value(json!({
                "id": id,
                "translations": { "en": { "name": name, "desc": "", "price": price } }
            }))
            .unwrap()
        };
        build_catalog(vec![Category::new(
            "mains",
            vec![
                dish("dal", "Dal Tadka", "₹180"),
                dish("naan", "Butter Naan", "₹60"),
            ],
        )])
        .unwrap()
    }

    fn client(base: Option<String>) -> OrderClient {
        OrderClient::new(base, "12345", Duration::from_secs(5)).unwrap()
    }

    // ==================== Request Tests ====================

    #[test]
    fn test_request_from_selection_totals() {
        let request = OrderRequest::from_selection(
            &sample_catalog(),
            &[("dal", 1), ("naan", 3), ("dal", 0)],
            Language::ENGLISH,
            "12345",
            Some("7"),
        )
        .unwrap();

        assert_eq!(request.items.len(), 2);
        assert_eq!(request.items[1].name, "Butter Naan");
        assert_eq!(request.total, 180 + 3 * 60);
        assert_eq!(request.table_number.as_deref(), Some("7"));
    }

    #[test]
    fn test_request_total_saturates() {
        let gold: MenuItem = serde_json::from_value(json!({
            "id": "gold",
            "translations": { "en": { "name": "Gold Leaf Kulfi", "desc": "", "price": "₹99999999999999999999999" } }
        }))
        .unwrap();
        let catalog = build_catalog(vec![Category::new("desserts", vec![gold])]).unwrap();

        let request = OrderRequest::from_selection(
            &catalog,
            &[("gold", 2), ("gold", 5)],
            Language::ENGLISH,
            "12345",
            None,
        )
        .unwrap();
        assert_eq!(request.total, u64::MAX);
    }

    #[test]
    fn test_request_unknown_item() {
        let err = OrderRequest::from_selection(
            &sample_catalog(),
            &[("pizza", 1)],
            Language::ENGLISH,
            "12345",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::UnknownItem(id) if id == "pizza"));
    }

    #[test]
    fn test_request_without_items_rejected() {
        let err = OrderRequest::from_selection(
            &sample_catalog(),
            &[],
            Language::ENGLISH,
            "12345",
            None,
        )
        .unwrap_err();
        assert!(matches!(err, OrderError::Rejected(_)));
    }

    // ==================== Wire Format Tests ====================

    #[test]
    fn test_status_parsing() {
        assert_eq!("cancel".parse::<OrderStatus>(), Ok(OrderStatus::Cancelled));
        assert_eq!("start".parse::<OrderStatus>(), Ok(OrderStatus::InProgress));
        assert_eq!("served".parse::<OrderStatus>(), Ok(OrderStatus::Served));
        assert!("eaten".parse::<OrderStatus>().is_err());
        assert_eq!(
            serde_json::to_value(OrderStatus::InProgress).unwrap(),
            json!("in_progress")
        );
    }

    #[test]
    fn test_order_items_as_json_string() {
        let order: Order = serde_json::from_value(json!({
            "id": 42,
            "status": "served",
            "items": "[{\"id\":\"dal\",\"name\":\"Dal Tadka\",\"qty\":2,\"price\":180}]",
            "total": "360.00",
            "table_no": 4,
            "created_at": "2025-01-15T10:30:00Z"
        }))
        .unwrap();

        assert_eq!(order.id, "42");
        assert_eq!(order.status, OrderStatus::Served);
        assert_eq!(order.items[0].qty, 2);
        assert_eq!(order.items[0].price, "180");
        assert_eq!(order.table.as_deref(), Some("4"));
        assert_eq!(order.placed_at.as_deref(), Some("2025-01-15T10:30:00Z"));
    }

    #[test]
    fn test_order_defaults() {
        let order: Order = serde_json::from_value(json!({ "id": "a1" })).unwrap();
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.items.is_empty());

        let text = order.to_string();
        assert!(text.contains("Order #a1  Table: -  [pending]"));
        assert!(text.contains("No items"));
        assert!(text.contains("Total: ₹0.00"));
    }

    // ==================== Client Tests ====================

    #[tokio::test]
    async fn test_place_order_without_api_is_local() {
        let request = OrderRequest::from_selection(
            &sample_catalog(),
            &[("dal", 1)],
            Language::ENGLISH,
            "12345",
            None,
        )
        .unwrap();

        let placed = client(None).place_order(&request).await.unwrap();
        assert!(placed.local);
        assert!(placed.order_id.unwrap().starts_with("local-"));
    }

    #[tokio::test]
    async fn test_place_order_remote() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/order"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({ "success": true, "orderId": 981 })),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let request = OrderRequest::from_selection(
            &sample_catalog(),
            &[("naan", 2)],
            Language::ENGLISH,
            "12345",
            Some("3"),
        )
        .unwrap();

        let placed = client(Some(mock_server.uri()))
            .place_order(&request)
            .await
            .unwrap();
        assert!(!placed.local);
        assert_eq!(placed.order_id.as_deref(), Some("981"));
    }

    #[tokio::test]
    async fn test_place_order_rejected() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/order"))
            .respond_with(
                ResponseTemplate::new(400)
                    .set_body_json(json!({ "success": false, "error": "kitchen closed" })),
            )
            .mount(&mock_server)
            .await;

        let request = OrderRequest::from_selection(
            &sample_catalog(),
            &[("dal", 1)],
            Language::ENGLISH,
            "12345",
            None,
        )
        .unwrap();

        let err = client(Some(mock_server.uri()))
            .place_order(&request)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Rejected(reason) if reason == "kitchen closed"));
    }

    #[tokio::test]
    async fn test_list_orders() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders"))
            .and(query_param("restaurant_number", "12345"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "success": true,
                "orders": [
                    { "id": 1, "status": "pending", "items": [{ "name": "Dal Tadka", "price": 180 }] },
                    { "id": 2, "status": "in_progress", "items": [] }
                ]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let orders = client(Some(mock_server.uri())).list_orders().await.unwrap();
        assert_eq!(orders.len(), 2);
        assert_eq!(orders[0].items[0].qty, 1);
        assert_eq!(orders[1].status, OrderStatus::InProgress);
    }

    #[tokio::test]
    async fn test_list_orders_http_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/orders"))
            .respond_with(ResponseTemplate::new(500).set_body_string("db down"))
            .mount(&mock_server)
            .await;

        let err = client(Some(mock_server.uri())).list_orders().await.unwrap_err();
        assert!(matches!(err, OrderError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_list_orders_requires_api() {
        let err = client(None).list_orders().await.unwrap_err();
        assert!(matches!(err, OrderError::NotConfigured));
    }

    #[tokio::test]
    async fn test_update_status() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/orders/42"))
            .and(body_json(json!({ "status": "cancelled" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
            .expect(1)
            .mount(&mock_server)
            .await;

        client(Some(mock_server.uri()))
            .update_status("42", OrderStatus::Cancelled)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_update_status_failure() {
        let mock_server = MockServer::start().await;
        Mock::given(method("PATCH"))
            .and(path("/api/orders/42"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({ "success": false, "error": "no such order" })),
            )
            .mount(&mock_server)
            .await;

        let err = client(Some(mock_server.uri()))
            .update_status("42", OrderStatus::Served)
            .await
            .unwrap_err();
        assert!(matches!(err, OrderError::Rejected(reason) if reason == "no such order"));
    }
}
