//! View types shared by the order pages.

use corner_shop_core::db::orders::OrderLine;
use corner_shop_core::{Order, OrderStatus};

/// Order display data for templates.
#[derive(Debug, Clone)]
pub struct OrderView {
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub email: String,
    pub status: String,
    pub status_label: &'static str,
    pub created_at: String,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            id: order.id.as_i32(),
            first_name: order.first_name.clone(),
            last_name: order.last_name.clone(),
            phone: order.phone.clone(),
            email: order.email.to_string(),
            status: order.status.as_str().to_string(),
            status_label: order.status.label(),
            created_at: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Line item display data for templates.
#[derive(Debug, Clone)]
pub struct LineItemView {
    pub id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub amount: i32,
}

impl From<&OrderLine> for LineItemView {
    fn from(line: &OrderLine) -> Self {
        Self {
            id: line.item.id.as_i32(),
            product_id: line.item.product_id.as_i32(),
            product_name: line.product_name.clone(),
            amount: line.item.amount,
        }
    }
}

/// A status choice for filters and the status form.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

impl StatusOption {
    /// Every status, marking `current` as selected.
    #[must_use]
    pub fn all(current: Option<OrderStatus>) -> Vec<Self> {
        OrderStatus::ALL
            .into_iter()
            .map(|status| Self {
                value: status.as_str(),
                label: status.label(),
                selected: current == Some(status),
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_status_options_mark_current() {
        let options = StatusOption::all(Some(OrderStatus::Shipped));
        assert_eq!(options.len(), OrderStatus::ALL.len());
        let selected: Vec<_> = options.iter().filter(|o| o.selected).map(|o| o.value).collect();
        assert_eq!(selected, ["shipped"]);

        assert!(StatusOption::all(None).iter().all(|o| !o.selected));
    }
}
