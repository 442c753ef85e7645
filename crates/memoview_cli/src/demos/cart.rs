//! Shopping cart with filters, search and currency switching
//!
//! Product cards live in a keyed list. Every pass rebuilds each card's product
//! record from state, so the memoized version compares `product` structurally
//! and hands out stable handlers; the naive one re-renders every visible card
//! on every interaction.

use std::cmp::Ordering;

use memoview_core::{EqualityPolicy, InputSet, Value};
use memoview_tree::{Key, KeyedChildren, Scope, View};

use super::{Demo, Handler, Step};

#[derive(Clone, Debug, PartialEq)]
pub struct Product {
    pub id: i64,
    pub name: &'static str,
    pub category: &'static str,
    pub price: f64,
    pub quantity: i64,
    pub favorite: bool,
}

impl Product {
    fn to_value(&self) -> Value {
        Value::record([
            ("id", Value::Int(self.id)),
            ("name", Value::text(self.name)),
            ("category", Value::text(self.category)),
            ("price", Value::Float(self.price)),
            ("quantity", Value::Int(self.quantity)),
            ("favorite", Value::Bool(self.favorite)),
        ])
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortBy {
    Unsorted,
    Name,
    Price,
    Quantity,
}

impl SortBy {
    fn as_str(self) -> &'static str {
        match self {
            SortBy::Unsorted => "none",
            SortBy::Name => "name",
            SortBy::Price => "price",
            SortBy::Quantity => "quantity",
        }
    }
}

#[derive(Clone, Debug)]
pub struct Filters {
    pub category: &'static str,
    pub favorites_only: bool,
    pub sort_by: SortBy,
}

#[derive(Clone, Debug)]
pub struct CartState {
    pub products: Vec<Product>,
    pub filters: Filters,
    pub search: String,
    pub currency: &'static str,
}

impl CartState {
    /// Products passing the filters and search, in display order
    pub fn visible(&self) -> Vec<&Product> {
        let search = self.search.to_lowercase();
        let mut visible: Vec<&Product> = self
            .products
            .iter()
            .filter(|p| self.filters.category == "all" || p.category == self.filters.category)
            .filter(|p| !self.filters.favorites_only || p.favorite)
            .filter(|p| p.name.to_lowercase().contains(&search))
            .collect();

        match self.filters.sort_by {
            SortBy::Unsorted => {}
            SortBy::Name => visible.sort_by(|a, b| a.name.cmp(b.name)),
            SortBy::Price => {
                visible.sort_by(|a, b| b.price.partial_cmp(&a.price).unwrap_or(Ordering::Equal))
            }
            SortBy::Quantity => visible.sort_by(|a, b| b.quantity.cmp(&a.quantity)),
        }
        visible
    }

    fn product(&self, id: i64) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }

    fn update_product(&self, id: i64, f: impl Fn(&mut Product)) -> CartState {
        let mut next = self.clone();
        if let Some(product) = next.products.iter_mut().find(|p| p.id == id) {
            f(product);
        }
        next
    }
}

fn rate(currency: &str) -> f64 {
    match currency {
        "EUR" => 0.92,
        "GBP" => 0.79,
        _ => 1.0,
    }
}

fn format_price(price: f64, currency: &str) -> String {
    format!("{currency} {:.2}", price * rate(currency))
}

fn initial_state() -> CartState {
    let product = |id, name, category, price, quantity| Product {
        id,
        name,
        category,
        price,
        quantity,
        favorite: false,
    };

    CartState {
        products: vec![
            product(1, "Laptop", "electronics", 999.99, 1),
            product(2, "Mouse", "electronics", 29.99, 2),
            product(3, "Keyboard", "electronics", 79.99, 1),
            product(4, "Desk Lamp", "home", 45.5, 1),
            product(5, "Coffee Mug", "home", 12.0, 4),
        ],
        filters: Filters {
            category: "all",
            favorites_only: false,
            sort_by: SortBy::Unsorted,
        },
        search: String::new(),
        currency: "USD",
    }
}

/// Handlers shared by every card, like callbacks memoized with no dependencies
#[derive(Clone)]
struct CardHandlers {
    update_quantity: Handler,
    toggle_favorite: Handler,
    remove: Handler,
}

fn product_card(id: i64, naive: bool, handlers: CardHandlers) -> View<CartState> {
    let policy = if naive {
        EqualityPolicy::shallow()
    } else {
        EqualityPolicy::shallow().with_structural("product")
    };

    View::new("card", |inputs| {
        let product = inputs.record("product")?;
        let currency = inputs.text("currency")?;
        inputs.callback("on_update_quantity")?;
        inputs.callback("on_toggle_favorite")?;
        inputs.callback("on_remove")?;

        let name = product.get("name").and_then(Value::as_text).unwrap_or("?");
        let price = product.get("price").and_then(Value::as_float).unwrap_or(0.0);
        let quantity = product.get("quantity").and_then(Value::as_int).unwrap_or(0);
        let favorite = product.get("favorite").and_then(Value::as_bool).unwrap_or(false);

        let discount = if quantity >= 10 { 0.1 } else { 0.0 };
        let total = price * quantity as f64 * (1.0 - discount);

        Ok(Value::text(format!(
            "{}{} x{} @ {} = {}",
            if favorite { "♥ " } else { "" },
            name,
            quantity,
            format_price(price, currency),
            format_price(total, currency)
        )))
    })
    .with_inputs(move |scope: &Scope<'_, CartState>| {
        let product = scope
            .state
            .product(id)
            .map_or(Value::Null, Product::to_value);
        InputSet::new()
            .with("product", product)
            .with("currency", scope.state.currency)
            .with("on_update_quantity", handlers.update_quantity.get())
            .with("on_toggle_favorite", handlers.toggle_favorite.get())
            .with("on_remove", handlers.remove.get())
    })
    .with_policy(policy)
}

pub fn demo(naive: bool) -> Demo<CartState> {
    let handlers = CardHandlers {
        update_quantity: Handler::new("update_quantity", naive),
        toggle_favorite: Handler::new("toggle_favorite", naive),
        remove: Handler::new("remove", naive),
    };
    let on_currency_change = Handler::new("currency_change", naive);
    let on_filter_change = Handler::new("filter_change", naive);
    let on_checkout = Handler::new("checkout", naive);

    let header = View::new("header", |inputs| {
        inputs.callback("on_currency_change")?;
        Ok(Value::text(format!("Cart ({})", inputs.text("currency")?)))
    })
    .with_inputs(move |scope: &Scope<'_, CartState>| {
        InputSet::new()
            .with("currency", scope.state.currency)
            .with("on_currency_change", on_currency_change.get())
    });

    let filter_bar = View::new("filters", |inputs| {
        inputs.callback("on_filter_change")?;
        Ok(Value::text(format!(
            "category={} favorites={} sort={} search='{}'",
            inputs.text("category")?,
            inputs.bool("favorites_only")?,
            inputs.text("sort_by")?,
            inputs.text("search")?
        )))
    })
    .with_inputs(move |scope: &Scope<'_, CartState>| {
        let filters = &scope.state.filters;
        InputSet::new()
            .with("category", filters.category)
            .with("favorites_only", filters.favorites_only)
            .with("sort_by", filters.sort_by.as_str())
            .with("search", scope.state.search.as_str())
            .with("on_filter_change", on_filter_change.get())
    });

    let cards = KeyedChildren::new(
        "products",
        |scope: &Scope<'_, CartState>| {
            scope
                .state
                .visible()
                .into_iter()
                .map(|p| Key::from(p.id))
                .collect()
        },
        move |key: &Key| {
            let id = match key {
                Key::Int(id) => *id,
                Key::Str(_) => -1,
            };
            product_card(id, naive, handlers.clone())
        },
    );

    let summary_policy = if naive {
        EqualityPolicy::shallow()
    } else {
        EqualityPolicy::shallow().with_structural("lines")
    };
    let summary = View::new("summary", |inputs| {
        inputs.callback("on_checkout")?;
        let currency = inputs.text("currency")?;
        let (items, subtotal) = inputs
            .list("lines")?
            .iter()
            .fold((0, 0.0), |(items, subtotal), line| {
                let price = line.field("price").and_then(Value::as_float).unwrap_or(0.0);
                let quantity = line.field("quantity").and_then(Value::as_int).unwrap_or(0);
                (items + quantity, subtotal + price * quantity as f64)
            });
        Ok(Value::text(format!(
            "{items} items, subtotal {}",
            format_price(subtotal, currency)
        )))
    })
    .with_inputs(move |scope: &Scope<'_, CartState>| {
        let lines = scope.state.products.iter().map(|p| {
            Value::record([
                ("price", Value::Float(p.price)),
                ("quantity", Value::Int(p.quantity)),
            ])
        });
        InputSet::new()
            .with("lines", Value::list(lines))
            .with("currency", scope.state.currency)
            .with("on_checkout", on_checkout.get())
    })
    .with_policy(summary_policy);

    let root = View::new("cart", |inputs| {
        Ok(Value::text(format!("{} products", inputs.int("count")?)))
    })
    .with_inputs(|scope: &Scope<'_, CartState>| {
        InputSet::new().with("count", scope.state.products.len())
    })
    .with_child(header)
    .with_child(filter_bar)
    .with_keyed(cards)
    .with_child(summary);

    Demo {
        root,
        initial: initial_state(),
        script: vec![
            Step::new("add a mouse", |state: &CartState| {
                state.update_product(2, |p| p.quantity += 1)
            }),
            Step::new("favorite the keyboard", |state: &CartState| {
                state.update_product(3, |p| p.favorite = !p.favorite)
            }),
            Step::new("sort by price", |state: &CartState| {
                let mut next = state.clone();
                next.filters.sort_by = SortBy::Price;
                next
            }),
            Step::new("switch to EUR", |state: &CartState| CartState {
                currency: "EUR",
                ..state.clone()
            }),
            Step::new("search 'o'", |state: &CartState| CartState {
                search: "o".into(),
                ..state.clone()
            }),
            Step::new("remove the laptop", |state: &CartState| {
                let mut next = state.clone();
                next.products.retain(|p| p.id != 1);
                next
            }),
        ],
    }
}
