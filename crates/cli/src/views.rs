//! Plain-text views.
//!
//! Rendering is kept separate from printing so every view can be tested as a
//! string. Labels come from [`Messages`] for the active locale.

use ecwid_shop_core::format_amount;
use ecwid_shop_storefront::cart::{CartStore, LineItem};
use ecwid_shop_storefront::catalog::{Category, Product};
use ecwid_shop_storefront::locale::Locale;
use ecwid_shop_storefront::storage::KeyValueStore;

/// Interface strings for one locale.
#[derive(Debug, Clone, Copy)]
pub struct Messages {
    pub categories: &'static str,
    pub no_categories: &'static str,
    pub products: &'static str,
    pub no_products: &'static str,
    pub cart: &'static str,
    pub empty_cart: &'static str,
    pub items: &'static str,
    pub total: &'static str,
    pub added: &'static str,
    pub removed: &'static str,
    pub updated: &'static str,
    pub not_in_cart: &'static str,
    pub cleared: &'static str,
    pub not_saved: &'static str,
    pub language: &'static str,
}

const EN: Messages = Messages {
    categories: "Categories",
    no_categories: "No categories found.",
    products: "Products",
    no_products: "No products found.",
    cart: "Shopping cart",
    empty_cart: "Your cart is empty.",
    items: "Items",
    total: "Total",
    added: "Added to cart",
    removed: "Removed from cart",
    updated: "Quantity updated",
    not_in_cart: "Product is not in the cart",
    cleared: "Cart cleared",
    not_saved: "Warning: the cart could not be saved and will be lost on exit.",
    language: "Language",
};

const RU: Messages = Messages {
    categories: "Категории",
    no_categories: "Категории не найдены.",
    products: "Товары",
    no_products: "Товары не найдены.",
    cart: "Корзина",
    empty_cart: "Ваша корзина пуста.",
    items: "Товаров",
    total: "Итого",
    added: "Добавлено в корзину",
    removed: "Удалено из корзины",
    updated: "Количество обновлено",
    not_in_cart: "Товара нет в корзине",
    cleared: "Корзина очищена",
    not_saved: "Внимание: корзину не удалось сохранить, изменения пропадут после выхода.",
    language: "Язык",
};

impl Messages {
    /// Strings for `locale`.
    #[must_use]
    pub const fn for_locale(locale: Locale) -> &'static Self {
        match locale {
            Locale::English => &EN,
            Locale::Russian => &RU,
        }
    }
}

/// Write a rendered view to stdout.
#[allow(clippy::print_stdout)]
pub fn emit(text: &str) {
    println!("{}", text.trim_end());
}

/// Category list, indented under its parent when the parent is listed.
#[must_use]
pub fn categories(list: &[Category], msg: &Messages) -> String {
    if list.is_empty() {
        return msg.no_categories.to_string();
    }

    let mut sorted: Vec<&Category> = list.iter().filter(|c| c.enabled).collect();
    sorted.sort_by_key(|c| (c.order_by, c.id));

    let mut out = format!("{}:\n", msg.categories);
    for category in sorted.iter().filter(|c| c.parent_id.is_none()) {
        push_category(&mut out, category, &sorted, 1);
    }
    // Orphans whose parent is hidden or missing
    for category in &sorted {
        if let Some(parent) = category.parent_id
            && !sorted.iter().any(|c| c.id == parent)
        {
            push_category(&mut out, category, &sorted, 1);
        }
    }
    out
}

fn push_category(out: &mut String, category: &Category, all: &[&Category], depth: usize) {
    out.push_str(&format!(
        "{}[{}] {} ({})\n",
        "  ".repeat(depth),
        category.id,
        category.name,
        category.product_count
    ));
    for child in all.iter().filter(|c| c.parent_id == Some(category.id)) {
        push_category(out, child, all, depth + 1);
    }
}

/// Product list with prices.
#[must_use]
pub fn products(list: &[Product], msg: &Messages) -> String {
    if list.is_empty() {
        return msg.no_products.to_string();
    }

    let mut out = format!("{}:\n", msg.products);
    for product in list {
        out.push_str(&format!(
            "  [{}] {}  {}\n",
            product.id, product.name, product.price
        ));
    }
    out
}

/// Single product details.
#[must_use]
pub fn product(product: &Product) -> String {
    let mut out = format!("[{}] {}\n  {}\n", product.id, product.name, product.price);
    if let Some(description) = product.description.as_deref().filter(|d| !d.is_empty()) {
        out.push_str(&format!("  {}\n", strip_tags(description)));
    }
    if let Some(url) = product.image_url.as_deref().or(product.thumbnail_url.as_deref()) {
        out.push_str(&format!("  {url}\n"));
    }
    out
}

/// Cart contents with line totals, item count and total.
#[must_use]
pub fn cart<S: KeyValueStore>(cart: &CartStore<S>, msg: &Messages) -> String {
    if cart.is_empty() {
        return msg.empty_cart.to_string();
    }

    let mut out = format!("{}:\n", msg.cart);
    for item in cart.items() {
        out.push_str(&line_item(item));
    }
    out.push_str(&format!(
        "{}: {}\n{}: {}\n",
        msg.items,
        cart.item_count(),
        msg.total,
        cart.total()
    ));
    out
}

fn line_item(item: &LineItem) -> String {
    format!(
        "  [{}] {}  {} x {} = {}\n",
        item.id,
        item.name,
        item.quantity,
        item.unit_price,
        format_amount(item.line_total())
    )
}

/// Drop HTML tags from an Ecwid description.
fn strip_tags(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(c),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}
