//! Shopping cart.
//!
//! Purely local; nothing here talks to the backend.

use serde::{Deserialize, Serialize};

use crate::book::Book;

/// A book and the quantity ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    /// The book, as it was when added.
    pub book: Book,
    /// Quantity, always at least 1.
    pub quantity: u32,
}

/// Cart contents in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Items in insertion order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Adds `quantity` copies of `book`, merging with an existing line.
    pub fn add(&mut self, book: Book, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|i| i.book.id == book.id) {
            line.quantity = line.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartItem { book, quantity });
        }
    }

    /// Removes the line for `book_id`. Returns true if a line was removed.
    pub fn remove(&mut self, book_id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|i| i.book.id != book_id);
        self.items.len() != before
    }

    /// Sets the quantity for `book_id`; zero removes the line.
    pub fn update_quantity(&mut self, book_id: &str, quantity: u32) {
        if quantity == 0 {
            self.remove(book_id);
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|i| i.book.id == book_id) {
            line.quantity = quantity;
        }
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of price × quantity. Books without a price count as zero.
    #[must_use]
    pub fn total(&self) -> f64 {
        self.items
            .iter()
            .map(|i| i.book.price.unwrap_or(0.0) * f64::from(i.quantity))
            .sum()
    }

    /// Total number of copies across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    /// Whether the cart is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn priced(id: &str, price: f64) -> Book {
        Book {
            price: Some(price),
            ..Book::new(id, "Title", "Author")
        }
    }

    #[test]
    fn test_add_merges_same_book() {
        let mut cart = Cart::new();
        cart.add(priced("a", 10.0), 1);
        cart.add(priced("a", 10.0), 2);
        cart.add(priced("b", 4.5), 1);

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 4);
        assert!((cart.total() - 34.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zero_quantity_removes_line() {
        let mut cart = Cart::new();
        cart.add(priced("a", 10.0), 3);
        cart.update_quantity("a", 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_missing_price_counts_as_zero() {
        let mut cart = Cart::new();
        cart.add(Book::new("a", "T", "A"), 2);
        assert!(cart.total().abs() < f64::EPSILON);
        assert!(!cart.remove("missing"));
        cart.clear();
        assert_eq!(cart.item_count(), 0);
    }
}
